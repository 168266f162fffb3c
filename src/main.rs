use clap::{Parser, Subcommand};
use log::debug;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use serde::Serialize;
use std::fs;

use tinyjs_core::{Engine, EvalResult, Value};

#[derive(Parser)]
#[command(name = "tinyjs")]
#[command(about = "Interpreter for a restricted JavaScript-like expression language", version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a script file and print its result
    Run {
        /// Path of the script to evaluate
        file: String,

        /// Print the outcome as a JSON document instead of plain text
        #[arg(long)]
        json: bool,
    },

    /// Evaluate source given on the command line
    Eval {
        /// Program text, e.g. "1 + 2;"
        source: String,

        /// Print the outcome as a JSON document instead of plain text
        #[arg(long)]
        json: bool,
    },

    /// Start an interactive session
    Repl,
}

/// Machine-readable outcome for `--json` mode.
#[derive(Serialize)]
struct Outcome {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn main() -> Result<(), String> {
    env_logger::init();

    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Run { file, json }) => {
            let source =
                fs::read_to_string(file).map_err(|e| format!("cannot read {}: {}", file, e))?;
            debug!("evaluating {} ({} bytes)", file, source.len());
            report(Engine::new().eval(&source), *json)
        }

        Some(Commands::Eval { source, json }) => {
            debug!("evaluating command line source ({} bytes)", source.len());
            report(Engine::new().eval(source), *json)
        }

        Some(Commands::Repl) | None => run_repl().map_err(|e| e.to_string()),
    }
}

fn outcome_json(result: &EvalResult<Value>) -> Result<String, String> {
    let outcome = match result {
        Ok(value) => Outcome {
            ok: true,
            value: Some(value.to_json()),
            error: None,
        },
        Err(e) => Outcome {
            ok: false,
            value: None,
            error: Some(e.to_string()),
        },
    };
    serde_json::to_string(&outcome).map_err(|e| e.to_string())
}

fn report(result: EvalResult<Value>, json: bool) -> Result<(), String> {
    if json {
        println!("{}", outcome_json(&result)?);
        // The document already carries the error; exit non-zero without
        // letting main print it a second time.
        if result.is_err() {
            std::process::exit(1);
        }
        return Ok(());
    }

    match result {
        Ok(value) => {
            println!("{}", value);
            Ok(())
        }
        Err(e) => Err(e.to_string()),
    }
}

fn run_repl() -> rustyline::Result<()> {
    println!("tinyjs - interactive mode");
    println!("Type 'exit' or 'quit' to leave.");

    let engine = Engine::new();
    let mut rl = DefaultEditor::new()?;

    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                let source = line.trim();
                if source == "exit" || source == "quit" {
                    break;
                }
                if source.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(source);

                match engine.eval(source) {
                    Ok(value) => println!("{}", value),
                    Err(e) => println!("Error: {}", e),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                println!("read error: {}", e);
                break;
            }
        }
    }

    Ok(())
}
