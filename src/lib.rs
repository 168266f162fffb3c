//! tinyjs: an embeddable interpreter for a restricted JavaScript-like
//! expression language.
//!
//! A program is a sequence of `;`-terminated expression statements; the
//! result of [`eval`] is the last statement's value. The lexer, parser and
//! evaluator run in a single pass (no AST), and every fallible step returns
//! an [`error::EvalResult`] instead of panicking.
//!
//! ```
//! use tinyjs_core::{Value, eval};
//!
//! assert_eq!(eval("2 * 3 + 4;"), Ok(Value::Number(10.0)));
//! ```

pub mod engine;
pub mod error;
pub mod lexer;
pub mod value;

pub use engine::Engine;
pub use error::{EvalError, EvalResult};
pub use value::Value;

/// Evaluate a program on a fresh engine.
pub fn eval(source: &str) -> EvalResult<Value> {
    Engine::new().eval(source)
}
