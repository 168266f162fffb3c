use std::error::Error;
use std::fmt;

/// Result type used by every fallible step of the interpreter.
pub type EvalResult<T> = Result<T, EvalError>;

/// Interpreter error, split by the stage that produced it.
///
/// Hosts that only care about the text can use `Display`; the rendered
/// message is the stable diagnostic contract (`"expect ;"`, `"parse error"`,
/// `"<keyword> not implement"`).
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// The lexer hit a character or literal it cannot tokenize.
    Lex(String),
    /// The token stream does not match the expression grammar.
    Parse(String),
    /// Syntactically recognized but unsupported construct (reserved
    /// keyword statement, assignment operator). Carries the exact source
    /// text of the offending construct.
    NotImplemented(String),
}

impl EvalError {
    pub fn lex(msg: impl Into<String>) -> Self {
        EvalError::Lex(msg.into())
    }

    /// The generic "this token cannot start a literal" diagnostic.
    pub fn parse() -> Self {
        EvalError::Parse("parse error".into())
    }

    pub fn expect_semicolon() -> Self {
        EvalError::Parse("expect ;".into())
    }

    pub fn not_implemented(source_text: impl Into<String>) -> Self {
        EvalError::NotImplemented(source_text.into())
    }

    pub fn message(&self) -> String {
        match self {
            EvalError::Lex(msg) | EvalError::Parse(msg) => msg.clone(),
            EvalError::NotImplemented(what) => format!("{} not implement", what),
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl Error for EvalError {}
