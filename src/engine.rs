use crate::error::{EvalError, EvalResult};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::value::Value;

/// The interpreter entry point.
///
/// `Engine` itself is stateless; every call to [`Engine::eval`] builds its
/// own cursor and lookahead, so one engine can be shared across threads and
/// repeated calls with the same source always produce the same result.
#[derive(Debug, Default)]
pub struct Engine;

impl Engine {
    pub fn new() -> Self {
        Engine
    }

    /// Evaluate a program: a sequence of `;`-terminated expression
    /// statements. The result is the last statement's value, or `Null` for
    /// an empty program. The first error aborts the remaining input.
    pub fn eval(&self, source: &str) -> EvalResult<Value> {
        Evaluator::new(source).run()
    }
}

/// Per-call parse/evaluate state. The parser computes values while it
/// recognizes the grammar; there is no AST.
struct Evaluator<'a> {
    lexer: Lexer<'a>,
    token: Token,
    /// When non-zero we are inside a short-circuited operand: the grammar
    /// is still checked and the cursor still moves, but nothing is computed
    /// and execution-only diagnostics are suppressed.
    no_exec: u32,
}

impl<'a> Evaluator<'a> {
    fn new(source: &'a str) -> Self {
        Evaluator {
            lexer: Lexer::new(source),
            token: Token {
                kind: TokenKind::Eof,
                start: 0,
                len: 0,
            },
            no_exec: 0,
        }
    }

    fn run(&mut self) -> EvalResult<Value> {
        let mut result = Value::Null;
        loop {
            self.advance()?;
            if self.token.kind == TokenKind::Eof {
                break;
            }
            result = self.statement()?;
        }
        Ok(result)
    }

    fn advance(&mut self) -> EvalResult<()> {
        self.token = self.lexer.next_token()?;
        Ok(())
    }

    fn token_text(&self) -> &'a str {
        self.token.text(self.lexer.source())
    }

    fn exec(&self) -> bool {
        self.no_exec == 0
    }

    /// Parse a sub-expression without computing anything.
    fn parse_only<T>(&mut self, f: impl FnOnce(&mut Self) -> EvalResult<T>) -> EvalResult<T> {
        self.no_exec += 1;
        let res = f(self);
        self.no_exec -= 1;
        res
    }

    // --- Statements ---

    /// One statement. Reserved keywords fail with the stable
    /// `"<keyword> not implement"` diagnostic; everything else must be an
    /// expression followed by `;`.
    fn statement(&mut self) -> EvalResult<Value> {
        if self.token.kind.is_reserved_statement() {
            return Err(EvalError::not_implemented(self.token_text()));
        }

        let value = self.expression()?;
        if self.token.kind != TokenKind::Semicolon {
            return Err(EvalError::expect_semicolon());
        }
        Ok(value)
    }

    // --- Precedence chain, loosest binding first ---
    //
    // Every level enters with the current token being the first token of
    // its operand and returns with the current token being the first token
    // after the expression it consumed.

    fn expression(&mut self) -> EvalResult<Value> {
        self.assignment()
    }

    /// `=` and the compound assignment operators. The subset has no
    /// assignable storage, so the operator parses and then reports
    /// `"<op> not implement"` instead of silently accepting.
    fn assignment(&mut self) -> EvalResult<Value> {
        let left = self.ternary()?;
        if self.token.kind.is_assignment() {
            if self.exec() {
                return Err(EvalError::not_implemented(self.token_text()));
            }
            // Inside a skipped operand: the right side must still be
            // well-formed (right-associative).
            self.advance()?;
            self.assignment()?;
            return Ok(Value::Null);
        }
        Ok(left)
    }

    /// `cond ? a : b`, right-associative; exactly one branch is executed.
    fn ternary(&mut self) -> EvalResult<Value> {
        let cond = self.logical_or()?;
        if self.token.kind != TokenKind::Question {
            return Ok(cond);
        }
        self.advance()?;

        let taken = cond.is_truthy();
        let then_value = if self.exec() && !taken {
            self.parse_only(Self::assignment)?
        } else {
            self.assignment()?
        };
        if self.token.kind != TokenKind::Colon {
            return Err(EvalError::parse());
        }
        self.advance()?;
        let else_value = if self.exec() && taken {
            self.parse_only(Self::assignment)?
        } else {
            self.assignment()?
        };

        if !self.exec() {
            Ok(Value::Null)
        } else if taken {
            Ok(then_value)
        } else {
            Ok(else_value)
        }
    }

    /// `||`: JS operand-returning semantics; a truthy left side short
    /// circuits and the right operand is parsed but never evaluated.
    fn logical_or(&mut self) -> EvalResult<Value> {
        let mut left = self.logical_and()?;
        while self.token.kind == TokenKind::Or {
            self.advance()?;
            if self.exec() && left.is_truthy() {
                self.parse_only(Self::logical_and)?;
            } else {
                let right = self.logical_and()?;
                if self.exec() {
                    left = right;
                }
            }
        }
        Ok(left)
    }

    fn logical_and(&mut self) -> EvalResult<Value> {
        let mut left = self.bitwise_or()?;
        while self.token.kind == TokenKind::And {
            self.advance()?;
            if self.exec() && !left.is_truthy() {
                self.parse_only(Self::bitwise_or)?;
            } else {
                let right = self.bitwise_or()?;
                if self.exec() {
                    left = right;
                }
            }
        }
        Ok(left)
    }

    fn bitwise_or(&mut self) -> EvalResult<Value> {
        let mut left = self.bitwise_xor()?;
        while self.token.kind == TokenKind::BitOr {
            self.advance()?;
            let right = self.bitwise_xor()?;
            left = self.fold(|| Value::Number((left.to_int32() | right.to_int32()) as f64));
        }
        Ok(left)
    }

    fn bitwise_xor(&mut self) -> EvalResult<Value> {
        let mut left = self.bitwise_and()?;
        while self.token.kind == TokenKind::BitXor {
            self.advance()?;
            let right = self.bitwise_and()?;
            left = self.fold(|| Value::Number((left.to_int32() ^ right.to_int32()) as f64));
        }
        Ok(left)
    }

    fn bitwise_and(&mut self) -> EvalResult<Value> {
        let mut left = self.equality()?;
        while self.token.kind == TokenKind::BitAnd {
            self.advance()?;
            let right = self.equality()?;
            left = self.fold(|| Value::Number((left.to_int32() & right.to_int32()) as f64));
        }
        Ok(left)
    }

    fn equality(&mut self) -> EvalResult<Value> {
        let mut left = self.comparison()?;
        loop {
            let negate = match self.token.kind {
                TokenKind::EqEq => false,
                TokenKind::Neq => true,
                _ => return Ok(left),
            };
            self.advance()?;
            let right = self.comparison()?;
            left = self.fold(|| Value::Boolean(left.loose_eq(&right) != negate));
        }
    }

    fn comparison(&mut self) -> EvalResult<Value> {
        let mut left = self.shifts()?;
        loop {
            let op = match self.token.kind {
                TokenKind::Lt | TokenKind::LtEq | TokenKind::Gt | TokenKind::GtEq => {
                    self.token.kind.clone()
                }
                _ => return Ok(left),
            };
            self.advance()?;
            let right = self.shifts()?;
            left = self.fold(|| Value::Boolean(compare(&op, &left, &right)));
        }
    }

    fn shifts(&mut self) -> EvalResult<Value> {
        let mut left = self.plus_minus()?;
        loop {
            let op = match self.token.kind {
                TokenKind::Shl | TokenKind::Shr | TokenKind::Zshr => self.token.kind.clone(),
                _ => return Ok(left),
            };
            self.advance()?;
            let right = self.plus_minus()?;
            left = self.fold(|| {
                let count = right.to_uint32() & 31;
                match op {
                    TokenKind::Shl => Value::Number((left.to_int32() << count) as f64),
                    TokenKind::Shr => Value::Number((left.to_int32() >> count) as f64),
                    _ => Value::Number((left.to_uint32() >> count) as f64),
                }
            });
        }
    }

    fn plus_minus(&mut self) -> EvalResult<Value> {
        let mut left = self.mul_div_rem()?;
        loop {
            let minus = match self.token.kind {
                TokenKind::Plus => false,
                TokenKind::Minus => true,
                _ => return Ok(left),
            };
            self.advance()?;
            let right = self.mul_div_rem()?;
            left = self.fold(|| {
                if minus {
                    Value::Number(left.to_number() - right.to_number())
                } else {
                    add(&left, &right)
                }
            });
        }
    }

    fn mul_div_rem(&mut self) -> EvalResult<Value> {
        let mut left = self.unary()?;
        loop {
            let op = match self.token.kind {
                TokenKind::Star | TokenKind::Slash | TokenKind::Percent => self.token.kind.clone(),
                _ => return Ok(left),
            };
            self.advance()?;
            let right = self.unary()?;
            left = self.fold(|| {
                let (a, b) = (left.to_number(), right.to_number());
                match op {
                    TokenKind::Star => Value::Number(a * b),
                    TokenKind::Slash => Value::Number(a / b),
                    _ => Value::Number(a % b),
                }
            });
        }
    }

    // Prefix `! ~ typeof + -` are reserved for extension; for now this
    // level only forwards to the next tighter one.
    fn unary(&mut self) -> EvalResult<Value> {
        self.postfix()
    }

    // Postfix `++`/`--`, reserved for extension.
    fn postfix(&mut self) -> EvalResult<Value> {
        self.call_dot()
    }

    // `.` member access and `(...)` calls, reserved for extension.
    fn call_dot(&mut self) -> EvalResult<Value> {
        self.group()
    }

    fn group(&mut self) -> EvalResult<Value> {
        if self.token.kind == TokenKind::LParen {
            self.advance()?;
            let value = self.expression()?;
            if self.token.kind != TokenKind::RParen {
                return Err(EvalError::parse());
            }
            self.advance()?;
            return Ok(value);
        }
        self.literal()
    }

    fn literal(&mut self) -> EvalResult<Value> {
        let value = match &self.token.kind {
            TokenKind::Number(n) => Value::Number(*n),
            TokenKind::Str(s) => Value::String(s.clone()),
            TokenKind::True => Value::Boolean(true),
            TokenKind::False => Value::Boolean(false),
            TokenKind::Null => Value::Null,
            _ => return Err(EvalError::parse()),
        };
        self.advance()?;
        Ok(value)
    }

    /// Fold one binary operator, unless we are inside a skipped operand.
    fn fold(&self, compute: impl FnOnce() -> Value) -> Value {
        if self.exec() { compute() } else { Value::Null }
    }
}

/// `+`: string concatenation when either side is a string, numeric
/// addition otherwise.
fn add(left: &Value, right: &Value) -> Value {
    if matches!(left, Value::String(_)) || matches!(right, Value::String(_)) {
        Value::String(format!("{}{}", left, right))
    } else {
        Value::Number(left.to_number() + right.to_number())
    }
}

/// Relational comparison: lexicographic for two strings, otherwise numeric
/// with NaN making every comparison false.
fn compare(op: &TokenKind, left: &Value, right: &Value) -> bool {
    if let (Value::String(a), Value::String(b)) = (left, right) {
        return match op {
            TokenKind::Lt => a < b,
            TokenKind::LtEq => a <= b,
            TokenKind::Gt => a > b,
            _ => a >= b,
        };
    }
    let (a, b) = (left.to_number(), right.to_number());
    match op {
        TokenKind::Lt => a < b,
        TokenKind::LtEq => a <= b,
        TokenKind::Gt => a > b,
        _ => a >= b,
    }
}
