use crate::error::{EvalError, EvalResult};

/// Lexical category of a token. Literal-carrying variants hold their
/// decoded payload; identifiers keep the source spelling.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Eof,
    Identifier(String),
    Number(f64),
    Str(String),

    // Punctuation
    Semicolon,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Dot,
    Colon,
    Question,

    // Keywords
    Break,
    Case,
    Catch,
    Class,
    Const,
    Continue,
    Default,
    Delete,
    Do,
    Else,
    Finally,
    For,
    Function,
    If,
    In,
    Instanceof,
    Let,
    New,
    Return,
    Switch,
    This,
    Throw,
    Try,
    Typeof,
    Undefined,
    Var,
    Void,
    While,
    With,
    Yield,
    Null,
    True,
    False,

    // Operators
    Bang,
    Tilde,
    Star,
    Slash,
    Percent,
    Plus,
    Minus,
    PlusPlus,
    MinusMinus,
    Shl,
    Shr,
    Zshr,
    Lt,
    LtEq,
    Gt,
    GtEq,
    EqEq,
    Neq,
    BitAnd,
    BitXor,
    BitOr,
    And,
    Or,

    // Assignment operators (parsed but not executable in this subset)
    Eq,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    ShlEq,
    ShrEq,
    ZshrEq,
    AndEq,
    XorEq,
    OrEq,
}

impl TokenKind {
    /// True for the `=`-family operators handled at the assignment level.
    pub fn is_assignment(&self) -> bool {
        matches!(
            self,
            TokenKind::Eq
                | TokenKind::PlusEq
                | TokenKind::MinusEq
                | TokenKind::StarEq
                | TokenKind::SlashEq
                | TokenKind::PercentEq
                | TokenKind::ShlEq
                | TokenKind::ShrEq
                | TokenKind::ZshrEq
                | TokenKind::AndEq
                | TokenKind::XorEq
                | TokenKind::OrEq
        )
    }

    /// Reserved statement keywords that must produce the stable
    /// `"<keyword> not implement"` diagnostic instead of parsing.
    pub fn is_reserved_statement(&self) -> bool {
        matches!(
            self,
            TokenKind::Case
                | TokenKind::Catch
                | TokenKind::Class
                | TokenKind::Const
                | TokenKind::Default
                | TokenKind::Delete
                | TokenKind::Do
                | TokenKind::Finally
                | TokenKind::In
                | TokenKind::Instanceof
                | TokenKind::New
                | TokenKind::Switch
                | TokenKind::This
                | TokenKind::Throw
                | TokenKind::Try
                | TokenKind::Var
                | TokenKind::Void
                | TokenKind::With
                | TokenKind::While
                | TokenKind::Yield
        )
    }
}

/// One classified token with its byte span in the source. The span is what
/// diagnostics quote, so it must cover exactly the recognized text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub len: usize,
}

impl Token {
    /// The exact source text this token was recognized from.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.start + self.len]
    }
}

/// Hand-written lexer over a source string. Produces one token per call;
/// no token stream is retained.
pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer { source, pos: 0 }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek2(&self) -> Option<char> {
        let mut it = self.source[self.pos..].chars();
        it.next();
        it.next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Consume `c` if it is the next character.
    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(' ' | '\t' | '\r' | '\n') => {
                    self.bump();
                }
                Some('/') if self.peek2() == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                _ => break,
            }
        }
    }

    /// Recognize the next token and advance past it.
    ///
    /// On error the cursor position is unspecified; the caller must abort
    /// the whole evaluation rather than retry.
    pub fn next_token(&mut self) -> EvalResult<Token> {
        self.skip_whitespace_and_comments();

        let start = self.pos;
        let Some(c) = self.bump() else {
            return Ok(self.make(TokenKind::Eof, start));
        };

        let kind = match c {
            ';' => TokenKind::Semicolon,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            ':' => TokenKind::Colon,
            '?' => TokenKind::Question,
            '~' => TokenKind::Tilde,

            '+' => {
                if self.eat('+') {
                    TokenKind::PlusPlus
                } else if self.eat('=') {
                    TokenKind::PlusEq
                } else {
                    TokenKind::Plus
                }
            }
            '-' => {
                if self.eat('-') {
                    TokenKind::MinusMinus
                } else if self.eat('=') {
                    TokenKind::MinusEq
                } else {
                    TokenKind::Minus
                }
            }
            '*' => {
                if self.eat('=') {
                    TokenKind::StarEq
                } else {
                    TokenKind::Star
                }
            }
            '/' => {
                // Line comments were already skipped above.
                if self.eat('=') {
                    TokenKind::SlashEq
                } else {
                    TokenKind::Slash
                }
            }
            '%' => {
                if self.eat('=') {
                    TokenKind::PercentEq
                } else {
                    TokenKind::Percent
                }
            }
            '<' => {
                if self.eat('<') {
                    if self.eat('=') {
                        TokenKind::ShlEq
                    } else {
                        TokenKind::Shl
                    }
                } else if self.eat('=') {
                    TokenKind::LtEq
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.eat('>') {
                    if self.eat('>') {
                        if self.eat('=') {
                            TokenKind::ZshrEq
                        } else {
                            TokenKind::Zshr
                        }
                    } else if self.eat('=') {
                        TokenKind::ShrEq
                    } else {
                        TokenKind::Shr
                    }
                } else if self.eat('=') {
                    TokenKind::GtEq
                } else {
                    TokenKind::Gt
                }
            }
            '=' => {
                if self.eat('=') {
                    TokenKind::EqEq
                } else {
                    TokenKind::Eq
                }
            }
            '!' => {
                if self.eat('=') {
                    TokenKind::Neq
                } else {
                    TokenKind::Bang
                }
            }
            '&' => {
                if self.eat('&') {
                    TokenKind::And
                } else if self.eat('=') {
                    TokenKind::AndEq
                } else {
                    TokenKind::BitAnd
                }
            }
            '|' => {
                if self.eat('|') {
                    TokenKind::Or
                } else if self.eat('=') {
                    TokenKind::OrEq
                } else {
                    TokenKind::BitOr
                }
            }
            '^' => {
                if self.eat('=') {
                    TokenKind::XorEq
                } else {
                    TokenKind::BitXor
                }
            }

            '"' | '\'' => self.read_string(c, start)?,
            c if c.is_ascii_digit() => self.read_number(start)?,
            c if c.is_alphabetic() || c == '_' || c == '$' => self.read_identifier(start),

            other => {
                return Err(EvalError::lex(format!(
                    "unexpected character '{}' at offset {}",
                    other, start
                )));
            }
        };

        Ok(self.make(kind, start))
    }

    fn make(&self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            start,
            len: self.pos - start,
        }
    }

    fn read_string(&mut self, quote: char, start: usize) -> EvalResult<TokenKind> {
        let mut text = String::new();
        loop {
            match self.bump() {
                None => {
                    return Err(EvalError::lex(format!(
                        "unterminated string literal starting at offset {}",
                        start
                    )));
                }
                Some(c) if c == quote => return Ok(TokenKind::Str(text)),
                Some('\\') => {
                    let Some(esc) = self.bump() else {
                        return Err(EvalError::lex(format!(
                            "unterminated string literal starting at offset {}",
                            start
                        )));
                    };
                    match esc {
                        'n' => text.push('\n'),
                        't' => text.push('\t'),
                        'r' => text.push('\r'),
                        '0' => text.push('\0'),
                        // Unknown escapes keep the escaped character.
                        other => text.push(other),
                    }
                }
                Some(c) => text.push(c),
            }
        }
    }

    fn read_number(&mut self, start: usize) -> EvalResult<TokenKind> {
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.bump();
        }
        // A fractional part only counts if a digit follows the dot,
        // otherwise the dot is a member-access token.
        if self.peek() == Some('.') && matches!(self.peek2(), Some(c) if c.is_ascii_digit()) {
            self.bump();
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.bump();
            }
        }

        let text = &self.source[start..self.pos];
        let n = text.parse::<f64>().map_err(|_| {
            EvalError::lex(format!("malformed number literal '{}' at offset {}", text, start))
        })?;
        Ok(TokenKind::Number(n))
    }

    fn read_identifier(&mut self, start: usize) -> TokenKind {
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_' || c == '$') {
            self.bump();
        }
        match &self.source[start..self.pos] {
            "break" => TokenKind::Break,
            "case" => TokenKind::Case,
            "catch" => TokenKind::Catch,
            "class" => TokenKind::Class,
            "const" => TokenKind::Const,
            "continue" => TokenKind::Continue,
            "default" => TokenKind::Default,
            "delete" => TokenKind::Delete,
            "do" => TokenKind::Do,
            "else" => TokenKind::Else,
            "finally" => TokenKind::Finally,
            "for" => TokenKind::For,
            "function" => TokenKind::Function,
            "if" => TokenKind::If,
            "in" => TokenKind::In,
            "instanceof" => TokenKind::Instanceof,
            "let" => TokenKind::Let,
            "new" => TokenKind::New,
            "return" => TokenKind::Return,
            "switch" => TokenKind::Switch,
            "this" => TokenKind::This,
            "throw" => TokenKind::Throw,
            "try" => TokenKind::Try,
            "typeof" => TokenKind::Typeof,
            "undefined" => TokenKind::Undefined,
            "var" => TokenKind::Var,
            "void" => TokenKind::Void,
            "while" => TokenKind::While,
            "with" => TokenKind::With,
            "yield" => TokenKind::Yield,
            "null" => TokenKind::Null,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            ident => TokenKind::Identifier(ident.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(source);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token().expect("lex failure");
            let eof = token.kind == TokenKind::Eof;
            out.push(token.kind);
            if eof {
                break;
            }
        }
        out
    }

    #[test]
    fn maximal_munch_on_shift_operators() {
        assert_eq!(
            kinds("< <= << <<= > >= >> >>= >>> >>>="),
            vec![
                TokenKind::Lt,
                TokenKind::LtEq,
                TokenKind::Shl,
                TokenKind::ShlEq,
                TokenKind::Gt,
                TokenKind::GtEq,
                TokenKind::Shr,
                TokenKind::ShrEq,
                TokenKind::Zshr,
                TokenKind::ZshrEq,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn logical_vs_bitwise() {
        assert_eq!(
            kinds("& && &= | || |= ^ ^="),
            vec![
                TokenKind::BitAnd,
                TokenKind::And,
                TokenKind::AndEq,
                TokenKind::BitOr,
                TokenKind::Or,
                TokenKind::OrEq,
                TokenKind::BitXor,
                TokenKind::XorEq,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn numbers_and_strings() {
        assert_eq!(
            kinds("3.25 'it\\'s' \"a\\tb\""),
            vec![
                TokenKind::Number(3.25),
                TokenKind::Str("it's".into()),
                TokenKind::Str("a\tb".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            kinds("while whilex _tmp $x"),
            vec![
                TokenKind::While,
                TokenKind::Identifier("whilex".into()),
                TokenKind::Identifier("_tmp".into()),
                TokenKind::Identifier("$x".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn spans_cover_exact_source_text() {
        let source = "  while (true) {}";
        let mut lexer = Lexer::new(source);
        let token = lexer.next_token().unwrap();
        assert_eq!(token.text(source), "while");
        assert_eq!(token.start, 2);
        assert_eq!(token.len, 5);
    }

    #[test]
    fn line_comments_are_skipped() {
        assert_eq!(
            kinds("1; // the rest is ignored\n2;"),
            vec![
                TokenKind::Number(1.0),
                TokenKind::Semicolon,
                TokenKind::Number(2.0),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_errors() {
        let mut lexer = Lexer::new("@");
        assert!(matches!(lexer.next_token(), Err(EvalError::Lex(_))));

        let mut lexer = Lexer::new("\"open");
        assert!(matches!(lexer.next_token(), Err(EvalError::Lex(_))));
    }
}
