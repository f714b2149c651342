//! Pull-based tinyc lexer.
//!
//! The lexer keeps exactly one token of lookahead: [`Lexer::current`]
//! peeks at it and [`Lexer::advance`] hands it over and scans the next.
//!
//! - Whitespace, `// line` and `/* block */` comments are skipped
//! - Integer literals wrap to 32 bits
//! - `==`, `!=`, `<=`, `>=` win over their one-byte prefixes
//! - Unrecognised bytes become [`TokenKind::Unknown`]; the lexer never fails

use tinyc_types::Span;

use crate::token::{Token, TokenKind};

pub struct Lexer<'src> {
    source: &'src str,
    bytes: &'src [u8],
    /// Current byte offset into `source`.
    pos: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    col: u32,
    /// The lookahead token.
    current: Token<'src>,
}

impl<'src> Lexer<'src> {
    /// Reset to the start of `source` and scan the first token.
    pub fn new(source: &'src str) -> Self {
        let mut lexer = Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            line: 1,
            col: 1,
            current: Token::new(TokenKind::Eof, Span::point(1, 1)),
        };
        lexer.current = lexer.scan_token();
        lexer
    }

    /// The token at the cursor, not consumed.
    pub fn current(&self) -> &Token<'src> {
        &self.current
    }

    /// Consume the current token and scan the next one.
    pub fn advance(&mut self) -> Token<'src> {
        let next = self.scan_token();
        std::mem::replace(&mut self.current, next)
    }

    /// Line the scanner has reached, including newlines skipped after the
    /// current token.
    pub fn line(&self) -> u32 {
        self.line
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn span_from(&self, start_line: u32, start_col: u32) -> Span {
        Span::new(start_line, start_col, self.line, self.col.saturating_sub(1).max(1))
    }

    // ─────────────────────────────────────────────────────────────
    // Whitespace & comments
    // ─────────────────────────────────────────────────────────────

    fn skip_trivia(&mut self) {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(b' ' | b'\t' | b'\r' | b'\n'), _) => {
                    self.bump();
                }
                (Some(b'/'), Some(b'/')) => {
                    while self.peek().is_some_and(|ch| ch != b'\n') {
                        self.bump();
                    }
                }
                (Some(b'/'), Some(b'*')) => {
                    self.bump();
                    self.bump();
                    // An unterminated comment runs to end of input.
                    while let Some(ch) = self.bump() {
                        if ch == b'*' && self.peek() == Some(b'/') {
                            self.bump();
                            break;
                        }
                    }
                }
                _ => return,
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Scanning
    // ─────────────────────────────────────────────────────────────

    fn scan_token(&mut self) -> Token<'src> {
        self.skip_trivia();

        let start_line = self.line;
        let start_col = self.col;
        let Some(ch) = self.bump() else {
            return Token::new(TokenKind::Eof, Span::point(self.line, self.col));
        };

        let kind = match ch {
            b'0'..=b'9' => self.scan_number(ch),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.scan_word(),

            b'=' => self.one_or_two(TokenKind::Eq, TokenKind::EqEq),
            b'<' => self.one_or_two(TokenKind::Less, TokenKind::LessEq),
            b'>' => self.one_or_two(TokenKind::Greater, TokenKind::GreaterEq),
            b'!' => self.one_or_two(TokenKind::Unknown(b'!'), TokenKind::BangEq),

            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'&' => TokenKind::Amp,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b';' => TokenKind::Semicolon,
            b',' => TokenKind::Comma,

            other => TokenKind::Unknown(other),
        };

        Token::new(kind, self.span_from(start_line, start_col))
    }

    /// `single`, or `double` when the next byte is `=`.
    fn one_or_two(&mut self, single: TokenKind<'src>, double: TokenKind<'src>) -> TokenKind<'src> {
        if self.peek() == Some(b'=') {
            self.bump();
            double
        } else {
            single
        }
    }

    fn scan_number(&mut self, first: u8) -> TokenKind<'src> {
        let mut value = i32::from(first - b'0');
        while let Some(d @ b'0'..=b'9') = self.peek() {
            self.bump();
            value = value.wrapping_mul(10).wrapping_add(i32::from(d - b'0'));
        }
        TokenKind::Number(value)
    }

    fn scan_word(&mut self) -> TokenKind<'src> {
        let start = self.pos - 1;
        while self.peek().is_some_and(|ch| ch.is_ascii_alphanumeric() || ch == b'_') {
            self.bump();
        }
        let word = &self.source[start..self.pos];
        TokenKind::from_keyword(word).unwrap_or(TokenKind::Identifier(word))
    }
}

/// Yields the remaining tokens, stopping before [`TokenKind::Eof`].
impl<'src> Iterator for Lexer<'src> {
    type Item = Token<'src>;

    fn next(&mut self) -> Option<Token<'src>> {
        if self.current.is_eof() {
            None
        } else {
            Some(self.advance())
        }
    }
}
