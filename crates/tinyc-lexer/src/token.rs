//! Token types for the tinyc lexer.
//!
//! Defines [`TokenKind`] covering every lexeme of the language and
//! [`Token`], which pairs a kind with a source [`Span`].

use std::fmt;
use tinyc_types::Span;

/// The reserved words, in the order the lexer tries them.
pub const ALL_KEYWORDS: &[&str] = &["if", "do", "int", "for", "else", "while", "return"];

// ─────────────────────────────────────────────────────────────────────
// Token
// ─────────────────────────────────────────────────────────────────────

/// A single token. Identifiers borrow from the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind<'src>,
    pub span: Span,
}

impl<'src> Token<'src> {
    pub fn new(kind: TokenKind<'src>, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn line(&self) -> u32 {
        self.span.start_line
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

// ─────────────────────────────────────────────────────────────────────
// TokenKind
// ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind<'src> {
    /// End of input. Returned forever once the source is exhausted.
    Eof,

    // ── Literals & names ─────────────────────────────────────

    /// Decimal literal, wrapped to 32 bits.
    Number(i32),
    Identifier(&'src str),

    // ── Keywords ─────────────────────────────────────────────
    Int,
    Return,
    If,
    Else,
    For,
    While,
    Do,

    // ── Operators ────────────────────────────────────────────
    Plus,
    Minus,
    Star,
    Slash,
    Amp,
    Eq,
    EqEq,
    BangEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,

    // ── Punctuation ──────────────────────────────────────────
    LParen,
    RParen,
    LBrace,
    RBrace,
    Semicolon,
    Comma,

    /// Any other byte. The parser rejects it wherever it appears.
    Unknown(u8),
}

impl<'src> TokenKind<'src> {
    /// Map an identifier to its keyword token, if it is one.
    ///
    /// Matching is by exact length and content: `integer` and `in` are
    /// plain identifiers.
    pub fn from_keyword(word: &str) -> Option<TokenKind<'static>> {
        Some(match word {
            "if" => TokenKind::If,
            "do" => TokenKind::Do,
            "int" => TokenKind::Int,
            "for" => TokenKind::For,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "return" => TokenKind::Return,
            _ => return None,
        })
    }

    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Int
                | TokenKind::Return
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::For
                | TokenKind::While
                | TokenKind::Do
        )
    }
}

impl fmt::Display for TokenKind<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Eof => f.write_str("end of input"),
            TokenKind::Number(n) => write!(f, "{n}"),
            TokenKind::Identifier(s) => f.write_str(s),
            TokenKind::Int => f.write_str("int"),
            TokenKind::Return => f.write_str("return"),
            TokenKind::If => f.write_str("if"),
            TokenKind::Else => f.write_str("else"),
            TokenKind::For => f.write_str("for"),
            TokenKind::While => f.write_str("while"),
            TokenKind::Do => f.write_str("do"),
            TokenKind::Plus => f.write_str("+"),
            TokenKind::Minus => f.write_str("-"),
            TokenKind::Star => f.write_str("*"),
            TokenKind::Slash => f.write_str("/"),
            TokenKind::Amp => f.write_str("&"),
            TokenKind::Eq => f.write_str("="),
            TokenKind::EqEq => f.write_str("=="),
            TokenKind::BangEq => f.write_str("!="),
            TokenKind::Less => f.write_str("<"),
            TokenKind::LessEq => f.write_str("<="),
            TokenKind::Greater => f.write_str(">"),
            TokenKind::GreaterEq => f.write_str(">="),
            TokenKind::LParen => f.write_str("("),
            TokenKind::RParen => f.write_str(")"),
            TokenKind::LBrace => f.write_str("{"),
            TokenKind::RBrace => f.write_str("}"),
            TokenKind::Semicolon => f.write_str(";"),
            TokenKind::Comma => f.write_str(","),
            TokenKind::Unknown(b) if b.is_ascii_graphic() => write!(f, "{}", *b as char),
            TokenKind::Unknown(b) => write!(f, "\\x{b:02x}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_keyword_round_trips() {
        for word in ALL_KEYWORDS {
            let kind = TokenKind::from_keyword(word).expect("keyword");
            assert!(kind.is_keyword());
            assert_eq!(kind.to_string(), *word);
        }
    }

    #[test]
    fn test_keyword_matching_is_exact_length() {
        assert_eq!(TokenKind::from_keyword("in"), None);
        assert_eq!(TokenKind::from_keyword("integer"), None);
        assert_eq!(TokenKind::from_keyword("doo"), None);
        assert_eq!(TokenKind::from_keyword("Int"), None);
    }

    #[test]
    fn test_unknown_display() {
        assert_eq!(TokenKind::Unknown(b'@').to_string(), "@");
        assert_eq!(TokenKind::Unknown(0x7f).to_string(), "\\x7f");
    }
}
