use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error category, determined by error code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Syntax,
    Semantic,
    Structure,
    Codegen,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => write!(f, "syntax"),
            Self::Semantic => write!(f, "semantic"),
            Self::Structure => write!(f, "structure"),
            Self::Codegen => write!(f, "codegen"),
        }
    }
}

/// Numeric error code (E100–E499).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Syntax errors (E100–E199) ──
    pub const UNEXPECTED_TOKEN: Self = Self(100);
    pub const EXPECTED_EXPRESSION: Self = Self(101);

    // ── Semantic errors (E200–E299) ──
    pub const FUNCTION_REDECLARED: Self = Self(200);
    pub const VARIABLE_REDECLARED: Self = Self(201);
    pub const PARAMETER_REDECLARED: Self = Self(202);
    pub const UNDECLARED_FUNCTION: Self = Self(203);
    pub const UNDECLARED_VARIABLE: Self = Self(204);
    pub const WRONG_ARG_COUNT: Self = Self(205);
    pub const NOT_ADDRESSABLE: Self = Self(206);
    pub const INVALID_OPERANDS: Self = Self(207);

    // ── Structure errors (E300–E399) ──
    pub const BRACKET_MISMATCH: Self = Self(300);
    pub const NO_FUNCTIONS: Self = Self(301);
    pub const STRUCTURAL_LIMIT_EXCEEDED: Self = Self(302);

    // ── Codegen errors (E400–E499) ──
    pub const MISSING_MAIN: Self = Self(400);
    /// The generator rejected the program for a reason other than a
    /// missing `main` (frame too large, module failed validation).
    pub const CODEGEN_FAILED: Self = Self(401);

    pub fn category(self) -> ErrorCategory {
        match self.0 {
            100..=199 => ErrorCategory::Syntax,
            200..=299 => ErrorCategory::Semantic,
            300..=399 => ErrorCategory::Structure,
            _ => ErrorCategory::Codegen,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// A structured compiler diagnostic.
///
/// Hosts render these fields directly; the message is already fully
/// substituted by [`format_message`](crate::format_message).
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{span}: {code} [{category}] {message}")]
pub struct TinycError {
    /// Source file name.
    pub file: String,
    pub code: ErrorCode,
    /// Derived from `code`.
    pub category: ErrorCategory,
    pub message: String,
    #[serde(flatten)]
    pub span: Span,
    /// The offending source line, for context.
    pub source_line: String,
}

impl TinycError {
    pub fn new(
        file: impl Into<String>,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        source_line: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            code,
            category: code.category(),
            message: message.into(),
            span,
            source_line: source_line.into(),
        }
    }
}

/// The structured JSON error report for a compilation.
///
/// Compilation stops at the first fatal diagnostic, so `errors` holds at
/// most one entry today. The list shape keeps the JSON stable for hosts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompileErrors {
    pub errors: Vec<TinycError>,
    pub total_errors: usize,
}

impl CompileErrors {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    pub fn push_error(&mut self, error: TinycError) {
        self.errors.push(error);
        self.total_errors += 1;
    }

    /// The first (and fatal) diagnostic, if any.
    pub fn first(&self) -> Option<&TinycError> {
        self.errors.first()
    }
}

impl From<TinycError> for CompileErrors {
    fn from(error: TinycError) -> Self {
        let mut errors = Self::empty();
        errors.push_error(error);
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TinycError {
        TinycError::new(
            "add.c",
            ErrorCode::WRONG_ARG_COUNT,
            "Function add requires 2 arguments, but 1 were given",
            Span::new(2, 27, 2, 30),
            "int main() { return add(3); }",
        )
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::UNEXPECTED_TOKEN.category(), ErrorCategory::Syntax);
        assert_eq!(ErrorCode::INVALID_OPERANDS.category(), ErrorCategory::Semantic);
        assert_eq!(ErrorCode::BRACKET_MISMATCH.category(), ErrorCategory::Structure);
        assert_eq!(ErrorCode::STRUCTURAL_LIMIT_EXCEEDED.category(), ErrorCategory::Structure);
        assert_eq!(ErrorCode::MISSING_MAIN.category(), ErrorCategory::Codegen);
    }

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::WRONG_ARG_COUNT.to_string(), "E205");
        assert_eq!(ErrorCode::BRACKET_MISMATCH.to_string(), "E300");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            sample().to_string(),
            "2:27: E205 [semantic] Function add requires 2 arguments, but 1 were given"
        );
    }

    #[test]
    fn test_error_json_round_trip() {
        let err = sample();
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"category\":\"semantic\""));
        assert!(json.contains("\"line\":2"));
        assert!(json.contains("\"column\":27"));
        assert!(json.contains("\"source_line\""));
        let back: TinycError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, err);
    }

    #[test]
    fn test_compile_errors_from_single() {
        let errs = CompileErrors::from(sample());
        assert!(errs.has_errors());
        assert_eq!(errs.total_errors, 1);
        assert_eq!(errs.first().map(|e| e.code), Some(ErrorCode::WRONG_ARG_COUNT));
    }

    #[test]
    fn test_compile_errors_empty() {
        let errs = CompileErrors::empty();
        assert!(!errs.has_errors());
        assert!(errs.first().is_none());
        let json = serde_json::to_string(&errs).unwrap();
        assert_eq!(json, r#"{"errors":[],"total_errors":0}"#);
    }

    #[test]
    fn test_error_determinism_100_iterations() {
        let first = serde_json::to_string(&sample()).unwrap();
        for i in 0..100 {
            let json = serde_json::to_string(&sample()).unwrap();
            assert_eq!(first, json, "Determinism failure at iteration {i}");
        }
    }
}
