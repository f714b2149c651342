//! Shared types for the tinyc compiler.
//!
//! This crate defines the AST arena, the function and variable symbol
//! tables, source spans, diagnostics and the diagnostic message formatter
//! used across all compiler stages.

mod error;
mod format;
mod span;
pub mod ast;
pub mod ast_print;
pub mod symbols;

pub use error::{CompileErrors, ErrorCategory, ErrorCode, TinycError};
pub use format::{format_message, MessageArg, MAX_MESSAGE_LEN};
pub use span::{SourceFile, Span};

/// Result type used throughout the tinyc compiler.
pub type Result<T> = std::result::Result<T, TinycError>;
