//! Codegen error types.

use thiserror::Error;

/// Errors that can occur during WASM code generation.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// The program declares no function called `main`.
    #[error("There's no function called main")]
    MissingMain,

    /// An AST node appeared where the parser never places it.
    #[error("internal codegen error: {0}")]
    Internal(String),

    /// The generated WASM module failed validation.
    #[error("WASM validation failed: {0}")]
    ValidationFailed(String),

    /// A frame or index outgrew what the module layout can address.
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),
}

/// Codegen result type alias.
pub type CodegenResult<T> = Result<T, CodegenError>;
