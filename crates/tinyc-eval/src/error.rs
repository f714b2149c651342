//! Runtime error types for the tinyc evaluator.

use thiserror::Error;

/// Evaluation error: runtime traps and resource exhaustion.
///
/// The trap variants correspond one-to-one with the traps the compiled
/// module raises for the same program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("integer divide by zero")]
    DivisionByZero,

    /// `i32::MIN / -1`
    #[error("integer overflow")]
    IntegerOverflow,

    #[error("out of bounds memory access at {address}")]
    OutOfBounds { address: u64 },

    /// Call nesting beyond [`crate::MAX_CALL_DEPTH`].
    #[error("call stack exhausted")]
    StackOverflow,

    #[error("gas exhausted")]
    GasExhausted,

    #[error("unknown function: {0}")]
    UnknownFunction(String),

    /// `return` statement (used internally for control flow)
    #[error("return")]
    Return(i32),

    /// An AST shape the parser never produces.
    #[error("internal evaluator error: {0}")]
    Internal(String),
}

/// Result alias for evaluator operations.
pub type EvalResult<T> = Result<T, EvalError>;
