//! tinyc tree-walking evaluator: reference implementation.
//!
//! Executes programs directly from the AST without WASM compilation, using
//! a simulated linear memory and the code generator's frame layout, so
//! pointer programs observe the same addresses they would in the compiled
//! module. Used as the golden reference for WASM output.

pub mod error;
pub mod evaluator;
pub mod memory;

pub use error::{EvalError, EvalResult};
pub use evaluator::{run_main, Evaluator, DEFAULT_GAS_LIMIT, MAX_CALL_DEPTH};
pub use memory::Memory;
