//! tinyc WASM code generator: compiles a parsed program to a `.wasm` binary.
//!
//! # Architecture
//!
//! The generator takes a [`tinyc_types::ast::Program`] and produces a
//! self-contained WebAssembly 1.0 module:
//!
//! ## Exports
//! - every source function under its own name, in declaration order, each
//!   of type `() -> i32`
//!
//! ## Memory
//!
//! One page of linear memory holds a downward-growing stack of frames.
//! Arguments are passed in memory, not as WASM parameters: the caller
//! reserves a block below the stack pointer global and stores them there.
//! See [`types`] for the layout and [`frame`] for how offsets are computed.

pub mod compiler;
pub mod encode;
pub mod error;
pub mod expr;
pub mod frame;
pub mod stmt;
pub mod types;

pub use compiler::generate;
pub use error::{CodegenError, CodegenResult};
pub use frame::Frame;
