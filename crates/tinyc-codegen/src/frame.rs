//! Frame layout.
//!
//! Runs after parsing, once a function's local count is final. Locals take
//! one 4-byte slot each and the area is rounded up to [`FRAME_ALIGN`];
//! parameters live just above the frame, in the block the caller reserved.

use tinyc_types::symbols::{Function, SLOT_SIZE};

use crate::error::{CodegenError, CodegenResult};
use crate::types::{FRAME_ALIGN, STACK_TOP};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// Bytes reserved below the caller's stack pointer.
    pub size: u32,
    /// Whether the body addresses memory through a frame base at all.
    pub has_base: bool,
}

impl Frame {
    pub fn layout(function: &Function<'_>) -> CodegenResult<Self> {
        let locals = function.stack_size() as u32;
        let size = locals.div_ceil(FRAME_ALIGN) * FRAME_ALIGN;
        if size >= STACK_TOP as u32 {
            return Err(CodegenError::LimitExceeded(format!(
                "function '{}' needs a {size}-byte frame, the stack holds {STACK_TOP}",
                function.name
            )));
        }
        Ok(Self {
            size,
            has_base: size > 0 || function.arity() > 0,
        })
    }

    /// Memory offset from the frame base of the variable at signed
    /// `address`.
    ///
    /// Locals (`0, 4, 8, ..`) land at `size - 4, size - 8, ..`; parameter
    /// `i` (`-4 * (i + 1)`) lands at `size + 4 * i`.
    pub fn offset(&self, address: i32) -> u64 {
        (self.size as i64 - i64::from(SLOT_SIZE) - i64::from(address)) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinyc_types::symbols::FunctionId;

    fn function(params: &[&'static str], locals: &[&'static str]) -> Function<'static> {
        let mut f = Function::new("f", FunctionId(0));
        for p in params {
            f.declare_param(p, 0);
        }
        for l in locals {
            f.declare_variable(l, 0);
        }
        f
    }

    #[test]
    fn test_empty_function_has_no_frame() {
        let frame = Frame::layout(&function(&[], &[])).unwrap();
        assert_eq!(frame, Frame { size: 0, has_base: false });
    }

    #[test]
    fn test_params_only_need_a_base() {
        let frame = Frame::layout(&function(&["a"], &[])).unwrap();
        assert_eq!(frame, Frame { size: 0, has_base: true });
        assert_eq!(frame.offset(-4), 0);
    }

    #[test]
    fn test_frame_rounds_to_sixteen() {
        assert_eq!(Frame::layout(&function(&[], &["a"])).unwrap().size, 16);
        assert_eq!(Frame::layout(&function(&[], &["a", "b", "c", "d"])).unwrap().size, 16);
        assert_eq!(Frame::layout(&function(&[], &["a", "b", "c", "d", "e"])).unwrap().size, 32);
    }

    #[test]
    fn test_offsets() {
        let f = function(&["p", "q"], &["a", "b", "c"]);
        let frame = Frame::layout(&f).unwrap();
        assert_eq!(frame.size, 16);
        assert_eq!(frame.offset(0), 12);
        assert_eq!(frame.offset(4), 8);
        assert_eq!(frame.offset(8), 4);
        assert_eq!(frame.offset(-4), 16);
        assert_eq!(frame.offset(-8), 20);
    }

    #[test]
    fn test_oversized_frame_rejected() {
        let names: Vec<&'static str> = (0..16384)
            .map(|i| &*Box::leak(format!("v{i}").into_boxed_str()))
            .collect();
        let err = Frame::layout(&function(&[], &names)).unwrap_err();
        assert!(matches!(err, CodegenError::LimitExceeded(_)));
    }
}
