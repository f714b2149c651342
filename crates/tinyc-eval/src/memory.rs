//! Simulated linear memory.
//!
//! Same size and byte order as the compiled module's memory, with the same
//! bounds rule: an access traps unless all four bytes at
//! `base + offset` lie inside it.

use tinyc_codegen::types::MEMORY_PAGES;

use crate::error::{EvalError, EvalResult};

pub const PAGE_SIZE: usize = 65536;

#[derive(Debug, Clone)]
pub struct Memory {
    bytes: Vec<u8>,
}

impl Memory {
    pub fn new() -> Self {
        Self {
            bytes: vec![0; MEMORY_PAGES as usize * PAGE_SIZE],
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The base is reinterpreted as unsigned; the sum does not wrap.
    fn range(&self, base: i32, offset: u64) -> EvalResult<std::ops::Range<usize>> {
        let address = u64::from(base as u32) + offset;
        match usize::try_from(address) {
            Ok(start) if start + 4 <= self.bytes.len() => Ok(start..start + 4),
            _ => Err(EvalError::OutOfBounds { address }),
        }
    }

    pub fn load(&self, base: i32, offset: u64) -> EvalResult<i32> {
        let range = self.range(base, offset)?;
        let mut word = [0u8; 4];
        word.copy_from_slice(&self.bytes[range]);
        Ok(i32::from_le_bytes(word))
    }

    pub fn store(&mut self, base: i32, offset: u64, value: i32) -> EvalResult<()> {
        let range = self.range(base, offset)?;
        self.bytes[range].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}
