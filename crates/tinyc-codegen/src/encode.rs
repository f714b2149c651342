//! Byte-level encoding: LEB128 integers, names, length-prefixed regions and
//! the per-function instruction sink.
//!
//! Variable-size regions (function bodies, sections) are always built in a
//! scratch `Vec<u8>` first; [`write_sized`] then writes the finished length
//! and copies the content, so a prefix can never disagree with what follows.

use wasm_encoder::{Encode, Instruction};

/// Unsigned LEB128.
pub fn write_u32(out: &mut Vec<u8>, mut value: u32) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// Signed LEB128.
pub fn write_i32(out: &mut Vec<u8>, mut value: i32) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        let done = (value == 0 && byte & 0x40 == 0) || (value == -1 && byte & 0x40 != 0);
        if done {
            out.push(byte);
            break;
        }
        out.push(byte | 0x80);
    }
}

/// Vector count or byte length as a `u32`.
pub fn write_len(out: &mut Vec<u8>, len: usize) {
    // Module contents are bounded by one compilation's source; u32 always
    // suffices.
    write_u32(out, len as u32);
}

/// A UTF-8 name: byte length, then bytes.
pub fn write_name(out: &mut Vec<u8>, name: &str) {
    write_len(out, name.len());
    out.extend_from_slice(name.as_bytes());
}

/// Length prefix of `content`, then `content` itself.
pub fn write_sized(out: &mut Vec<u8>, content: &[u8]) {
    write_len(out, content.len());
    out.extend_from_slice(content);
}

/// A section: id byte, then the length-prefixed content.
pub fn write_section(out: &mut Vec<u8>, id: u8, content: &[u8]) {
    out.push(id);
    write_sized(out, content);
}

// ══════════════════════════════════════════════════════════════════════════════
// Instruction sink
// ══════════════════════════════════════════════════════════════════════════════

/// Instruction bytes of one function body, without its locals header.
#[derive(Debug, Default)]
pub struct Body {
    bytes: Vec<u8>,
}

impl Body {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instruction(&mut self, instruction: &Instruction<'_>) -> &mut Self {
        log::trace!("  {instruction:?}");
        instruction.encode(&mut self.bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u32_bytes(value: u32) -> Vec<u8> {
        let mut out = Vec::new();
        write_u32(&mut out, value);
        out
    }

    fn i32_bytes(value: i32) -> Vec<u8> {
        let mut out = Vec::new();
        write_i32(&mut out, value);
        out
    }

    #[test]
    fn test_u32_known_encodings() {
        assert_eq!(u32_bytes(0), [0x00]);
        assert_eq!(u32_bytes(127), [0x7F]);
        assert_eq!(u32_bytes(128), [0x80, 0x01]);
        assert_eq!(u32_bytes(624_485), [0xE5, 0x8E, 0x26]);
        assert_eq!(u32_bytes(u32::MAX), [0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);
    }

    #[test]
    fn test_i32_known_encodings() {
        assert_eq!(i32_bytes(0), [0x00]);
        assert_eq!(i32_bytes(63), [0x3F]);
        assert_eq!(i32_bytes(64), [0xC0, 0x00]);
        assert_eq!(i32_bytes(-1), [0x7F]);
        assert_eq!(i32_bytes(-64), [0x40]);
        assert_eq!(i32_bytes(-65), [0xBF, 0x7F]);
        assert_eq!(i32_bytes(65536), [0x80, 0x80, 0x04]);
    }

    #[test]
    fn test_leb_matches_wasm_encoder() {
        let unsigned = [0, 1, 63, 64, 127, 128, 255, 16_383, 16_384, 1 << 21, 1 << 28, u32::MAX];
        for value in unsigned {
            let mut expected = Vec::new();
            value.encode(&mut expected);
            assert_eq!(u32_bytes(value), expected, "u32 {value}");
        }
        let signed = [0, 1, -1, 63, 64, -64, -65, 8191, -8192, 65536, i32::MAX, i32::MIN];
        for value in signed {
            let mut expected = Vec::new();
            value.encode(&mut expected);
            assert_eq!(i32_bytes(value), expected, "i32 {value}");
        }
    }

    #[test]
    fn test_name_matches_wasm_encoder() {
        let mut ours = Vec::new();
        write_name(&mut ours, "main");
        let mut expected = Vec::new();
        "main".encode(&mut expected);
        assert_eq!(ours, expected);
    }

    #[test]
    fn test_sized_prefix_grows_with_content() {
        let content = vec![0xAB; 200];
        let mut out = vec![0xEE];
        write_sized(&mut out, &content);
        assert_eq!(&out[..3], &[0xEE, 0xC8, 0x01]);
        assert_eq!(out.len(), 1 + 2 + 200);
        assert!(out[3..].iter().all(|&b| b == 0xAB));
    }

    #[test]
    fn test_section_header() {
        let mut out = Vec::new();
        write_section(&mut out, 5, &[0x01, 0x00, 0x01]);
        assert_eq!(out, [5, 3, 0x01, 0x00, 0x01]);
    }

    #[test]
    fn test_body_encodes_instructions() {
        let mut body = Body::new();
        body.instruction(&Instruction::I32Const(-1))
            .instruction(&Instruction::I32Mul)
            .instruction(&Instruction::End);
        assert_eq!(body.as_bytes(), [0x41, 0x7F, 0x6C, 0x0B]);
        assert_eq!(body.len(), 4);
    }
}
