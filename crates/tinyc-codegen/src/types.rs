//! Binary-format constants and the module's memory layout.
//!
//! ```text
//! 0 ─────────────────────────── STACK_TOP (64 KiB, one page)
//!                  ◄── frames grow downward from here
//! ```
//!
//! Every function frame is addressed through a frame-base local:
//!
//! ```text
//! fp + 0 .. fp + size          locals, last declared lowest
//! fp + size + 4*i              argument i, written by the caller
//! ```

/// `\0asm`
pub const WASM_MAGIC: [u8; 4] = [0x00, 0x61, 0x73, 0x6D];
pub const WASM_VERSION: [u8; 4] = [0x01, 0x00, 0x00, 0x00];

// ── Section ids ──────────────────────────────────────────────────────────────

pub const SECTION_TYPE: u8 = 1;
pub const SECTION_FUNCTION: u8 = 3;
pub const SECTION_MEMORY: u8 = 5;
pub const SECTION_GLOBAL: u8 = 6;
pub const SECTION_EXPORT: u8 = 7;
pub const SECTION_CODE: u8 = 10;

// ── Encodings ────────────────────────────────────────────────────────────────

pub const VALTYPE_I32: u8 = 0x7F;
pub const FUNC_TYPE_FORM: u8 = 0x60;
pub const EXPORT_KIND_FUNC: u8 = 0x00;
pub const GLOBAL_MUTABLE: u8 = 0x01;
/// Memory limits flag: minimum only, no maximum.
pub const LIMITS_MIN_ONLY: u8 = 0x00;
pub const OP_I32_CONST: u8 = 0x41;
pub const OP_END: u8 = 0x0B;

// ── Indices ──────────────────────────────────────────────────────────────────

/// The single function type, `() -> i32`, shared by every function.
pub const TYPE_VOID_I32: u32 = 0;
/// The stack-pointer global.
pub const GLOBAL_SP: u32 = 0;

// ── Memory layout ────────────────────────────────────────────────────────────

/// Initial memory size in 64 KiB pages.
pub const MEMORY_PAGES: u32 = 1;
/// Initial stack pointer: the top of the first page.
pub const STACK_TOP: i32 = 65536;
/// Frames are rounded up to this many bytes.
pub const FRAME_ALIGN: u32 = 16;
/// log2 of the natural alignment of an `i32` access.
pub const I32_ALIGN: u32 = 2;
