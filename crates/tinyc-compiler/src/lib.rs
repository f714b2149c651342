//! tinyc compiler: orchestrates the full compilation pipeline.
//!
//! ```text
//! tinyc source → Lexer → Parser (AST, symbols, folding) → WASM Codegen → .wasm
//! ```
//!
//! Compilation stops at the first fatal diagnostic; codegen never runs on a
//! program that failed to parse.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tinyc_codegen::CodegenError;
use tinyc_types::{ErrorCode, SourceFile, Span, TinycError};

pub use tinyc_types::CompileErrors;

/// Everything a host needs from one compilation, serialisable to JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileResult {
    pub success: bool,
    /// The module bytes; `None` on failure.
    pub wasm: Option<Vec<u8>>,
    pub errors: CompileErrors,
    /// SHA-256 of the source text, lowercase hex.
    pub source_hash: String,
    /// SHA-256 of the module bytes, lowercase hex; `None` on failure.
    pub wasm_hash: Option<String>,
}

/// Compile source text to a `.wasm` binary.
pub fn compile(source: &str, filename: &str) -> Result<Vec<u8>, CompileErrors> {
    log::debug!("compiling {filename} ({} bytes)", source.len());

    let parsed = tinyc_parser::parse(source, filename);
    let Some(program) = parsed.program else {
        log::debug!("parse failed: {} error(s)", parsed.errors.total_errors);
        return Err(parsed.errors);
    };
    if program.functions.is_empty() {
        return Err(end_of_input_error(
            source,
            filename,
            ErrorCode::NO_FUNCTIONS,
            "There are no functions to compile",
        )
        .into());
    }
    log::debug!(
        "parsed {} functions into {} nodes",
        program.functions.len(),
        program.ast.len()
    );

    match tinyc_codegen::generate(&program) {
        Ok(wasm) => {
            log::debug!("generated {} bytes of wasm", wasm.len());
            Ok(wasm)
        }
        Err(e @ CodegenError::MissingMain) => {
            Err(end_of_input_error(source, filename, ErrorCode::MISSING_MAIN, e.to_string()).into())
        }
        Err(e) => {
            log::error!("codegen failed: {e}");
            Err(end_of_input_error(source, filename, ErrorCode::CODEGEN_FAILED, e.to_string()).into())
        }
    }
}

/// Compile and package the outcome with content hashes.
pub fn compile_to_result(source: &str, filename: &str) -> CompileResult {
    let source_hash = sha256_hex(source.as_bytes());
    match compile(source, filename) {
        Ok(wasm) => CompileResult {
            success: true,
            wasm_hash: Some(sha256_hex(&wasm)),
            wasm: Some(wasm),
            errors: CompileErrors::empty(),
            source_hash,
        },
        Err(errors) => CompileResult {
            success: false,
            wasm: None,
            errors,
            source_hash,
            wasm_hash: None,
        },
    }
}

/// Lex and parse only. Faster than full compilation when only diagnostics
/// are needed (e.g., editor integration).
pub fn check(source: &str, filename: &str) -> CompileErrors {
    let parsed = tinyc_parser::parse(source, filename);
    match parsed.program {
        Some(program) if program.functions.is_empty() => end_of_input_error(
            source,
            filename,
            ErrorCode::NO_FUNCTIONS,
            "There are no functions to compile",
        )
        .into(),
        Some(_) => CompileErrors::empty(),
        None => parsed.errors,
    }
}

/// A whole-program diagnostic, reported at the last line.
fn end_of_input_error(
    source: &str,
    filename: &str,
    code: ErrorCode,
    message: impl Into<String>,
) -> TinycError {
    let file = SourceFile::new(filename, source);
    let line = file.line_count() as u32;
    let source_line = file.line(line).unwrap_or_default();
    TinycError::new(filename, code, message, Span::point(line, 1), source_line)
}

fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
