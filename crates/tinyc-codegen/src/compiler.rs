//! Module assembler.
//!
//! Orchestrates code generation:
//! 1. Check that `main` exists
//! 2. Lay out every function's frame and emit its body
//! 3. Assemble the sections, each length-prefixed after its content exists
//! 4. Validate with `wasmparser`

use tinyc_types::ast::{Ast, Program};
use tinyc_types::symbols::Function;
use wasm_encoder::Instruction;

use crate::encode::{write_i32, write_len, write_name, write_sized, write_section, write_u32, Body};
use crate::error::{CodegenError, CodegenResult};
use crate::frame::Frame;
use crate::stmt::emit_stmt;
use crate::types::*;

// ══════════════════════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════════════════════

/// Compile a parsed [`Program`] into a `.wasm` binary.
///
/// Returns the raw bytes of a valid WebAssembly module, or a
/// [`CodegenError`] describing what went wrong.
pub fn generate(program: &Program<'_>) -> CodegenResult<Vec<u8>> {
    Compiler::new(program).compile()
}

// ══════════════════════════════════════════════════════════════════════════════
// Compiler
// ══════════════════════════════════════════════════════════════════════════════

struct Compiler<'a, 'src> {
    program: &'a Program<'src>,
    /// Whether any function addresses linear memory through a frame, and
    /// therefore the stack-pointer global must exist.
    uses_stack: bool,
}

impl<'a, 'src> Compiler<'a, 'src> {
    fn new(program: &'a Program<'src>) -> Self {
        Self {
            program,
            uses_stack: false,
        }
    }

    fn compile(&mut self) -> CodegenResult<Vec<u8>> {
        if self.program.functions.find_function("main").is_none() {
            return Err(CodegenError::MissingMain);
        }

        // Bodies first: the global section depends on what they use.
        let mut bodies = Vec::with_capacity(self.program.functions.len());
        for function in self.program.functions.iter() {
            bodies.push(self.emit_function(function)?);
        }

        let mut module = Vec::new();
        module.extend_from_slice(&WASM_MAGIC);
        module.extend_from_slice(&WASM_VERSION);
        write_section(&mut module, SECTION_TYPE, &self.emit_types());
        write_section(&mut module, SECTION_FUNCTION, &self.emit_function_types());
        write_section(&mut module, SECTION_MEMORY, &self.emit_memory());
        if self.uses_stack {
            write_section(&mut module, SECTION_GLOBAL, &self.emit_globals());
        }
        write_section(&mut module, SECTION_EXPORT, &self.emit_exports());
        write_section(&mut module, SECTION_CODE, &self.emit_code(&bodies));

        log::debug!(
            "assembled module: {} functions, {} bytes",
            bodies.len(),
            module.len()
        );

        wasmparser::validate(&module)
            .map_err(|e| CodegenError::ValidationFailed(format!("{e}")))?;

        Ok(module)
    }

    // ── Sections ─────────────────────────────────────────────────────────

    /// One type, `() -> i32`, shared by every function.
    fn emit_types(&self) -> Vec<u8> {
        vec![1, FUNC_TYPE_FORM, 0, 1, VALTYPE_I32]
    }

    fn emit_function_types(&self) -> Vec<u8> {
        let mut out = Vec::new();
        write_len(&mut out, self.program.functions.len());
        for _ in self.program.functions.iter() {
            write_u32(&mut out, TYPE_VOID_I32);
        }
        out
    }

    fn emit_memory(&self) -> Vec<u8> {
        let mut out = vec![1, LIMITS_MIN_ONLY];
        write_u32(&mut out, MEMORY_PAGES);
        out
    }

    /// The stack pointer: a mutable i32 starting at the top of memory.
    fn emit_globals(&self) -> Vec<u8> {
        let mut out = vec![1, VALTYPE_I32, GLOBAL_MUTABLE, OP_I32_CONST];
        write_i32(&mut out, STACK_TOP);
        out.push(OP_END);
        out
    }

    fn emit_exports(&self) -> Vec<u8> {
        let mut out = Vec::new();
        write_len(&mut out, self.program.functions.len());
        for function in self.program.functions.iter() {
            write_name(&mut out, function.name);
            out.push(EXPORT_KIND_FUNC);
            write_u32(&mut out, function.id.0);
        }
        out
    }

    fn emit_code(&self, bodies: &[Vec<u8>]) -> Vec<u8> {
        let mut out = Vec::new();
        write_len(&mut out, bodies.len());
        for body in bodies {
            write_sized(&mut out, body);
        }
        out
    }

    // ── Functions ────────────────────────────────────────────────────────

    /// One complete function body: locals header, then instructions.
    fn emit_function(&mut self, function: &Function<'src>) -> CodegenResult<Vec<u8>> {
        let body = function.body.ok_or_else(|| {
            CodegenError::Internal(format!("function '{}' has no body", function.name))
        })?;
        let frame = Frame::layout(function)?;
        self.uses_stack |= frame.has_base;
        log::debug!(
            "function {} '{}': {} params, {} locals, frame {} bytes",
            function.id.0,
            function.name,
            function.arity(),
            function.local_count(),
            frame.size
        );

        let mut ctx = FuncContext::new(&self.program.ast, frame);
        let mut f = Body::new();
        ctx.emit_prologue(&mut f);
        if emit_stmt(body, &mut ctx, &mut f)? == 0 {
            f.instruction(&Instruction::I32Const(0));
        }
        ctx.emit_epilogue(&mut f);
        f.instruction(&Instruction::End);

        Ok(Self::finalize_function(&f, &ctx))
    }

    /// Prepend the locals declared while emitting, now that their count is
    /// known.
    fn finalize_function(f: &Body, ctx: &FuncContext) -> Vec<u8> {
        let mut out = Vec::with_capacity(f.len() + 3);
        match ctx.local_count() {
            0 => write_u32(&mut out, 0),
            count => {
                write_u32(&mut out, 1);
                write_u32(&mut out, count);
                out.push(VALTYPE_I32);
            }
        }
        out.extend_from_slice(f.as_bytes());
        out
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Per-function codegen state
// ══════════════════════════════════════════════════════════════════════════════

/// State maintained while generating code for a single function body.
pub struct FuncContext<'a> {
    pub ast: &'a Ast,
    pub frame: Frame,
    /// Holds the value of an assignment nested inside an expression.
    scratch: Option<u32>,
}

impl<'a> FuncContext<'a> {
    pub fn new(ast: &'a Ast, frame: Frame) -> Self {
        Self {
            ast,
            frame,
            scratch: None,
        }
    }

    /// Local 0, the frame base. Only functions with params or locals have
    /// one, and only they contain variable nodes.
    pub fn frame_base(&self) -> CodegenResult<u32> {
        if self.frame.has_base {
            Ok(0)
        } else {
            Err(CodegenError::Internal(
                "variable access in a function without a frame".into(),
            ))
        }
    }

    pub fn scratch_local(&mut self) -> u32 {
        let index = u32::from(self.frame.has_base);
        *self.scratch.get_or_insert(index)
    }

    pub fn local_count(&self) -> u32 {
        u32::from(self.frame.has_base) + u32::from(self.scratch.is_some())
    }

    /// `fp = sp - size; sp = fp`, or just `fp = sp` for a parameters-only
    /// function.
    pub fn emit_prologue(&self, f: &mut Body) {
        if self.frame.size > 0 {
            f.instruction(&Instruction::GlobalGet(GLOBAL_SP));
            f.instruction(&Instruction::I32Const(self.frame.size as i32));
            f.instruction(&Instruction::I32Sub);
            f.instruction(&Instruction::LocalTee(0));
            f.instruction(&Instruction::GlobalSet(GLOBAL_SP));
        } else if self.frame.has_base {
            f.instruction(&Instruction::GlobalGet(GLOBAL_SP));
            f.instruction(&Instruction::LocalSet(0));
        }
    }

    /// `sp = fp + size`. Leaves the operand stack untouched.
    pub fn emit_epilogue(&self, f: &mut Body) {
        if self.frame.size > 0 {
            f.instruction(&Instruction::LocalGet(0));
            f.instruction(&Instruction::I32Const(self.frame.size as i32));
            f.instruction(&Instruction::I32Add);
            f.instruction(&Instruction::GlobalSet(GLOBAL_SP));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(size: u32, has_base: bool) -> Frame {
        Frame { size, has_base }
    }

    #[test]
    fn test_scratch_follows_frame_base() {
        let ast = Ast::new();
        let mut with_base = FuncContext::new(&ast, frame(16, true));
        assert_eq!(with_base.local_count(), 1);
        assert_eq!(with_base.scratch_local(), 1);
        assert_eq!(with_base.scratch_local(), 1);
        assert_eq!(with_base.local_count(), 2);

        let mut bare = FuncContext::new(&ast, frame(0, false));
        assert_eq!(bare.local_count(), 0);
        assert_eq!(bare.scratch_local(), 0);
        assert_eq!(bare.local_count(), 1);
        assert!(bare.frame_base().is_err());
    }

    #[test]
    fn test_prologue_and_epilogue() {
        let ast = Ast::new();
        let ctx = FuncContext::new(&ast, frame(16, true));
        let mut f = Body::new();
        ctx.emit_prologue(&mut f);
        assert_eq!(f.as_bytes(), [0x23, 0x00, 0x41, 0x10, 0x6B, 0x22, 0x00, 0x24, 0x00]);

        let mut f = Body::new();
        ctx.emit_epilogue(&mut f);
        assert_eq!(f.as_bytes(), [0x20, 0x00, 0x41, 0x10, 0x6A, 0x24, 0x00]);
    }

    #[test]
    fn test_params_only_prologue() {
        let ast = Ast::new();
        let ctx = FuncContext::new(&ast, frame(0, true));
        let mut f = Body::new();
        ctx.emit_prologue(&mut f);
        assert_eq!(f.as_bytes(), [0x23, 0x00, 0x21, 0x00]);
        let mut f = Body::new();
        ctx.emit_epilogue(&mut f);
        assert!(f.is_empty());
    }

    #[test]
    fn test_finalize_declares_locals() {
        let ast = Ast::new();
        let mut ctx = FuncContext::new(&ast, frame(16, true));
        ctx.scratch_local();
        let mut f = Body::new();
        f.instruction(&Instruction::I32Const(0));
        f.instruction(&Instruction::End);
        assert_eq!(
            Compiler::finalize_function(&f, &ctx),
            [0x01, 0x02, VALTYPE_I32, 0x41, 0x00, 0x0B]
        );

        let bare = FuncContext::new(&ast, frame(0, false));
        assert_eq!(Compiler::finalize_function(&f, &bare), [0x00, 0x41, 0x00, 0x0B]);
    }
}
