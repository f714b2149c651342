//! Expression code generation.
//!
//! Every expression leaves exactly one i32 on the WASM operand stack.

use tinyc_types::ast::{BinOp, Node, NodeId};
use tinyc_types::symbols::{FunctionId, SLOT_SIZE};
use wasm_encoder::{Instruction, MemArg};

use crate::compiler::FuncContext;
use crate::encode::Body;
use crate::error::{CodegenError, CodegenResult};
use crate::types::{GLOBAL_SP, I32_ALIGN};

/// Emit instructions for an expression. Leaves one i32 on the stack.
pub fn emit_expr(id: NodeId, ctx: &mut FuncContext, f: &mut Body) -> CodegenResult<()> {
    let ast = ctx.ast;
    match &ast[id] {
        Node::Int(value) => {
            f.instruction(&Instruction::I32Const(*value));
        }
        &Node::Neg(operand) => {
            emit_expr(operand, ctx, f)?;
            f.instruction(&Instruction::I32Const(-1));
            f.instruction(&Instruction::I32Mul);
        }
        &Node::Var { address, .. } => {
            let offset = ctx.frame.offset(address);
            f.instruction(&Instruction::LocalGet(ctx.frame_base()?));
            f.instruction(&Instruction::I32Load(memarg(offset)));
        }
        &Node::Deref(inner) => {
            emit_expr(inner, ctx, f)?;
            f.instruction(&Instruction::I32Load(memarg(0)));
        }
        &Node::AddrOf(inner) => emit_address_of(inner, ctx, f)?,
        &Node::Binary { op, lhs, rhs } => {
            emit_expr(lhs, ctx, f)?;
            emit_expr(rhs, ctx, f)?;
            f.instruction(&binary_instruction(op));
        }
        &Node::Assign { target, value } => {
            let scratch = ctx.scratch_local();
            let offset = emit_target(target, ctx, f)?;
            emit_expr(value, ctx, f)?;
            f.instruction(&Instruction::LocalTee(scratch));
            f.instruction(&Instruction::I32Store(memarg(offset)));
            f.instruction(&Instruction::LocalGet(scratch));
        }
        Node::Call { callee, args } => emit_call(*callee, args, ctx, f)?,
        other => {
            return Err(CodegenError::Internal(format!(
                "statement node in expression position: {other:?}"
            )))
        }
    }
    Ok(())
}

/// `&x` is the frame base plus the variable's offset.
fn emit_address_of(inner: NodeId, ctx: &mut FuncContext, f: &mut Body) -> CodegenResult<()> {
    let ast = ctx.ast;
    let Node::Var { address, .. } = ast[inner] else {
        return Err(CodegenError::Internal(format!(
            "address-of applied to {:?}",
            ast[inner]
        )));
    };
    let offset = ctx.frame.offset(address);
    f.instruction(&Instruction::LocalGet(ctx.frame_base()?));
    f.instruction(&Instruction::I32Const(offset as i32));
    f.instruction(&Instruction::I32Add);
    Ok(())
}

/// Push the base address of an assignment target and return the static
/// offset the store must use.
pub fn emit_target(target: NodeId, ctx: &mut FuncContext, f: &mut Body) -> CodegenResult<u64> {
    let ast = ctx.ast;
    match &ast[target] {
        &Node::Var { address, .. } => {
            f.instruction(&Instruction::LocalGet(ctx.frame_base()?));
            Ok(ctx.frame.offset(address))
        }
        &Node::Deref(inner) => {
            emit_expr(inner, ctx, f)?;
            Ok(0)
        }
        other => Err(CodegenError::Internal(format!(
            "assignment to non-lvalue {other:?}"
        ))),
    }
}

/// Reserve the argument block, store each argument, call, release.
fn emit_call(
    callee: FunctionId,
    args: &[NodeId],
    ctx: &mut FuncContext,
    f: &mut Body,
) -> CodegenResult<()> {
    let block = SLOT_SIZE * args.len() as i32;
    if !args.is_empty() {
        adjust_sp(Instruction::I32Sub, block, f);
        for (i, &arg) in args.iter().enumerate() {
            f.instruction(&Instruction::GlobalGet(GLOBAL_SP));
            emit_expr(arg, ctx, f)?;
            f.instruction(&Instruction::I32Store(memarg((SLOT_SIZE as usize * i) as u64)));
        }
    }
    f.instruction(&Instruction::Call(callee.0));
    if !args.is_empty() {
        adjust_sp(Instruction::I32Add, block, f);
    }
    Ok(())
}

/// `sp = sp <op> bytes`
fn adjust_sp(op: Instruction<'static>, bytes: i32, f: &mut Body) {
    f.instruction(&Instruction::GlobalGet(GLOBAL_SP));
    f.instruction(&Instruction::I32Const(bytes));
    f.instruction(&op);
    f.instruction(&Instruction::GlobalSet(GLOBAL_SP));
}

fn binary_instruction(op: BinOp) -> Instruction<'static> {
    match op {
        BinOp::Add => Instruction::I32Add,
        BinOp::Sub => Instruction::I32Sub,
        BinOp::Mul => Instruction::I32Mul,
        BinOp::Div => Instruction::I32DivS,
        BinOp::Eq => Instruction::I32Eq,
        BinOp::Ne => Instruction::I32Ne,
        BinOp::Lt => Instruction::I32LtS,
        BinOp::Le => Instruction::I32LeS,
        BinOp::Gt => Instruction::I32GtS,
        BinOp::Ge => Instruction::I32GeS,
    }
}

pub(crate) fn memarg(offset: u64) -> MemArg {
    MemArg {
        offset,
        align: I32_ALIGN,
        memory_index: 0,
    }
}
