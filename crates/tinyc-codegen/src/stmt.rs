//! Statement code generation.
//!
//! A statement leaves zero or one values on the operand stack; the count is
//! its *depth*. Expression statements leave their value so a function whose
//! body ends in one returns it. Enclosing constructs drop what they do not
//! use.

use tinyc_types::ast::{Node, NodeId};
use wasm_encoder::{BlockType, Instruction};

use crate::compiler::FuncContext;
use crate::encode::Body;
use crate::error::CodegenResult;
use crate::expr::{emit_expr, emit_target, memarg};

/// Emit a single statement and return its depth.
pub fn emit_stmt(id: NodeId, ctx: &mut FuncContext, f: &mut Body) -> CodegenResult<u32> {
    let ast = ctx.ast;
    match &ast[id] {
        &Node::Assign { target, value } => {
            emit_store(target, value, ctx, f)?;
            Ok(0)
        }
        &Node::Decl { address, init } => {
            if let Some(init) = init {
                f.instruction(&Instruction::LocalGet(ctx.frame_base()?));
                emit_expr(init, ctx, f)?;
                f.instruction(&Instruction::I32Store(memarg(ctx.frame.offset(address))));
            }
            Ok(0)
        }
        Node::Block(stmts) => emit_block(stmts, ctx, f),
        &Node::If {
            cond,
            then,
            otherwise,
        } => {
            emit_if(cond, then, otherwise, ctx, f)?;
            Ok(0)
        }
        &Node::Loop {
            init,
            cond,
            step,
            body,
        } => {
            emit_loop(init, cond, step, body, ctx, f)?;
            Ok(0)
        }
        &Node::DoWhile { body, cond } => {
            f.instruction(&Instruction::Loop(BlockType::Empty));
            emit_dropped(body, ctx, f)?;
            emit_truth(cond, Instruction::I32Ne, ctx, f)?;
            f.instruction(&Instruction::BrIf(0));
            f.instruction(&Instruction::End);
            Ok(0)
        }
        &Node::Return(value) => {
            emit_expr(value, ctx, f)?;
            ctx.emit_epilogue(f);
            f.instruction(&Instruction::Return);
            Ok(0)
        }
        _ => {
            emit_expr(id, ctx, f)?;
            Ok(1)
        }
    }
}

/// Statements in order; all but the last have their values dropped.
fn emit_block(stmts: &[NodeId], ctx: &mut FuncContext, f: &mut Body) -> CodegenResult<u32> {
    let Some((&last, rest)) = stmts.split_last() else {
        return Ok(0);
    };
    for &stmt in rest {
        emit_dropped(stmt, ctx, f)?;
    }
    emit_stmt(last, ctx, f)
}

/// A statement whose values nobody consumes.
fn emit_dropped(id: NodeId, ctx: &mut FuncContext, f: &mut Body) -> CodegenResult<()> {
    for _ in 0..emit_stmt(id, ctx, f)? {
        f.instruction(&Instruction::Drop);
    }
    Ok(())
}

/// `target = value` with nothing left behind.
fn emit_store(
    target: NodeId,
    value: NodeId,
    ctx: &mut FuncContext,
    f: &mut Body,
) -> CodegenResult<()> {
    let offset = emit_target(target, ctx, f)?;
    emit_expr(value, ctx, f)?;
    f.instruction(&Instruction::I32Store(memarg(offset)));
    Ok(())
}

/// `cond <cmp> 0`: `I32Ne` tests truth, `I32Eq` falsity.
fn emit_truth(
    cond: NodeId,
    cmp: Instruction<'static>,
    ctx: &mut FuncContext,
    f: &mut Body,
) -> CodegenResult<()> {
    emit_expr(cond, ctx, f)?;
    f.instruction(&Instruction::I32Const(0));
    f.instruction(&cmp);
    Ok(())
}

fn emit_if(
    cond: NodeId,
    then: NodeId,
    otherwise: Option<NodeId>,
    ctx: &mut FuncContext,
    f: &mut Body,
) -> CodegenResult<()> {
    emit_truth(cond, Instruction::I32Ne, ctx, f)?;
    f.instruction(&Instruction::If(BlockType::Empty));
    emit_dropped(then, ctx, f)?;
    if let Some(otherwise) = otherwise {
        f.instruction(&Instruction::Else);
        emit_dropped(otherwise, ctx, f)?;
    }
    f.instruction(&Instruction::End);
    Ok(())
}

/// `for` and `while`. With a condition the loop is guarded by an outer
/// block so a false condition skips the body entirely.
fn emit_loop(
    init: Option<NodeId>,
    cond: Option<NodeId>,
    step: Option<NodeId>,
    body: NodeId,
    ctx: &mut FuncContext,
    f: &mut Body,
) -> CodegenResult<()> {
    if let Some(init) = init {
        emit_dropped(init, ctx, f)?;
    }
    match cond {
        Some(cond) => {
            f.instruction(&Instruction::Block(BlockType::Empty));
            emit_truth(cond, Instruction::I32Eq, ctx, f)?;
            f.instruction(&Instruction::BrIf(0));
            f.instruction(&Instruction::Loop(BlockType::Empty));
            emit_dropped(body, ctx, f)?;
            if let Some(step) = step {
                emit_dropped(step, ctx, f)?;
            }
            emit_truth(cond, Instruction::I32Ne, ctx, f)?;
            f.instruction(&Instruction::BrIf(0));
            f.instruction(&Instruction::End);
            f.instruction(&Instruction::End);
        }
        None => {
            f.instruction(&Instruction::Loop(BlockType::Empty));
            emit_dropped(body, ctx, f)?;
            if let Some(step) = step {
                emit_dropped(step, ctx, f)?;
            }
            f.instruction(&Instruction::Br(0));
            f.instruction(&Instruction::End);
        }
    }
    Ok(())
}
