//! Core expression and statement evaluator.

use tinyc_codegen::types::STACK_TOP;
use tinyc_codegen::Frame;
use tinyc_types::ast::{BinOp, Node, NodeId, Program};
use tinyc_types::symbols::{FunctionId, SLOT_SIZE};

use crate::error::{EvalError, EvalResult};
use crate::memory::Memory;

/// Steps allowed by [`run_main`].
pub const DEFAULT_GAS_LIMIT: u64 = 10_000_000;

/// Most active calls, `main` included, before [`EvalError::StackOverflow`].
/// Each call nests several native frames, so this stays well inside a
/// 2 MiB thread stack even in debug builds.
pub const MAX_CALL_DEPTH: usize = 128;

/// Evaluate `main` with the default gas limit.
pub fn run_main(program: &Program<'_>) -> EvalResult<i32> {
    Evaluator::new(program, DEFAULT_GAS_LIMIT).call("main")
}

/// The core evaluator: walks AST nodes over a simulated memory.
pub struct Evaluator<'a, 'src> {
    program: &'a Program<'src>,
    pub memory: Memory,
    /// The stack pointer, mirroring the module's global.
    pub sp: i32,
    /// Gas counter, limits total steps to prevent infinite loops.
    pub gas: u64,
    pub gas_limit: u64,
    depth: usize,
}

/// The running function's frame.
#[derive(Clone, Copy)]
struct Activation {
    frame: Frame,
    fp: i32,
}

impl<'a, 'src> Evaluator<'a, 'src> {
    pub fn new(program: &'a Program<'src>, gas_limit: u64) -> Self {
        Self {
            program,
            memory: Memory::new(),
            sp: STACK_TOP,
            gas: 0,
            gas_limit,
            depth: 0,
        }
    }

    /// Call a function by name, as a host would call the export.
    pub fn call(&mut self, name: &str) -> EvalResult<i32> {
        let program = self.program;
        let function = program
            .functions
            .find_function(name)
            .ok_or_else(|| EvalError::UnknownFunction(name.to_string()))?;
        if function.arity() > 0 {
            // Exports take no WASM parameters; the argument block would be
            // whatever sits above the stack pointer.
            return Err(EvalError::Internal(format!(
                "'{name}' expects {} arguments",
                function.arity()
            )));
        }
        self.invoke(function.id)
    }

    /// Consume one unit of gas. Returns error if exhausted.
    fn tick(&mut self) -> EvalResult<()> {
        self.gas += 1;
        if self.gas > self.gas_limit {
            Err(EvalError::GasExhausted)
        } else {
            Ok(())
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Functions
    // ══════════════════════════════════════════════════════════════════════

    /// Run a function whose arguments are already stored at `sp`.
    fn invoke(&mut self, id: FunctionId) -> EvalResult<i32> {
        if self.depth == MAX_CALL_DEPTH {
            return Err(EvalError::StackOverflow);
        }
        let program = self.program;
        let function = program.functions.get(id);
        let body = function.body.ok_or_else(|| {
            EvalError::Internal(format!("function '{}' has no body", function.name))
        })?;
        let frame = Frame::layout(function).map_err(|e| EvalError::Internal(e.to_string()))?;

        let fp = self.sp.wrapping_sub(frame.size as i32);
        self.sp = fp;
        let activation = Activation { frame, fp };

        self.depth += 1;
        let result = match self.exec_stmt(body, &activation) {
            Ok(value) => Ok(value.unwrap_or(0)),
            Err(EvalError::Return(value)) => Ok(value),
            Err(e) => Err(e),
        };
        self.depth -= 1;
        self.sp = fp.wrapping_add(frame.size as i32);
        result
    }

    fn eval_call(
        &mut self,
        callee: FunctionId,
        args: &[NodeId],
        at: &Activation,
    ) -> EvalResult<i32> {
        let saved = self.sp;
        self.sp = saved.wrapping_sub(SLOT_SIZE.wrapping_mul(args.len() as i32));
        let result = self
            .store_args(args, at)
            .and_then(|()| self.invoke(callee));
        // Released on failure too.
        self.sp = saved;
        result
    }

    /// Store argument `i` at `sp + 4i`, evaluating left to right.
    fn store_args(&mut self, args: &[NodeId], at: &Activation) -> EvalResult<()> {
        for (i, &arg) in args.iter().enumerate() {
            let base = self.sp;
            let value = self.eval_expr(arg, at)?;
            self.memory.store(base, (SLOT_SIZE as usize * i) as u64, value)?;
        }
        Ok(())
    }

    // ══════════════════════════════════════════════════════════════════════
    // Statement evaluation
    // ══════════════════════════════════════════════════════════════════════

    /// Execute a statement. Expression statements yield their value.
    fn exec_stmt(&mut self, id: NodeId, at: &Activation) -> EvalResult<Option<i32>> {
        self.tick()?;
        let program = self.program;
        let ast = &program.ast;
        match &ast[id] {
            &Node::Assign { target, value } => {
                self.eval_assign(target, value, at)?;
                Ok(None)
            }
            &Node::Decl { address, init } => {
                if let Some(init) = init {
                    let value = self.eval_expr(init, at)?;
                    self.memory.store(at.fp, at.frame.offset(address), value)?;
                }
                Ok(None)
            }
            Node::Block(stmts) => {
                let mut last = None;
                for &stmt in stmts {
                    last = self.exec_stmt(stmt, at)?;
                }
                Ok(last)
            }
            &Node::If {
                cond,
                then,
                otherwise,
            } => {
                if self.eval_expr(cond, at)? != 0 {
                    self.exec_stmt(then, at)?;
                } else if let Some(otherwise) = otherwise {
                    self.exec_stmt(otherwise, at)?;
                }
                Ok(None)
            }
            &Node::Loop {
                init,
                cond,
                step,
                body,
            } => {
                if let Some(init) = init {
                    self.exec_stmt(init, at)?;
                }
                while self.test(cond, at)? {
                    self.exec_stmt(body, at)?;
                    if let Some(step) = step {
                        self.exec_stmt(step, at)?;
                    }
                }
                Ok(None)
            }
            &Node::DoWhile { body, cond } => {
                loop {
                    self.exec_stmt(body, at)?;
                    if self.eval_expr(cond, at)? == 0 {
                        break;
                    }
                }
                Ok(None)
            }
            &Node::Return(value) => Err(EvalError::Return(self.eval_expr(value, at)?)),
            _ => Ok(Some(self.eval_expr(id, at)?)),
        }
    }

    /// A missing loop condition is always true.
    fn test(&mut self, cond: Option<NodeId>, at: &Activation) -> EvalResult<bool> {
        match cond {
            Some(cond) => Ok(self.eval_expr(cond, at)? != 0),
            None => {
                self.tick()?;
                Ok(true)
            }
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expression evaluation
    // ══════════════════════════════════════════════════════════════════════

    fn eval_expr(&mut self, id: NodeId, at: &Activation) -> EvalResult<i32> {
        self.tick()?;
        let program = self.program;
        let ast = &program.ast;
        match &ast[id] {
            Node::Int(value) => Ok(*value),
            &Node::Neg(operand) => Ok(self.eval_expr(operand, at)?.wrapping_mul(-1)),
            &Node::Var { address, .. } => self.memory.load(at.fp, at.frame.offset(address)),
            &Node::Deref(inner) => {
                let address = self.eval_expr(inner, at)?;
                self.memory.load(address, 0)
            }
            &Node::AddrOf(inner) => match ast[inner] {
                Node::Var { address, .. } => {
                    Ok(at.fp.wrapping_add(at.frame.offset(address) as i32))
                }
                ref other => Err(EvalError::Internal(format!("address-of applied to {other:?}"))),
            },
            &Node::Binary { op, lhs, rhs } => {
                let lhs = self.eval_expr(lhs, at)?;
                let rhs = self.eval_expr(rhs, at)?;
                match op.apply(lhs, rhs) {
                    Some(value) => Ok(value),
                    None if op == BinOp::Div && rhs == 0 => Err(EvalError::DivisionByZero),
                    None => Err(EvalError::IntegerOverflow),
                }
            }
            &Node::Assign { target, value } => self.eval_assign(target, value, at),
            Node::Call { callee, args } => self.eval_call(*callee, args, at),
            other => Err(EvalError::Internal(format!(
                "statement node in expression position: {other:?}"
            ))),
        }
    }

    /// Store and yield the assigned value. The target's base address is
    /// evaluated before the value.
    fn eval_assign(&mut self, target: NodeId, value: NodeId, at: &Activation) -> EvalResult<i32> {
        let program = self.program;
        let ast = &program.ast;
        let (base, offset) = match ast[target] {
            Node::Var { address, .. } => (at.fp, at.frame.offset(address)),
            Node::Deref(inner) => (self.eval_expr(inner, at)?, 0),
            ref other => {
                return Err(EvalError::Internal(format!(
                    "assignment to non-lvalue {other:?}"
                )))
            }
        };
        let value = self.eval_expr(value, at)?;
        self.memory.store(base, offset, value)?;
        Ok(value)
    }
}
