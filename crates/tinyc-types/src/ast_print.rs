//! Indented dump of a parsed program, for `tinyc ast`.
//!
//! Statements go one per line, children indented by two spaces.
//! Expressions render inline as s-expressions, with variables named
//! through their function's symbols:
//!
//! ```text
//! function add(a, b)
//!   block
//!     return (+ a b)
//! ```

use std::collections::BTreeMap;
use std::fmt;

use crate::ast::{Ast, Node, NodeId, Program};
use crate::symbols::{Function, FunctionTable};

/// [`Display`](fmt::Display) view of a whole program.
pub struct ProgramTree<'a, 'src> {
    program: &'a Program<'src>,
}

impl<'src> Program<'src> {
    pub fn tree(&self) -> ProgramTree<'_, 'src> {
        ProgramTree { program: self }
    }
}

impl fmt::Display for ProgramTree<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for function in self.program.functions.iter() {
            let params: Vec<String> = function
                .params
                .iter()
                .map(|p| format!("{}{}", "*".repeat(p.indirection as usize), p.name))
                .collect();
            writeln!(f, "function {}({})", function.name, params.join(", "))?;
            if let Some(body) = function.body {
                let printer = Printer::new(&self.program.ast, &self.program.functions, function);
                printer.stmt(f, body, 1)?;
            }
        }
        Ok(())
    }
}

struct Printer<'a, 'src> {
    ast: &'a Ast,
    functions: &'a FunctionTable<'src>,
    /// Signed frame address to source name.
    names: BTreeMap<i32, &'src str>,
}

impl<'a, 'src> Printer<'a, 'src> {
    fn new(ast: &'a Ast, functions: &'a FunctionTable<'src>, function: &Function<'src>) -> Self {
        let names = function
            .params
            .iter()
            .chain(function.locals.values())
            .map(|v| (v.address, v.name))
            .collect();
        Self {
            ast,
            functions,
            names,
        }
    }

    fn var(&self, f: &mut fmt::Formatter<'_>, address: i32) -> fmt::Result {
        match self.names.get(&address) {
            Some(name) => f.write_str(name),
            None => write!(f, "@{address}"),
        }
    }

    fn stmt(&self, f: &mut fmt::Formatter<'_>, id: NodeId, depth: usize) -> fmt::Result {
        let pad = "  ".repeat(depth);
        match &self.ast[id] {
            Node::Decl { address, init } => {
                write!(f, "{pad}decl ")?;
                self.var(f, *address)?;
                if let Some(init) = init {
                    f.write_str(" = ")?;
                    self.expr(f, *init)?;
                }
                writeln!(f)
            }
            Node::Block(stmts) => {
                writeln!(f, "{pad}block")?;
                for &stmt in stmts {
                    self.stmt(f, stmt, depth + 1)?;
                }
                Ok(())
            }
            Node::If {
                cond,
                then,
                otherwise,
            } => {
                write!(f, "{pad}if ")?;
                self.expr(f, *cond)?;
                writeln!(f)?;
                self.stmt(f, *then, depth + 1)?;
                if let Some(otherwise) = otherwise {
                    writeln!(f, "{pad}else")?;
                    self.stmt(f, *otherwise, depth + 1)?;
                }
                Ok(())
            }
            Node::Loop {
                init,
                cond,
                step,
                body,
            } => {
                writeln!(f, "{pad}loop")?;
                if let Some(init) = init {
                    writeln!(f, "{pad}  init")?;
                    self.stmt(f, *init, depth + 2)?;
                }
                if let Some(cond) = cond {
                    write!(f, "{pad}  while ")?;
                    self.expr(f, *cond)?;
                    writeln!(f)?;
                }
                if let Some(step) = step {
                    writeln!(f, "{pad}  step")?;
                    self.stmt(f, *step, depth + 2)?;
                }
                self.stmt(f, *body, depth + 1)
            }
            Node::DoWhile { body, cond } => {
                writeln!(f, "{pad}do")?;
                self.stmt(f, *body, depth + 1)?;
                write!(f, "{pad}while ")?;
                self.expr(f, *cond)?;
                writeln!(f)
            }
            Node::Return(value) => {
                write!(f, "{pad}return ")?;
                self.expr(f, *value)?;
                writeln!(f)
            }
            _ => {
                f.write_str(&pad)?;
                self.expr(f, id)?;
                writeln!(f)
            }
        }
    }

    fn expr(&self, f: &mut fmt::Formatter<'_>, id: NodeId) -> fmt::Result {
        match &self.ast[id] {
            Node::Int(value) => write!(f, "{value}"),
            Node::Var { address, .. } => self.var(f, *address),
            Node::Neg(operand) => self.unary(f, "neg", *operand),
            Node::AddrOf(operand) => self.unary(f, "&", *operand),
            Node::Deref(operand) => self.unary(f, "*", *operand),
            Node::Binary { op, lhs, rhs } => {
                write!(f, "({op} ")?;
                self.expr(f, *lhs)?;
                f.write_str(" ")?;
                self.expr(f, *rhs)?;
                f.write_str(")")
            }
            Node::Assign { target, value } => {
                f.write_str("(= ")?;
                self.expr(f, *target)?;
                f.write_str(" ")?;
                self.expr(f, *value)?;
                f.write_str(")")
            }
            Node::Call { callee, args } => {
                write!(f, "(call {}", self.functions.get(*callee).name)?;
                for &arg in args {
                    f.write_str(" ")?;
                    self.expr(f, arg)?;
                }
                f.write_str(")")
            }
            other => write!(f, "<{other:?}>"),
        }
    }

    fn unary(&self, f: &mut fmt::Formatter<'_>, name: &str, operand: NodeId) -> fmt::Result {
        write!(f, "({name} ")?;
        self.expr(f, operand)?;
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{Ast, BinOp, Node, Program};
    use crate::symbols::FunctionTable;

    #[test]
    fn test_tree_names_variables_and_callees() {
        let mut functions = FunctionTable::new();
        let mut ast = Ast::new();

        let add = functions.declare_function("add").unwrap();
        let a = functions.get_mut(add).declare_param("a", 0).unwrap();
        let b = functions.get_mut(add).declare_param("b", 1).unwrap();
        let lhs = ast.alloc(Node::Var { address: a, indirection: 0 });
        let rhs = ast.alloc(Node::Var { address: b, indirection: 1 });
        let sum = ast.alloc(Node::Binary { op: BinOp::Add, lhs, rhs });
        let ret = ast.alloc(Node::Return(sum));
        functions.get_mut(add).body = Some(ast.alloc(Node::Block(vec![ret])));

        let main = functions.declare_function("main").unwrap();
        let x = functions.get_mut(main).declare_variable("x", 0).unwrap();
        let three = ast.alloc(Node::Int(3));
        let decl = ast.alloc(Node::Decl { address: x, init: Some(three) });
        let arg = ast.alloc(Node::Var { address: x, indirection: 0 });
        let addr = ast.alloc(Node::AddrOf(arg));
        let call = ast.alloc(Node::Call { callee: add, args: vec![three, addr] });
        let ret = ast.alloc(Node::Return(call));
        functions.get_mut(main).body = Some(ast.alloc(Node::Block(vec![decl, ret])));

        let program = Program { functions, ast };
        assert_eq!(
            program.tree().to_string(),
            "function add(a, *b)\n  block\n    return (+ a b)\n\
             function main()\n  block\n    decl x = 3\n    return (call add 3 (& x))\n"
        );
    }

    #[test]
    fn test_unknown_address_falls_back_to_number() {
        let mut functions = FunctionTable::new();
        let mut ast = Ast::new();
        let main = functions.declare_function("main").unwrap();
        let var = ast.alloc(Node::Var { address: 8, indirection: 0 });
        let ret = ast.alloc(Node::Return(var));
        functions.get_mut(main).body = Some(ret);

        let program = Program { functions, ast };
        assert_eq!(program.tree().to_string(), "function main()\n  return @8\n");
    }
}
