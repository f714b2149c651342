//! Node construction with constant folding and pointer scaling.
//!
//! These run on every reduction, so the AST never holds an arithmetic node
//! whose operands are both literals, and every pointer offset is already
//! measured in bytes.

use tinyc_types::ast::{BinOp, Node, NodeId};
use tinyc_types::symbols::SLOT_SIZE;
use tinyc_types::{ErrorCode, MessageArg, Result, Span};

use crate::parse_expr::Operand;
use crate::parser::Parser;

impl<'src> Parser<'src> {
    pub(crate) fn make_binary(
        &mut self,
        op: BinOp,
        lhs: Operand,
        rhs: Operand,
        at: Span,
    ) -> Result<Operand> {
        if !matches!(op, BinOp::Add | BinOp::Sub) {
            return Ok(Operand::int(self.fold(op, lhs.node, rhs.node)));
        }

        match (op, lhs.indirection, rhs.indirection) {
            (_, 0, 0) => Ok(Operand::int(self.fold(op, lhs.node, rhs.node))),
            // int + ptr: keep the pointer on the left.
            (BinOp::Add, 0, _) => {
                let offset = self.scale(lhs.node);
                Ok(Operand {
                    node: self.fold(BinOp::Add, rhs.node, offset),
                    indirection: rhs.indirection,
                })
            }
            (_, _, 0) => {
                let offset = self.scale(rhs.node);
                Ok(Operand {
                    node: self.fold(op, lhs.node, offset),
                    indirection: lhs.indirection,
                })
            }
            (BinOp::Sub, l, r) if l == r => {
                let bytes = self.fold(BinOp::Sub, lhs.node, rhs.node);
                let size = self.alloc(Node::Int(SLOT_SIZE));
                Ok(Operand::int(self.fold(BinOp::Div, bytes, size)))
            }
            _ => Err(self.error_at(
                ErrorCode::INVALID_OPERANDS,
                "Invalid operands for '%s' on line: %l",
                &[MessageArg::Str(op.symbol())],
                at,
            )),
        }
    }

    /// `lhs op rhs`, or a single literal when both sides are literals and
    /// the operation cannot trap.
    fn fold(&mut self, op: BinOp, lhs: NodeId, rhs: NodeId) -> NodeId {
        let folded = match (self.ast.int_value(lhs), self.ast.int_value(rhs)) {
            (Some(a), Some(b)) => op.apply(a, b),
            _ => None,
        };
        match folded {
            Some(value) => {
                self.ast.replace(lhs, Node::Int(value));
                self.ast.release(rhs);
                lhs
            }
            None => self.alloc(Node::Binary { op, lhs, rhs }),
        }
    }

    /// Multiply an index by the pointee size.
    fn scale(&mut self, index: NodeId) -> NodeId {
        let size = self.alloc(Node::Int(SLOT_SIZE));
        self.fold(BinOp::Mul, index, size)
    }

    pub(crate) fn make_negate(&mut self, operand: Operand) -> Operand {
        let node = match self.ast.int_value(operand.node) {
            Some(value) => {
                self.ast.replace(operand.node, Node::Int(value.wrapping_neg()));
                operand.node
            }
            None => self.alloc(Node::Neg(operand.node)),
        };
        Operand::int(node)
    }

    /// `&e`. `&*p` cancels to `p`; only variables and dereferences have an
    /// address.
    pub(crate) fn make_address_of(&mut self, operand: Operand, at: Span) -> Result<Operand> {
        let node = match self.ast[operand.node] {
            Node::Deref(inner) => {
                self.ast.release(operand.node);
                inner
            }
            Node::Var { .. } => self.alloc(Node::AddrOf(operand.node)),
            _ => {
                return Err(self.error_at(
                    ErrorCode::NOT_ADDRESSABLE,
                    "Cannot take the address of this expression on line: %l",
                    &[],
                    at,
                ))
            }
        };
        Ok(Operand {
            node,
            indirection: operand.indirection + 1,
        })
    }

    /// `*e`. `*&x` cancels to `x`. Dereferencing an `int` is allowed and
    /// yields an `int`.
    pub(crate) fn make_deref(&mut self, operand: Operand) -> Operand {
        let node = match self.ast[operand.node] {
            Node::AddrOf(inner) => {
                self.ast.release(operand.node);
                inner
            }
            _ => self.alloc(Node::Deref(operand.node)),
        };
        Operand {
            node,
            indirection: operand.indirection.saturating_sub(1),
        }
    }
}
