//! Expression parsing.
//!
//! A unary term is parsed by recursive descent, binary operators by
//! precedence climbing over an explicit stack of pending `(lhs, operator)`
//! pairs. Precedence (loosest → tightest):
//!
//! 1. `=` (right-associative)
//! 2. `==`, `!=`
//! 3. `<`, `>`, `<=`, `>=`
//! 4. `+`, `-`
//! 5. `*`, `/`
//!
//! Every reduction goes through [`Parser::make_binary`], which folds
//! constants and scales pointer arithmetic before the result is used as an
//! operand again.

use tinyc_lexer::TokenKind;
use tinyc_types::ast::{BinOp, Node, NodeId};
use tinyc_types::{ErrorCode, MessageArg, Result, Span};

use crate::parser::Parser;

/// A parsed expression and its pointer level (0 = `int`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Operand {
    pub node: NodeId,
    pub indirection: u32,
}

impl Operand {
    pub fn int(node: NodeId) -> Self {
        Self {
            node,
            indirection: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Assign,
    Binary(BinOp),
}

impl Operator {
    fn from_token(kind: TokenKind<'_>) -> Option<Self> {
        Some(match kind {
            TokenKind::Eq => Operator::Assign,
            TokenKind::EqEq => Operator::Binary(BinOp::Eq),
            TokenKind::BangEq => Operator::Binary(BinOp::Ne),
            TokenKind::Less => Operator::Binary(BinOp::Lt),
            TokenKind::LessEq => Operator::Binary(BinOp::Le),
            TokenKind::Greater => Operator::Binary(BinOp::Gt),
            TokenKind::GreaterEq => Operator::Binary(BinOp::Ge),
            TokenKind::Plus => Operator::Binary(BinOp::Add),
            TokenKind::Minus => Operator::Binary(BinOp::Sub),
            TokenKind::Star => Operator::Binary(BinOp::Mul),
            TokenKind::Slash => Operator::Binary(BinOp::Div),
            _ => return None,
        })
    }

    fn rank(self) -> u8 {
        match self {
            Operator::Assign => 1,
            Operator::Binary(BinOp::Eq | BinOp::Ne) => 2,
            Operator::Binary(BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge) => 3,
            Operator::Binary(BinOp::Add | BinOp::Sub) => 4,
            Operator::Binary(BinOp::Mul | BinOp::Div) => 5,
        }
    }

    /// Whether a pending `prev` must be reduced before `self` is pushed.
    ///
    /// Equal ranks reduce for left-associative operators only, so `a - b - c`
    /// groups left and `a = b = c` groups right.
    fn reduces(self, prev: Operator) -> bool {
        match self {
            Operator::Assign => self.rank() < prev.rank(),
            Operator::Binary(_) => self.rank() <= prev.rank(),
        }
    }
}

impl<'src> Parser<'src> {
    // ══════════════════════════════════════════════════════════════════════════
    // Binary operators
    // ══════════════════════════════════════════════════════════════════════════

    pub(crate) fn parse_expression(&mut self) -> Result<Operand> {
        let outer = self.depth;
        let result = self.parse_binary();
        self.depth = outer;
        result
    }

    /// Each operator deepens the tree by one level, so it counts against
    /// the nesting limit until the whole expression is done.
    fn parse_binary(&mut self) -> Result<Operand> {
        let mut top = self.parse_unary()?;
        let mut pending: Vec<(Operand, Operator, Span)> = Vec::new();

        while let Some(op) = Operator::from_token(self.peek_kind()) {
            self.descend()?;
            let span = self.advance().span;
            while let Some((lhs, prev, at)) = pending.pop() {
                if !op.reduces(prev) {
                    pending.push((lhs, prev, at));
                    break;
                }
                top = self.reduce(lhs, prev, top, at)?;
            }
            pending.push((top, op, span));
            top = self.parse_unary()?;
        }

        while let Some((lhs, op, at)) = pending.pop() {
            top = self.reduce(lhs, op, top, at)?;
        }
        Ok(top)
    }

    fn reduce(&mut self, lhs: Operand, op: Operator, rhs: Operand, at: Span) -> Result<Operand> {
        match op {
            Operator::Binary(op) => self.make_binary(op, lhs, rhs, at),
            Operator::Assign if self.ast[lhs.node].is_lvalue() => Ok(Operand {
                node: self.alloc(Node::Assign {
                    target: lhs.node,
                    value: rhs.node,
                }),
                indirection: lhs.indirection,
            }),
            Operator::Assign => Err(self.error_at(
                ErrorCode::NOT_ADDRESSABLE,
                "Cannot assign to this expression on line: %l",
                &[],
                at,
            )),
        }
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Unary & primary
    // ══════════════════════════════════════════════════════════════════════════

    /// `- Unary | + Unary | & Unary | * Unary | Primary`
    fn parse_unary(&mut self) -> Result<Operand> {
        match self.peek_kind() {
            TokenKind::Minus => {
                self.advance();
                let operand = self.nested(Self::parse_unary)?;
                Ok(self.make_negate(operand))
            }
            TokenKind::Plus => {
                self.advance();
                self.nested(Self::parse_unary)
            }
            TokenKind::Amp => {
                let span = self.advance().span;
                let operand = self.nested(Self::parse_unary)?;
                self.make_address_of(operand, span)
            }
            TokenKind::Star => {
                self.advance();
                let operand = self.nested(Self::parse_unary)?;
                Ok(self.make_deref(operand))
            }
            _ => self.parse_primary(),
        }
    }

    /// `( Expr ) | number | name | name ( [Expr {, Expr}] )`
    fn parse_primary(&mut self) -> Result<Operand> {
        match self.peek_kind() {
            TokenKind::Number(value) => {
                self.advance();
                Ok(Operand::int(self.alloc(Node::Int(value))))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.nested(Self::parse_expression)?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::Identifier(name) => {
                let span = self.advance().span;
                if self.check(TokenKind::LParen) {
                    self.parse_call(name, span)
                } else {
                    self.resolve_variable(name, span)
                }
            }
            _ => {
                let found = self.found();
                Err(self.error_at_current(
                    ErrorCode::EXPECTED_EXPRESSION,
                    "Expected an expression on line: %l, found %s",
                    &[MessageArg::Str(&found)],
                ))
            }
        }
    }

    fn resolve_variable(&mut self, name: &str, span: Span) -> Result<Operand> {
        let Some(var) = self.function().find_variable(name).copied() else {
            return Err(self.error_at(
                ErrorCode::UNDECLARED_VARIABLE,
                "There's not a variable with the name %i\nA variable needs to be declared before it can be used",
                &[MessageArg::Ident(name)],
                span,
            ));
        };
        Ok(Operand {
            node: self.alloc(Node::Var {
                address: var.address,
                indirection: var.indirection,
            }),
            indirection: var.indirection,
        })
    }

    /// Callee resolution and arity are checked eagerly.
    fn parse_call(&mut self, name: &str, span: Span) -> Result<Operand> {
        let Some((callee, arity)) = self
            .functions
            .find_function(name)
            .map(|f| (f.id, f.arity()))
        else {
            return Err(self.error_at(
                ErrorCode::UNDECLARED_FUNCTION,
                "There's not a function with the name %i\nA function needs to be declared before it can be used",
                &[MessageArg::Ident(name)],
                span,
            ));
        };

        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                args.push(self.nested(Self::parse_expression)?.node);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        let close = self.expect(TokenKind::RParen)?;

        if args.len() != arity {
            return Err(self.error_at(
                ErrorCode::WRONG_ARG_COUNT,
                "Function %i requires %d arguments, but %d were given",
                &[
                    MessageArg::Ident(name),
                    MessageArg::Int(arity as i64),
                    MessageArg::Int(args.len() as i64),
                ],
                span.to(close.span),
            ));
        }
        Ok(Operand::int(self.alloc(Node::Call { callee, args })))
    }
}
