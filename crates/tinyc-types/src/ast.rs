//! AST for tinyc programs.
//!
//! Nodes live in an index-addressed [`Ast`] arena and refer to each other by
//! [`NodeId`]. Symbols are already resolved: variables carry their signed
//! frame address and calls carry the callee's dense index. Folded-away
//! nodes go back to the arena's free list and are reused by later
//! allocations.

use crate::symbols::{FunctionId, FunctionTable};
use std::fmt;
use std::ops::Index;

/// Handle to a node in an [`Ast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Operators
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinOp {
    /// Evaluate with 32-bit wrapping semantics. Comparisons yield 0 or 1.
    ///
    /// Returns `None` for division by zero and for `i32::MIN / -1`, the two
    /// inputs on which `i32.div_s` traps.
    pub fn apply(self, lhs: i32, rhs: i32) -> Option<i32> {
        Some(match self {
            BinOp::Add => lhs.wrapping_add(rhs),
            BinOp::Sub => lhs.wrapping_sub(rhs),
            BinOp::Mul => lhs.wrapping_mul(rhs),
            BinOp::Div => return lhs.checked_div(rhs),
            BinOp::Eq => (lhs == rhs) as i32,
            BinOp::Ne => (lhs != rhs) as i32,
            BinOp::Lt => (lhs < rhs) as i32,
            BinOp::Le => (lhs <= rhs) as i32,
            BinOp::Gt => (lhs > rhs) as i32,
            BinOp::Ge => (lhs >= rhs) as i32,
        })
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Nodes
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    // ── Expressions ──
    Int(i32),
    Neg(NodeId),
    AddrOf(NodeId),
    Deref(NodeId),
    Binary {
        op: BinOp,
        lhs: NodeId,
        rhs: NodeId,
    },
    /// `target` is a `Var` or a `Deref`.
    Assign {
        target: NodeId,
        value: NodeId,
    },
    Var {
        address: i32,
        indirection: u32,
    },
    Call {
        callee: FunctionId,
        args: Vec<NodeId>,
    },

    // ── Statements ──
    Decl {
        address: i32,
        init: Option<NodeId>,
    },
    If {
        cond: NodeId,
        then: NodeId,
        otherwise: Option<NodeId>,
    },
    /// `for` and `while`.
    Loop {
        init: Option<NodeId>,
        cond: Option<NodeId>,
        step: Option<NodeId>,
        body: NodeId,
    },
    DoWhile {
        body: NodeId,
        cond: NodeId,
    },
    Return(NodeId),
    /// Braced block, the empty statement (no children) and multi-variable
    /// declarations.
    Block(Vec<NodeId>),
}

impl Node {
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Node::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Nodes that denote a storage location.
    pub fn is_lvalue(&self) -> bool {
        matches!(self, Node::Var { .. } | Node::Deref(_))
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Arena
// ══════════════════════════════════════════════════════════════════════════════

/// Node arena with a free list of reclaimed slots.
#[derive(Debug, Clone, Default)]
pub struct Ast {
    nodes: Vec<Node>,
    free: Vec<NodeId>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `node`, reusing a released slot when one is available.
    pub fn alloc(&mut self, node: Node) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.nodes[id.index()] = node;
            return id;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Return a node's slot to the free list. Its children are not released;
    /// callers move them elsewhere first.
    pub fn release(&mut self, id: NodeId) {
        self.nodes[id.index()] = Node::Block(Vec::new());
        self.free.push(id);
    }

    pub fn replace(&mut self, id: NodeId, node: Node) {
        self.nodes[id.index()] = node;
    }

    pub fn int_value(&self, id: NodeId) -> Option<i32> {
        self[id].as_int()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slots ever allocated, live or free.
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }
}

impl Index<NodeId> for Ast {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }
}

/// A fully parsed translation unit.
#[derive(Debug, Clone)]
pub struct Program<'src> {
    pub functions: FunctionTable<'src>,
    pub ast: Ast,
}
