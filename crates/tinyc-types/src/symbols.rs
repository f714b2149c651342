//! Function and variable symbol tables.
//!
//! One [`FunctionTable`] per compilation holds every declared function in
//! declaration order; each [`Function`] owns its parameter list and a flat
//! local namespace shared by all blocks of its body.

use crate::ast::NodeId;
use std::collections::BTreeMap;

/// Size in bytes of every variable slot (`int` and all pointers).
pub const SLOT_SIZE: i32 = 4;

/// Dense function index, equal to declaration order and used directly as
/// the call target in the emitted module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FunctionId(pub u32);

impl FunctionId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A resolved variable.
///
/// `address` is signed: parameter `i` sits at `-4 * (i + 1)`, locals grow
/// upwards from 0 in declaration order. Codegen turns it into a frame
/// offset once the function's local count is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variable<'src> {
    pub name: &'src str,
    pub address: i32,
    /// 0 for `int`, 1 for `int *`, and so on.
    pub indirection: u32,
}

impl Variable<'_> {
    pub fn is_param(&self) -> bool {
        self.address < 0
    }
}

#[derive(Debug, Clone)]
pub struct Function<'src> {
    pub name: &'src str,
    pub id: FunctionId,
    pub params: Vec<Variable<'src>>,
    pub locals: BTreeMap<&'src str, Variable<'src>>,
    /// Root of the body, set once the closing brace has been parsed.
    pub body: Option<NodeId>,
    /// Running size in bytes of the local area.
    stack_size: i32,
}

impl<'src> Function<'src> {
    pub fn new(name: &'src str, id: FunctionId) -> Self {
        Self {
            name,
            id,
            params: Vec::new(),
            locals: BTreeMap::new(),
            body: None,
            stack_size: 0,
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn param(&self, name: &str) -> Option<&Variable<'src>> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Append a parameter. Returns `None` if the name is already a parameter.
    pub fn declare_param(&mut self, name: &'src str, indirection: u32) -> Option<i32> {
        if self.param(name).is_some() {
            return None;
        }
        let address = -SLOT_SIZE * (self.params.len() as i32 + 1);
        self.params.push(Variable {
            name,
            address,
            indirection,
        });
        Some(address)
    }

    /// Allocate the next local slot. Returns `None` if `name` is already a
    /// parameter or a local of this function.
    pub fn declare_variable(&mut self, name: &'src str, indirection: u32) -> Option<i32> {
        if self.param(name).is_some() || self.locals.contains_key(name) {
            return None;
        }
        let address = self.stack_size;
        self.stack_size += SLOT_SIZE;
        self.locals.insert(
            name,
            Variable {
                name,
                address,
                indirection,
            },
        );
        Some(address)
    }

    /// Parameters are scanned first, then the local map.
    pub fn find_variable(&self, name: &str) -> Option<&Variable<'src>> {
        self.param(name).or_else(|| self.locals.get(name))
    }

    pub fn local_count(&self) -> usize {
        self.locals.len()
    }

    /// Bytes taken by locals, before frame alignment.
    pub fn stack_size(&self) -> i32 {
        self.stack_size
    }
}

/// Every function of a compilation, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct FunctionTable<'src> {
    functions: Vec<Function<'src>>,
    by_name: BTreeMap<&'src str, FunctionId>,
}

impl<'src> FunctionTable<'src> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function and assign its dense index. Returns `None` on a
    /// name collision.
    pub fn declare_function(&mut self, name: &'src str) -> Option<FunctionId> {
        if self.by_name.contains_key(name) {
            return None;
        }
        let id = FunctionId(self.functions.len() as u32);
        self.functions.push(Function::new(name, id));
        self.by_name.insert(name, id);
        Some(id)
    }

    pub fn find_function(&self, name: &str) -> Option<&Function<'src>> {
        self.by_name.get(name).map(|id| &self.functions[id.index()])
    }

    pub fn get(&self, id: FunctionId) -> &Function<'src> {
        &self.functions[id.index()]
    }

    pub fn get_mut(&mut self, id: FunctionId) -> &mut Function<'src> {
        &mut self.functions[id.index()]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Function<'src>> {
        self.functions.iter()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
