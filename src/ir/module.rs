// SPDX-License-Identifier: EPL-2.0 OR GPL-2.0-or-later
// SPDX-FileCopyrightText: Bradley M. Bell <bradbell@seanet.com>
// SPDX-FileContributor: 2025-26 Bradley M. Bell
//
//! Multi-function table, needed only so `Call`/`ForwardDifferentiateCall`
//! and the backward-propagation lookup collaborator have something to
//! resolve against.
//!
//! Link to [parent module](super)

use rustc_hash::FxHashMap;

use super::function::Function;
use super::ids::{FuncId, TypeId};
use super::types::{Type, TypeTable};

/// A module-scope table of functions and the shared type interner.
///
/// This is a minimal stand-in for "the rest of the compiler": it
/// exists only because `Call(f, args...)` and `backwardPropagateEntry`
/// need a function table to resolve `FuncId` against (§6, §4.3 "Call
/// transposition").
#[derive(Default)]
pub struct Module {
    pub types: TypeTable,
    functions: Vec<Function>,
    /// Maps a forward-mode differentiable function to the callable
    /// that implements its reverse derivative, the
    /// `backwardPropagateEntry(f)` collaborator of §6.
    backward_entry: FxHashMap<FuncId, FuncId>,
}

impl Module {
    /// Creates an empty module.
    pub fn new() -> Self {
        Self { types: TypeTable::new(), functions: Vec::new(), backward_entry: FxHashMap::default() }
    }

    /// Interns `ty` in the module-wide type table.
    pub fn intern_type(&mut self, ty: Type) -> TypeId {
        self.types.insert(ty)
    }

    /// Adds a function to the module, returning its handle.
    pub fn add_function(&mut self, func: Function) -> FuncId {
        let id = FuncId(self.functions.len() as u32);
        self.functions.push(func);
        id
    }

    /// Resolves a function handle.
    pub fn function(&self, id: FuncId) -> &Function {
        &self.functions[id.index()]
    }

    /// Resolves a function handle, mutably.
    pub fn function_mut(&mut self, id: FuncId) -> &mut Function {
        &mut self.functions[id.index()]
    }

    /// Splits the module into its type table and one function, both
    /// mutable at once; needed wherever conformance synthesis must
    /// intern a differential type while also emitting IR into the
    /// function under rewrite.
    pub fn split_mut(&mut self, id: FuncId) -> (&mut TypeTable, &mut Function) {
        (&mut self.types, &mut self.functions[id.index()])
    }

    /// Registers `bwd` as the backward-propagation entry for the
    /// forward-differentiable function `fwd`.
    pub fn register_backward_entry(&mut self, fwd: FuncId, bwd: FuncId) {
        self.backward_entry.insert(fwd, bwd);
    }

    /// The `backwardPropagateEntry(f)` collaborator of §6: yields the
    /// callable implementing the reverse derivative of `fwd`, if one
    /// has been registered.
    pub fn backward_propagate_entry(&self, fwd: FuncId) -> Option<FuncId> {
        self.backward_entry.get(&fwd).copied()
    }

    /// The full forward-to-backward function table, for callers (the
    /// transpose driver) that need to hand it to the per-instruction
    /// transposer alongside a separately split `&mut Function`.
    pub fn backward_entries(&self) -> &FxHashMap<FuncId, FuncId> {
        &self.backward_entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::function::Function;

    #[test]
    fn functions_round_trip_through_the_table() {
        let mut m = Module::new();
        let f = m.add_function(Function::new("f"));
        let g = m.add_function(Function::new("g"));
        assert_eq!(m.function(f).name, "f");
        assert_eq!(m.function(g).name, "g");
        m.register_backward_entry(f, g);
        assert_eq!(m.backward_propagate_entry(f), Some(g));
        assert_eq!(m.backward_propagate_entry(g), None);
    }
}
