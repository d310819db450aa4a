// SPDX-License-Identifier: EPL-2.0 OR GPL-2.0-or-later
// SPDX-FileCopyrightText: Bradley M. Bell <bradbell@seanet.com>
// SPDX-FileContributor: 2025-26 Bradley M. Bell
//
//! Instruction opcodes and the [`Inst`] node shape.
//!
//! Link to [parent module](super)

use ordered_float::OrderedFloat;

use super::decoration::Decoration;
use super::ids::{FuncId, InstId, TypeId};
use super::types::FieldKey;

/// The closed set of forward-mode opcodes the pass dispatches on.
///
/// Terminators (`Return`, `Branch`, `If`, `Loop`, `Switch`) are never
/// stored in a block's ordinary instruction list; they live on
/// [`Terminator`](super::block::Terminator) instead, but share this
/// enum so [`crate::transpose::inst_transpose`] can skip them uniformly
/// when walking a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    // -- leaves, used to build test fixtures --
    /// A block parameter (phi node).
    Param,
    /// An integer literal.
    IntLit,
    /// A floating-point literal.
    FloatLit,

    // -- arithmetic --
    Add,
    Sub,
    Mul,
    Neg,

    // -- aggregate destructors --
    Swizzle,
    FieldExtract,
    GetElement,

    // -- aggregate constructors --
    MakeVector,
    MakeVectorFromScalar,
    MakeMatrix,
    MakeMatrixFromScalar,
    MatrixReshape,
    MakeStruct,
    MakeArray,
    MakeArrayFromElement,
    UpdateElement,

    // -- differential pairs --
    MakeDifferentialPair,
    DifferentialPairGetDifferential,

    // -- memory --
    Load,
    Store,
    /// Takes the address of a variable; the resulting pointer is
    /// hoisted through blocks unchanged.
    Var,
    /// Address of a struct field, used by the materializer's
    /// scatter-then-load strategy.
    FieldAddress,
    /// Address of an array element, used by the materializer's
    /// scatter-then-load strategy.
    ElementAddress,

    // -- calls --
    /// A forward-mode differentiable call: `fwdDiff(f)(args...)`.
    ForwardDifferentiateCall,
    /// An ordinary, non-differentiable call.
    Call,

    // -- terminators (see note above) --
    Return,
    Branch,
    If,
    Loop,
    Switch,
}

impl Opcode {
    /// True for the five terminator-carrying opcodes, which the block
    /// walk in [`crate::transpose::block_transpose`] must skip: they are
    /// handled exclusively by [`crate::transpose::cfg_reverse`].
    pub fn is_terminator(self) -> bool {
        matches!(
            self,
            Opcode::Return | Opcode::Branch | Opcode::If | Opcode::Loop | Opcode::Switch
        )
    }

    /// True for opcodes whose result is conveyed through a block
    /// unchanged rather than differentiated (pointers, addresses).
    pub fn is_opaque_value(self) -> bool {
        matches!(self, Opcode::Var | Opcode::FieldAddress | Opcode::ElementAddress)
    }
}

/// Opcode-specific data that does not fit the generic operand list.
#[derive(Clone, Debug, PartialEq)]
pub enum InstExtra {
    /// No opcode-specific payload.
    None,
    /// An integer literal value.
    Int(i64),
    /// A floating-point literal value, wrapped for `Eq`/`Hash`.
    Float(OrderedFloat<f64>),
    /// Component indices read by `Swizzle`/`MakeVector`'s inverse, or
    /// written by `UpdateElement`'s chain.
    Indices(Vec<u32>),
    /// The struct field key read by `FieldExtract`/`FieldAddress` or
    /// written by one operand of `MakeStruct`.
    Field(FieldKey),
    /// The callee of a `Call` or `ForwardDifferentiateCall`.
    Callee(FuncId),
}

/// A single SSA node: an opcode, its operands, its type, any
/// decorations, and opcode-specific payload.
#[derive(Clone, Debug)]
pub struct Inst {
    pub opcode: Opcode,
    pub operands: Vec<InstId>,
    pub ty: TypeId,
    pub decorations: Vec<Decoration>,
    pub extra: InstExtra,
}

impl Inst {
    /// Builds an instruction with no decorations and no extra payload.
    pub fn new(opcode: Opcode, operands: Vec<InstId>, ty: TypeId) -> Self {
        Self { opcode, operands, ty, decorations: Vec::new(), extra: InstExtra::None }
    }

    /// Finds the first decoration matching `pred`, if any.
    pub fn find_decoration<'a>(&'a self, mut pred: impl FnMut(&Decoration) -> bool) -> Option<&'a Decoration> {
        self.decorations.iter().find(|d| pred(d))
    }

    /// True if this instruction carries a `DifferentialInst` decoration.
    pub fn is_differential(&self) -> bool {
        self.find_decoration(|d| matches!(d, Decoration::DifferentialInst { .. })).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ids::TypeId;

    #[test]
    fn terminators_are_classified_correctly() {
        assert!(Opcode::Return.is_terminator());
        assert!(Opcode::Loop.is_terminator());
        assert!(!Opcode::Add.is_terminator());
    }

    #[test]
    fn new_inst_has_no_decorations() {
        let inst = Inst::new(Opcode::Add, vec![InstId(0), InstId(1)], TypeId(0));
        assert!(inst.decorations.is_empty());
        assert!(!inst.is_differential());
    }
}
