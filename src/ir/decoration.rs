// SPDX-License-Identifier: EPL-2.0 OR GPL-2.0-or-later
// SPDX-FileCopyrightText: Bradley M. Bell <bradbell@seanet.com>
// SPDX-FileContributor: 2025-26 Bradley M. Bell
//
//! Metadata attached to blocks and instructions.
//!
//! Link to [parent module](super)

use super::ids::{BlockId, InstId, TypeId};

/// A piece of metadata attached to a [`Block`](super::block::Block) or
/// [`Inst`](super::inst::Inst).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decoration {
    /// Marks an instruction as produced by forward differentiation;
    /// carries its primal counterpart and the primal type.
    DifferentialInst { primal: InstId, primal_type: TypeId },
    /// Marks a block as produced by forward differentiation (a
    /// "differential block"), or, once the CFG reverser has run, as a
    /// freshly emitted reverse image of one; carries the forward block
    /// it mirrors.
    DifferentialBlock { primal: BlockId },
    /// Marks an instruction that carries a loop's induction variable;
    /// such instructions are hoisted into the reverse block unchanged.
    LoopCounter,
    /// A human-readable hint, propagated with a `_T` suffix onto the
    /// transposed value that replaces this one.
    NameHint(String),
    /// On an array element, names the primal element type (arrays do
    /// not carry per-element `TypeId`s directly).
    PrimalElementType(TypeId),
    /// On a differentiable `Call`, points at the pointer slot where the
    /// forward pass stashed replay state for the backward call.
    BackwardDerivativePrimalContext(InstId),
    /// Attached to the function's `Return` by the driver, carrying the
    /// primal component of the original return value (or a void marker)
    /// once the return value's adjoint has been consumed.
    ReturnValue(Option<InstId>),
    /// Marks a reverse block as the point a cross-block accumulator's
    /// zero-initializing store belongs in.
    AccumulatorHome(BlockId),
}

impl Decoration {
    /// Returns the primal instruction of a `DifferentialInst` decoration.
    pub fn differential_primal(&self) -> Option<InstId> {
        match self {
            Decoration::DifferentialInst { primal, .. } => Some(*primal),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn differential_primal_extracts_the_backpointer() {
        let primal = InstId(3);
        let ty = TypeId(0);
        let d = Decoration::DifferentialInst { primal, primal_type: ty };
        assert_eq!(d.differential_primal(), Some(primal));
        assert_eq!(Decoration::LoopCounter.differential_primal(), None);
    }
}
