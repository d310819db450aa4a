// SPDX-License-Identifier: EPL-2.0 OR GPL-2.0-or-later
// SPDX-FileCopyrightText: Bradley M. Bell <bradbell@seanet.com>
// SPDX-FileContributor: 2025-26 Bradley M. Bell
//
//! Basic blocks and their terminators.
//!
//! Link to [parent module](super)

use super::decoration::Decoration;
use super::ids::{BlockId, InstId};

/// The control instruction that closes a [`Block`].
///
/// Kept off the ordinary instruction list (rather than folded into
/// `Inst`) because every structured-region rule in
/// [`crate::transpose::cfg_reverse`] dispatches on it directly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Terminator {
    /// Not yet closed; only legal on a block still under construction.
    Unset,
    /// Returns `value` (absent for void functions).
    Return { value: Option<InstId> },
    /// Unconditional branch to `target`, passing `args` as its phi
    /// parameters.
    Branch { target: BlockId, args: Vec<InstId> },
    /// A structured if/else: branches to `then_block` when `cond` is
    /// true, `else_block` otherwise; both sides are required (by this
    /// pass's Non-goals) to be dominated by `after`.
    If { cond: InstId, then_block: BlockId, else_block: BlockId, after: BlockId },
    /// A structured loop: `body` runs each iteration; `break_block` is
    /// reached when the loop's top-level condition (evaluated inside
    /// `body`) is false. `continue_block` is the back-edge target.
    Loop { body: BlockId, break_block: BlockId, continue_block: BlockId },
    /// A structured switch over `value`; `cases` pairs each case's
    /// block with its target, `break_block` is the join point.
    Switch { value: InstId, cases: Vec<(i64, BlockId)>, break_block: BlockId },
}

/// An ordered sequence of instructions closed by a [`Terminator`].
#[derive(Clone, Debug)]
pub struct Block {
    /// Block parameters (phi nodes); instruction ids pointing at
    /// `Opcode::Param` nodes stored in the owning function's arena.
    pub params: Vec<InstId>,
    /// Ordinary instructions in program order, excluding the terminator.
    pub insts: Vec<InstId>,
    pub terminator: Terminator,
    pub decorations: Vec<Decoration>,
}

impl Block {
    /// Creates an empty, unterminated block.
    pub fn new() -> Self {
        Self { params: Vec::new(), insts: Vec::new(), terminator: Terminator::Unset, decorations: Vec::new() }
    }

    /// True if this block carries a `DifferentialBlock` decoration.
    pub fn is_differential(&self) -> bool {
        self.decorations.iter().any(|d| matches!(d, Decoration::DifferentialBlock { .. }))
    }

    /// Marks this block as a differential block mirroring `primal`.
    pub fn mark_differential(&mut self, primal: BlockId) {
        self.decorations.push(Decoration::DifferentialBlock { primal });
    }
}

impl Default for Block {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_block_is_unterminated_and_empty() {
        let b = Block::new();
        assert_eq!(b.terminator, Terminator::Unset);
        assert!(b.insts.is_empty());
        assert!(!b.is_differential());
    }
}
