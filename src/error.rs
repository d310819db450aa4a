// SPDX-License-Identifier: EPL-2.0 OR GPL-2.0-or-later
// SPDX-FileCopyrightText: Bradley M. Bell <bradbell@seanet.com>
// SPDX-FileContributor: 2025-26 Bradley M. Bell
//
//! The pass's error taxonomy (§7, §12). `run` either fully transposes
//! a function or returns one of these; there is no partial success.

use thiserror::Error;

use crate::ir::ids::{BlockId, FuncId, InstId};
use crate::ir::inst::Opcode;

/// Everything that can make the pass abort instead of producing a
/// fully transposed function.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransposeError {
    /// The function does not have exactly one terminal primal block.
    #[error("function does not have a unique terminal primal block")]
    NotSingleReturnPrimal,
    /// The function does not have exactly one terminal differential
    /// block.
    #[error("function does not have a unique terminal differential block")]
    NotSingleReturnDifferential,
    /// A loop's top-level condition put the loop body on the false
    /// side rather than the true side (§9 open question).
    #[error("loop at block {block:?} has its body on the condition's false side, which this pass does not support")]
    LoopNotOnTrueSide {
        /// The loop's condition block.
        block: BlockId,
    },
    /// A structured region ended on a conditional branch instead of
    /// the expected unconditional branch or terminal block.
    #[error("region starting at block {head:?} ends on a conditional branch at block {found:?} instead of being dominated by a shared `after` block")]
    RegionEndsOnConditionalBranch {
        /// The region's entry block.
        head: BlockId,
        /// The block whose terminator was conditional.
        found: BlockId,
    },
    /// A cycle was found in a region that is not a recognized loop
    /// shape.
    #[error("non-loop cycle detected at block {block:?}")]
    UnstructuredCycle {
        /// The block where the cycle was detected.
        block: BlockId,
    },
    /// `emitAggregate` was called with a differential-pair primal
    /// type; callers must split pair adjoints first.
    #[error("materializer was asked to aggregate a differential-pair type directly")]
    AggregateOfDifferentialPair,
    /// The per-instruction transposer has no rule for this opcode.
    #[error("unhandled instruction: {opcode:?} at {inst:?}")]
    UnhandledInstruction {
        /// The opcode with no transposition rule.
        opcode: Opcode,
        /// The forward instruction.
        inst: InstId,
    },
    /// `Mul` was transposed with zero or two differential operands.
    #[error("unhandled arithmetic shape for {opcode:?} at {inst:?}: expected exactly one differential operand")]
    UnhandledArithmetic {
        /// The opcode (always `Mul` today).
        opcode: Opcode,
        /// The forward instruction.
        inst: InstId,
    },
    /// Operand promotion could not find a broadened type to unify two
    /// operand types into the instruction's result type.
    #[error("unhandled target type for promotion at {inst:?}")]
    UnhandledPromotionTarget {
        /// The instruction whose operand needed promotion.
        inst: InstId,
    },
    /// No differential type, zero synthesizer, or add synthesizer was
    /// registered for a primal type in play.
    #[error("missing differentiable-type conformance for the type of {inst:?}")]
    MissingConformance {
        /// The instruction whose primal type lacks conformance.
        inst: InstId,
    },
    /// A non-`fwdDiff` callee was invoked with differentiable
    /// arguments; this pass only transposes `fwdDiff` calls.
    #[error("non-differentiable call to {callee:?} at {inst:?} has differentiable arguments, which is not yet supported")]
    UnsupportedCallArguments {
        /// The callee function.
        callee: FuncId,
        /// The call instruction.
        inst: InstId,
    },
    /// `Call` to a `fwdDiff`-marked callee with no registered
    /// backward-propagation entry.
    #[error("no backward-propagation entry registered for {callee:?}, called at {inst:?}")]
    MissingBackwardEntry {
        /// The forward callee.
        callee: FuncId,
        /// The call instruction.
        inst: InstId,
    },
    /// A dynamically-sized array adjoint was required; only
    /// fixed-length arrays are supported (§1 Non-goals).
    #[error("dynamic-size array adjoints are not supported, at {inst:?}")]
    DynamicArrayUnsupported {
        /// The instruction with a dynamic-size array type.
        inst: InstId,
    },
    /// A partial adjoint's target resolved to a module-scope (global)
    /// value rather than a block-local or accumulator-backed one.
    #[error("gradient target {inst:?} is a module-scope value, which this pass does not support")]
    GlobalGradientUnsupported {
        /// The global-scope target instruction.
        inst: InstId,
    },
    /// A block finished transposition with partial adjoints still
    /// pending in the gradient store (§4.4 step 5, §8 invariant 2).
    #[error("gradient store still holds pending partials for {targets:?} after transposing block {block:?}")]
    GradientStoreNotEmpty {
        /// The forward block whose transposition should have flushed
        /// every partial it produced or consumed.
        block: BlockId,
        /// The forward instructions still holding pending partials.
        targets: Vec<InstId>,
    },
}

/// Convenience alias used throughout `transpose::*`.
pub type Result<T> = std::result::Result<T, TransposeError>;
