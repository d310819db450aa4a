// SPDX-License-Identifier: EPL-2.0 OR GPL-2.0-or-later
// SPDX-FileCopyrightText: Bradley M. Bell <bradbell@seanet.com>
// SPDX-FileContributor: 2025-26 Bradley M. Bell
//
//! §4.1: the gradient store (partial-adjoint ledger) and the
//! function-scope accumulator map. Grounded on the teacher's
//! `OpSequence`/tape-as-ledger idiom in `tape.rs`.
//!
//! Link to [parent module](super)

use rustc_hash::FxHashMap;

use crate::conformance::ConformanceRegistry;
use crate::error::{Result, TransposeError};
use crate::ir::builder::Builder;
use crate::ir::ids::{BlockId, InstId, TypeId};
use crate::ir::types::{Type, TypeTable};

/// Selects how [`crate::transpose::materializer::emit_aggregate`]
/// folds a partial adjoint into the final sum (§3 `RevGradient`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Flavor {
    /// A plain value to be summed with `add`.
    Simple,
    /// A sub-vector extracted by a forward `Swizzle`.
    Swizzle,
    /// An element extracted by a forward `GetElement`.
    GetElement,
    /// A field extracted by a forward `FieldExtract`.
    FieldExtract,
    /// The tangent component extracted by
    /// `DifferentialPairGetDifferential`.
    GetDifferential,
}

/// A single partial adjoint contributed to `target` (§3).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevGradient {
    /// The forward instruction this adjoint contributes to.
    pub target: InstId,
    /// The IR value of the partial adjoint.
    pub value: InstId,
    /// The forward instruction that produced this partial, if any.
    pub origin: Option<InstId>,
    /// The materialization strategy this partial requires.
    pub flavor: Flavor,
}

impl RevGradient {
    /// Builds a `Simple`-flavored partial with no recorded origin.
    pub fn simple(target: InstId, value: InstId) -> Self {
        Self { target, value, origin: None, flavor: Flavor::Simple }
    }

    /// Builds a partial of the given flavor, recording `origin`.
    pub fn with_origin(target: InstId, value: InstId, origin: InstId, flavor: Flavor) -> Self {
        Self { target, value, origin: Some(origin), flavor }
    }
}

/// The gradient store of §4.1: per-forward-instruction partial-adjoint
/// lists, plus the lazily created accumulator cells that let an
/// adjoint survive across blocks.
#[derive(Default)]
pub struct GradientStore {
    partials: FxHashMap<InstId, Vec<RevGradient>>,
    accumulators: FxHashMap<InstId, InstId>,
}

impl GradientStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `g` to the partial-adjoint list for `target`.
    pub fn add(&mut self, target: InstId, g: RevGradient) {
        self.partials.entry(target).or_default().push(g);
    }

    /// True if `target` currently has at least one partial adjoint.
    pub fn has_any(&self, target: InstId) -> bool {
        self.partials.get(&target).is_some_and(|v| !v.is_empty())
    }

    /// Removes and returns the partial-adjoint list for `target`; the
    /// caller owns the list from this point on (§3 invariant).
    pub fn pop(&mut self, target: InstId) -> Vec<RevGradient> {
        self.partials.remove(&target).unwrap_or_default()
    }

    /// All forward instructions with at least one pending partial.
    pub fn pending_targets(&self) -> Vec<InstId> {
        self.partials.iter().filter(|(_, v)| !v.is_empty()).map(|(&k, _)| k).collect()
    }

    /// True once every list is empty (§8 invariant 2: post-condition
    /// of a fully transposed function).
    pub fn is_empty(&self) -> bool {
        self.partials.values().all(|v| v.is_empty())
    }

    /// Returns the accumulator cell for `target` if one already
    /// exists, without creating it.
    pub fn accumulator(&self, target: InstId) -> Option<InstId> {
        self.accumulators.get(&target).copied()
    }

    /// `accumulatorFor(inst)` (§4.1): returns `target`'s accumulator
    /// cell, creating it on first use. The cell is a pointer to a
    /// fresh stack variable of `target`'s differential type, emitted
    /// at the head of `home` (the first reverse differential block)
    /// and immediately initialized to that type's zero.
    pub fn accumulator_for(
        &mut self,
        builder: &mut Builder,
        types: &mut TypeTable,
        conformance: &mut ConformanceRegistry,
        home: BlockId,
        target: InstId,
        primal_ty: TypeId,
    ) -> Result<InstId> {
        if let Some(&cell) = self.accumulators.get(&target) {
            return Ok(cell);
        }
        let diff_ty = conformance
            .differential_type_for(types, primal_ty)
            .ok_or(TransposeError::MissingConformance { inst: target })?;
        let void_ty = types.insert(Type::Void);
        let cell = builder.with_head_insertion(home, |b| -> Result<InstId> {
            let pointer_ty = types.insert(Type::Pointer { pointee: diff_ty });
            let cell = b.emit_var(pointer_ty);
            let zero = conformance
                .emit_zero(b, types, diff_ty)
                .ok_or(TransposeError::MissingConformance { inst: target })?;
            b.store(cell, zero, void_ty);
            Ok(cell)
        })?;
        self.accumulators.insert(target, cell);
        Ok(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::function::Function;

    #[test]
    fn add_then_pop_returns_in_order() {
        let mut store = GradientStore::new();
        let target = InstId(0);
        let a = InstId(1);
        let b = InstId(2);
        store.add(target, RevGradient::simple(target, a));
        store.add(target, RevGradient::simple(target, b));
        assert!(store.has_any(target));
        let popped = store.pop(target);
        assert_eq!(popped.iter().map(|g| g.value).collect::<Vec<_>>(), vec![a, b]);
        assert!(!store.has_any(target));
    }

    #[test]
    fn accumulator_for_is_idempotent_and_seeds_zero_at_head() {
        let mut types = TypeTable::new();
        let scalar = types.insert(Type::Scalar);
        let mut f = Function::new("f");
        let home = f.entry;
        let target = f.append(home, crate::ir::inst::Inst::new(crate::ir::inst::Opcode::IntLit, vec![], scalar));
        let pre_existing = f.append(home, crate::ir::inst::Inst::new(crate::ir::inst::Opcode::IntLit, vec![], scalar));
        let mut builder = Builder::new(&mut f, home);
        let mut conformance = ConformanceRegistry::new();
        let mut store = GradientStore::new();
        let cell1 = store.accumulator_for(&mut builder, &mut types, &mut conformance, home, target, scalar).unwrap();
        let cell2 = store.accumulator_for(&mut builder, &mut types, &mut conformance, home, target, scalar).unwrap();
        assert_eq!(cell1, cell2);
        let insts = &builder.func().block(home).insts;
        assert_eq!(insts[2], pre_existing);
        assert_eq!(insts[0], cell1);
    }
}
