// SPDX-License-Identifier: EPL-2.0 OR GPL-2.0-or-later
// SPDX-FileCopyrightText: Bradley M. Bell <bradbell@seanet.com>
// SPDX-FileContributor: 2025-26 Bradley M. Bell
//
//! §4.4: the block transposer. Walks a forward differential block's
//! instructions in reverse, popping and materializing each one's
//! partial adjoints, transposing it, and routing the resulting
//! partials either to a same-block pending list or, for values used
//! outside the block, to a cross-block accumulator cell. Grounded on
//! `slang-ir-autodiff-transpose.h`'s `transposeBlock`.
//!
//! Link to [parent module](super)

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::conformance::ConformanceRegistry;
use crate::error::{Result, TransposeError};
use crate::ir::block::Terminator;
use crate::ir::builder::Builder;
use crate::ir::decoration::Decoration;
use crate::ir::ids::{BlockId, FuncId, InstId};
use crate::ir::inst::{InstExtra, Opcode};
use crate::ir::types::{Type, TypeTable};

use super::gradient_store::GradientStore;
use super::inst_transpose::transpose_inst;
use super::materializer::emit_aggregate;

/// Per-forward-block list of adjoint values that must travel along the
/// reverse control edge landing on that block's reverse image (§3
/// "Phi-grads map"); populated by [`transpose_block`]'s step 4,
/// consumed by [`crate::transpose::cfg_reverse::reverse_region`].
pub type PhiGradMap = FxHashMap<BlockId, Vec<InstId>>;

/// Transposes `fwd_block` into the already-allocated `rev_block`
/// (§4.4). `first_rev_diff_block` is where cross-block accumulator
/// cells get their head-of-block zero-seed (§4.1). `phi_grads`
/// accumulates this block's own phi-grad list (step 4) and is read by
/// the caller of [`transpose_block`] on every other block's own branch
/// args (step 1).
#[allow(clippy::too_many_arguments)]
pub fn transpose_block(
    builder: &mut Builder,
    types: &mut TypeTable,
    conformance: &mut ConformanceRegistry,
    store: &mut GradientStore,
    backward_entries: &FxHashMap<FuncId, FuncId>,
    phi_grads: &mut PhiGradMap,
    first_rev_diff_block: BlockId,
    fwd_block: BlockId,
    rev_block: BlockId,
) -> Result<()> {
    let fwd_insts: Vec<InstId> = builder.func().block(fwd_block).insts.clone();

    // Step 1: if this block's own terminator is an unconditional branch
    // passing arguments into a successor's phi parameters, declare a
    // matching reverse parameter on `rev_block` per argument and seed a
    // Simple partial attributing it back to the forward argument value
    // (§4.4 step 1). The successor's own phi-grad list (§4.4 step 4)
    // is what the CFG reverser later threads into these parameters.
    if let Terminator::Branch { target, args } = builder.func().terminator(fwd_block).clone() {
        let target_params = builder.func().block(target).params.clone();
        for (arg, param) in args.iter().zip(target_params.iter()) {
            let param_ty = builder.func().data_type(*param);
            let rev_param = builder.emit_param(rev_block, param_ty);
            store.add(*arg, super::gradient_store::RevGradient::simple(*arg, rev_param));
        }
    }

    // Step 2: pointer/function-typed instructions are hoisted, re-run
    // in their original order, to the head of the reverse block; their
    // home block is deleted once the pass finishes, so anything that
    // still needs to execute them must own a live copy.
    let mut hoisted: FxHashMap<InstId, InstId> = FxHashMap::default();
    builder.with_head_insertion(rev_block, |b| {
        for &old in &fwd_insts {
            let inst = b.func().inst(old).clone();
            if !inst.opcode.is_opaque_value() {
                continue;
            }
            let operands: Vec<InstId> = inst.operands.iter().map(|o| *hoisted.get(o).unwrap_or(o)).collect();
            let new_id = match inst.opcode {
                Opcode::Var => b.emit_var(inst.ty),
                Opcode::FieldAddress => {
                    let key = match inst.extra {
                        InstExtra::Field(k) => k,
                        _ => unreachable!("FieldAddress always carries InstExtra::Field"),
                    };
                    b.field_address(operands[0], key, inst.ty)
                }
                Opcode::ElementAddress => b.element_address(operands[0], operands[1], inst.ty),
                _ => unreachable!("is_opaque_value() admits only Var/FieldAddress/ElementAddress"),
            };
            hoisted.insert(old, new_id);
        }
    });

    // Step 3: walk the rest of the block in reverse textual order,
    // appending reverse code to rev_block as we go (so the emission
    // order is already the reverse program order the output wants).
    let saved = builder.set_insert_point(rev_block);
    for &fwd_inst in fwd_insts.iter().rev() {
        let opcode = builder.func().inst(fwd_inst).opcode;
        if opcode.is_opaque_value() || opcode.is_terminator() {
            continue;
        }
        if builder.func().inst(fwd_inst).find_decoration(|d| matches!(d, Decoration::LoopCounter)).is_some() {
            clone_unchanged(builder, fwd_inst, &hoisted);
            continue;
        }
        transpose_one(builder, types, conformance, store, backward_entries, first_rev_diff_block, fwd_block, fwd_inst, &hoisted)?;
    }

    // Step 4: the block's own phi parameters (received from forward
    // predecessors) get their accumulated adjoint aggregated into this
    // block's phi-grad list, in parameter order, zero where a
    // parameter attracted no partials at all.
    let params: Vec<InstId> = builder.func().block(fwd_block).params.clone();
    let mut grads = Vec::with_capacity(params.len());
    for param in params {
        let value = final_adjoint_for(builder, types, conformance, store, first_rev_diff_block, fwd_block, param)?;
        grads.push(value);
    }
    phi_grads.insert(fwd_block, grads);

    builder.restore_insert_point(saved);

    // Step 5 (cont.): every partial produced while walking this block
    // must have been consumed — by the per-instruction transposer, by
    // a cross-block accumulator store, or by the phi aggregation above
    // (§4.4 step 5, §8 invariant 2).
    if !store.is_empty() {
        return Err(TransposeError::GradientStoreNotEmpty { block: fwd_block, targets: store.pending_targets() });
    }

    Ok(())
}

fn clone_unchanged(builder: &mut Builder, fwd_inst: InstId, hoisted: &FxHashMap<InstId, InstId>) -> InstId {
    let mut inst = builder.func().inst(fwd_inst).clone();
    for operand in inst.operands.iter_mut() {
        if let Some(&h) = hoisted.get(operand) {
            *operand = h;
        }
    }
    inst.decorations.clear();
    let point = builder.insert_point();
    builder.func_mut().append(point, inst)
}

/// Pops `inst`'s pending local partials (if any), folds them with its
/// cross-block accumulator (if one exists), and returns the resulting
/// adjoint value — `None` only when neither exists and no differential
/// type is registered for `inst`'s primal type (the "absent value"
/// case of §4.2). Shared by [`transpose_one`] (which also needs to
/// dispatch the per-instruction transposer) and [`final_adjoint_for`]
/// (which, for a block's own phi parameters, needs the aggregated
/// value alone per §4.4 step 4).
fn aggregate_with_accumulator(
    builder: &mut Builder,
    types: &mut TypeTable,
    conformance: &mut ConformanceRegistry,
    store: &mut GradientStore,
    inst: InstId,
) -> Result<Option<InstId>> {
    let has_acc = store.accumulator(inst).is_some();
    let has_local = store.has_any(inst);
    let primal_ty = builder.func().data_type(inst);
    let void_ty = types.insert(Type::Void);

    if has_acc {
        let acc = store.accumulator(inst).expect("checked above");
        let diff_ty =
            conformance.differential_type_for(types, primal_ty).ok_or(TransposeError::MissingConformance { inst })?;
        if has_local {
            let gradients = store.pop(inst);
            if let Some(local_value) = emit_aggregate(builder, types, conformance, inst, primal_ty, gradients)? {
                let current = builder.load(acc, diff_ty);
                let summed = conformance
                    .emit_add(builder, types, diff_ty, current, local_value)
                    .ok_or(TransposeError::MissingConformance { inst })?;
                builder.store(acc, summed, void_ty);
            }
        }
        Ok(Some(builder.load(acc, diff_ty)))
    } else if has_local {
        let gradients = store.pop(inst);
        emit_aggregate(builder, types, conformance, inst, primal_ty, gradients)
    } else {
        Ok(None)
    }
}

/// §4.4 step 4, for one phi parameter of the block under transposition:
/// the final adjoint is its aggregated partials, zeroed if it attracted
/// none at all (the phi-grad list always has one entry per parameter).
fn final_adjoint_for(
    builder: &mut Builder,
    types: &mut TypeTable,
    conformance: &mut ConformanceRegistry,
    store: &mut GradientStore,
    first_rev_diff_block: BlockId,
    fwd_block: BlockId,
    param: InstId,
) -> Result<InstId> {
    if builder.func().used_outside_block(param, fwd_block) {
        let primal_ty = builder.func().data_type(param);
        let _ = store.accumulator_for(builder, types, conformance, first_rev_diff_block, param, primal_ty)?;
    }
    match aggregate_with_accumulator(builder, types, conformance, store, param)? {
        Some(v) => Ok(v),
        None => {
            let primal_ty = builder.func().data_type(param);
            conformance.emit_zero(builder, types, primal_ty).ok_or(TransposeError::MissingConformance { inst: param })
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn transpose_one(
    builder: &mut Builder,
    types: &mut TypeTable,
    conformance: &mut ConformanceRegistry,
    store: &mut GradientStore,
    backward_entries: &FxHashMap<FuncId, FuncId>,
    first_rev_diff_block: BlockId,
    fwd_block: BlockId,
    fwd_inst: InstId,
    hoisted: &FxHashMap<InstId, InstId>,
) -> Result<()> {
    if store.accumulator(fwd_inst).is_none() && !store.has_any(fwd_inst) {
        return Ok(());
    }
    let rev_value = match aggregate_with_accumulator(builder, types, conformance, store, fwd_inst)? {
        Some(v) => v,
        None => return Ok(()),
    };

    trace!(inst = ?fwd_inst, "transposing instruction");
    let void_ty = types.insert(Type::Void);
    let partials = transpose_inst(builder, types, conformance, backward_entries, fwd_inst, rev_value)?;
    for mut g in partials {
        g.target = *hoisted.get(&g.target).unwrap_or(&g.target);
        if builder.func().parent_of(g.target).index() == u32::MAX as usize {
            return Err(TransposeError::GlobalGradientUnsupported { inst: g.target });
        }
        if builder.func().used_outside_block(g.target, fwd_block) {
            let target_primal_ty = builder.func().data_type(g.target);
            let diff_ty = conformance
                .differential_type_for(types, target_primal_ty)
                .ok_or(TransposeError::MissingConformance { inst: g.target })?;
            let acc = store.accumulator_for(builder, types, conformance, first_rev_diff_block, g.target, target_primal_ty)?;
            let current = builder.load(acc, diff_ty);
            let summed = conformance
                .emit_add(builder, types, diff_ty, current, g.value)
                .ok_or(TransposeError::MissingConformance { inst: g.target })?;
            builder.store(acc, summed, void_ty);
        } else {
            builder.func_mut().propagate_name_hint(fwd_inst, g.value);
            store.add(g.target, g);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::function::Function;
    use crate::ir::inst::Inst;

    #[test]
    fn scalar_mul_propagates_a_single_partial_to_its_differential_operand() {
        let mut types = TypeTable::new();
        let scalar = types.insert(Type::Scalar);
        let mut f = Function::new("f");
        let fwd = f.entry;
        let rev = f.new_block();

        // `a` is a block parameter so the reverse walk (which only
        // visits `fwd`'s ordinary instructions) never consumes its
        // partial itself, letting the test observe it afterward.
        let a = f.add_param(fwd, Inst::new(Opcode::Param, vec![], scalar));
        f.inst_mut(a).decorations.push(Decoration::DifferentialInst { primal: a, primal_type: scalar });
        let b = f.append(fwd, Inst::new(Opcode::IntLit, vec![], scalar));
        let mul = f.append(fwd, Inst::new(Opcode::Mul, vec![a, b], scalar));

        let mut store = GradientStore::new();
        let seed = f.append(rev, Inst::new(Opcode::IntLit, vec![], scalar));
        store.add(mul, super::super::gradient_store::RevGradient::simple(mul, seed));

        let mut builder = Builder::new(&mut f, fwd);
        let mut conformance = ConformanceRegistry::new();
        let backward = FxHashMap::default();
        let mut phi_grads = PhiGradMap::default();
        transpose_block(&mut builder, &mut types, &mut conformance, &mut store, &backward, &mut phi_grads, rev, fwd, rev).unwrap();

        assert!(store.has_any(a));
        let partials = store.pop(a);
        assert_eq!(partials.len(), 1);
        let produced = builder.func().inst(partials[0].value);
        assert_eq!(produced.opcode, Opcode::Mul);
        assert_eq!(produced.operands, vec![b, seed]);
    }

    #[test]
    fn pointer_producing_instructions_are_re_emitted_at_the_reverse_blocks_head() {
        let mut types = TypeTable::new();
        let scalar = types.insert(Type::Scalar);
        let ptr_ty = types.insert(Type::Pointer { pointee: scalar });
        let void_ty = types.insert(Type::Void);
        let mut f = Function::new("f");
        let fwd = f.entry;
        let rev = f.new_block();

        let ptr = f.append(fwd, Inst::new(Opcode::Var, vec![], ptr_ty));
        let v = f.append(fwd, Inst::new(Opcode::IntLit, vec![], scalar));
        let store_inst = f.append(fwd, Inst::new(Opcode::Store, vec![ptr, v], void_ty));

        let mut store = GradientStore::new();
        let seed = f.append(rev, Inst::new(Opcode::IntLit, vec![], scalar));
        store.add(store_inst, super::super::gradient_store::RevGradient::simple(store_inst, seed));
        let mut builder = Builder::new(&mut f, fwd);
        let mut conformance = ConformanceRegistry::new();
        let backward = FxHashMap::default();
        let mut phi_grads = PhiGradMap::default();
        transpose_block(&mut builder, &mut types, &mut conformance, &mut store, &backward, &mut phi_grads, rev, fwd, rev).unwrap();

        let rev_insts = &builder.func().block(rev).insts;
        assert_eq!(builder.func().inst(rev_insts[0]).opcode, Opcode::Var);
        assert!(store.has_any(v));
    }
}
