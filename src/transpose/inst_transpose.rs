// SPDX-License-Identifier: EPL-2.0 OR GPL-2.0-or-later
// SPDX-FileCopyrightText: Bradley M. Bell <bradbell@seanet.com>
// SPDX-FileContributor: 2025-26 Bradley M. Bell
//
//! §4.3: the per-instruction transposer. One opcode-dispatch rule per
//! row of the transposition table, producing the partial adjoints a
//! forward instruction contributes to its operands. Grounded on
//! `slang-ir-autodiff-transpose.h`'s `transpose(IRBuilder*, IRInst*,
//! IRInst*)` dispatch and, for arithmetic, `op/binary_op.rs`'s
//! per-opcode derivative table.
//!
//! Link to [parent module](super)

use rustc_hash::FxHashMap;

use crate::conformance::ConformanceRegistry;
use crate::error::{Result, TransposeError};
use crate::ir::builder::Builder;
use crate::ir::decoration::Decoration;
use crate::ir::ids::{FuncId, InstId, TypeId};
use crate::ir::inst::{InstExtra, Opcode};
use crate::ir::types::{Type, TypeTable};

use super::gradient_store::RevGradient;

/// `transpose(fwdInst, revValue)` (§4.3): given a forward instruction
/// and the materialized adjoint flowing back into it, returns the
/// partial adjoints it contributes to its own operands. Instructions
/// with no operands worth differentiating (literals, params) return no
/// partials.
pub fn transpose_inst(
    builder: &mut Builder,
    types: &mut TypeTable,
    conformance: &mut ConformanceRegistry,
    backward_entries: &FxHashMap<FuncId, FuncId>,
    fwd_inst: InstId,
    rev_value: InstId,
) -> Result<Vec<RevGradient>> {
    let opcode = builder.func().inst(fwd_inst).opcode;
    match opcode {
        Opcode::Param | Opcode::IntLit | Opcode::FloatLit => Ok(Vec::new()),

        Opcode::Add => transpose_add(builder, types, fwd_inst, rev_value),
        Opcode::Sub => transpose_sub(builder, types, fwd_inst, rev_value),
        Opcode::Mul => transpose_mul(builder, types, fwd_inst, rev_value),
        Opcode::Neg => transpose_neg(builder, fwd_inst, rev_value),

        Opcode::Swizzle => {
            let base = builder.func().operand(fwd_inst, 0);
            Ok(vec![RevGradient::with_origin(base, rev_value, fwd_inst, super::gradient_store::Flavor::Swizzle)])
        }
        Opcode::FieldExtract => {
            let base = builder.func().operand(fwd_inst, 0);
            Ok(vec![RevGradient::with_origin(base, rev_value, fwd_inst, super::gradient_store::Flavor::FieldExtract)])
        }
        Opcode::GetElement => {
            let base = builder.func().operand(fwd_inst, 0);
            Ok(vec![RevGradient::with_origin(base, rev_value, fwd_inst, super::gradient_store::Flavor::GetElement)])
        }

        Opcode::MakeVector => transpose_make_vector(builder, types, fwd_inst, rev_value),
        Opcode::MakeVectorFromScalar => transpose_make_vector_from_scalar(builder, types, fwd_inst, rev_value),
        Opcode::MakeMatrix => transpose_make_matrix(builder, types, fwd_inst, rev_value),
        Opcode::MakeMatrixFromScalar => transpose_make_matrix_from_scalar(builder, types, fwd_inst, rev_value),
        Opcode::MatrixReshape => transpose_matrix_reshape(builder, types, conformance, fwd_inst, rev_value),
        Opcode::MakeStruct => transpose_make_struct(builder, types, fwd_inst, rev_value),
        Opcode::MakeArray => transpose_make_array(builder, types, fwd_inst, rev_value),
        Opcode::MakeArrayFromElement => transpose_make_array_from_element(builder, types, fwd_inst, rev_value),
        Opcode::UpdateElement => transpose_update_element(builder, types, conformance, fwd_inst, rev_value),

        Opcode::MakeDifferentialPair => {
            let diff_operand = builder.func().operand(fwd_inst, 1);
            Ok(vec![RevGradient::simple(diff_operand, rev_value)])
        }
        Opcode::DifferentialPairGetDifferential => {
            let pair = builder.func().operand(fwd_inst, 0);
            Ok(vec![RevGradient::with_origin(
                pair,
                rev_value,
                fwd_inst,
                super::gradient_store::Flavor::GetDifferential,
            )])
        }

        Opcode::Load => transpose_load(builder, types, conformance, fwd_inst, rev_value),
        Opcode::Store => transpose_store(builder, fwd_inst),

        Opcode::Var | Opcode::FieldAddress | Opcode::ElementAddress => Ok(Vec::new()),

        Opcode::Call => transpose_call_opaque(builder, fwd_inst),
        Opcode::ForwardDifferentiateCall => {
            transpose_call(builder, types, conformance, backward_entries, fwd_inst, rev_value)
        }

        Opcode::Return | Opcode::Branch | Opcode::If | Opcode::Loop | Opcode::Switch => {
            Err(TransposeError::UnhandledInstruction { opcode, inst: fwd_inst })
        }
    }
}

/// Broadens `operand`'s value to `target_ty` when its own type differs
/// (scalar splat to vector/matrix), inheriting the differential mark so
/// the broadened value can still receive attribution (§4.3 "Operand
/// promotion").
fn promote_operand(builder: &mut Builder, types: &mut TypeTable, operand: InstId, target_ty: TypeId) -> Result<InstId> {
    let operand_ty = builder.func().data_type(operand);
    if operand_ty == target_ty {
        return Ok(operand);
    }
    match (types.get(operand_ty).clone(), types.get(target_ty).clone()) {
        (Type::Scalar, Type::Vector { .. }) => Ok(builder.make_vector_from_scalar(operand, target_ty)),
        (Type::Scalar, Type::Matrix { .. }) => Ok(builder.make_matrix_from_scalar(operand, target_ty)),
        _ => Err(TransposeError::UnhandledPromotionTarget { inst: operand }),
    }
}

fn transpose_add(builder: &mut Builder, types: &mut TypeTable, fwd_inst: InstId, rev_value: InstId) -> Result<Vec<RevGradient>> {
    let result_ty = builder.func().data_type(fwd_inst);
    let a = builder.func().operand(fwd_inst, 0);
    let b = builder.func().operand(fwd_inst, 1);
    let pa = promote_operand(builder, types, a, result_ty)?;
    let pb = promote_operand(builder, types, b, result_ty)?;
    Ok(vec![RevGradient::simple(pa, rev_value), RevGradient::simple(pb, rev_value)])
}

fn transpose_sub(builder: &mut Builder, types: &mut TypeTable, fwd_inst: InstId, rev_value: InstId) -> Result<Vec<RevGradient>> {
    let result_ty = builder.func().data_type(fwd_inst);
    let a = builder.func().operand(fwd_inst, 0);
    let b = builder.func().operand(fwd_inst, 1);
    let pa = promote_operand(builder, types, a, result_ty)?;
    let pb = promote_operand(builder, types, b, result_ty)?;
    let neg = builder.negate(rev_value, result_ty);
    Ok(vec![RevGradient::simple(pa, rev_value), RevGradient::simple(pb, neg)])
}

fn transpose_mul(builder: &mut Builder, types: &mut TypeTable, fwd_inst: InstId, rev_value: InstId) -> Result<Vec<RevGradient>> {
    let result_ty = builder.func().data_type(fwd_inst);
    let a = builder.func().operand(fwd_inst, 0);
    let b = builder.func().operand(fwd_inst, 1);
    let a_diff = builder.func().inst(a).is_differential();
    let b_diff = builder.func().inst(b).is_differential();
    match (a_diff, b_diff) {
        (true, false) => {
            let pb = promote_operand(builder, types, b, result_ty)?;
            let partial = builder.mul(pb, rev_value, result_ty);
            Ok(vec![RevGradient::simple(a, partial)])
        }
        (false, true) => {
            let pa = promote_operand(builder, types, a, result_ty)?;
            let partial = builder.mul(pa, rev_value, result_ty);
            Ok(vec![RevGradient::simple(b, partial)])
        }
        _ => Err(TransposeError::UnhandledArithmetic { opcode: Opcode::Mul, inst: fwd_inst }),
    }
}

fn transpose_neg(builder: &mut Builder, fwd_inst: InstId, rev_value: InstId) -> Result<Vec<RevGradient>> {
    let result_ty = builder.func().data_type(fwd_inst);
    let a = builder.func().operand(fwd_inst, 0);
    let neg = builder.negate(rev_value, result_ty);
    Ok(vec![RevGradient::simple(a, neg)])
}

fn transpose_make_vector(builder: &mut Builder, types: &mut TypeTable, fwd_inst: InstId, rev_value: InstId) -> Result<Vec<RevGradient>> {
    let scalar_ty = types.insert(Type::Scalar);
    let operands = builder.func().inst(fwd_inst).operands.clone();
    let mut out = Vec::with_capacity(operands.len());
    for (i, operand) in operands.into_iter().enumerate() {
        let idx = builder.int_lit(i as i64, scalar_ty);
        let component = builder.element_extract(rev_value, idx, scalar_ty);
        out.push(RevGradient::simple(operand, component));
    }
    Ok(out)
}

fn transpose_make_vector_from_scalar(
    builder: &mut Builder,
    types: &mut TypeTable,
    fwd_inst: InstId,
    rev_value: InstId,
) -> Result<Vec<RevGradient>> {
    let result_ty = builder.func().data_type(fwd_inst);
    let len = match types.get(result_ty) {
        Type::Vector { len } => *len,
        other => panic!("MakeVectorFromScalar result is not a vector type, found {other:?}"),
    };
    let scalar = builder.func().operand(fwd_inst, 0);
    let scalar_ty = types.insert(Type::Scalar);
    let mut out = Vec::with_capacity(len as usize);
    for i in 0..len {
        let idx = builder.int_lit(i as i64, scalar_ty);
        let component = builder.element_extract(rev_value, idx, scalar_ty);
        out.push(RevGradient::simple(scalar, component));
    }
    Ok(out)
}

fn transpose_make_matrix(builder: &mut Builder, types: &mut TypeTable, fwd_inst: InstId, rev_value: InstId) -> Result<Vec<RevGradient>> {
    let result_ty = builder.func().data_type(fwd_inst);
    let cols = match types.get(result_ty) {
        Type::Matrix { cols, .. } => *cols,
        other => panic!("MakeMatrix result is not a matrix type, found {other:?}"),
    };
    let row_ty = types.insert(Type::Vector { len: cols });
    let index_ty = types.insert(Type::Scalar);
    let operands = builder.func().inst(fwd_inst).operands.clone();
    let mut out = Vec::with_capacity(operands.len());
    for (i, operand) in operands.into_iter().enumerate() {
        let idx = builder.int_lit(i as i64, index_ty);
        let row = builder.element_extract(rev_value, idx, row_ty);
        out.push(RevGradient::simple(operand, row));
    }
    Ok(out)
}

fn transpose_make_matrix_from_scalar(
    builder: &mut Builder,
    types: &mut TypeTable,
    fwd_inst: InstId,
    rev_value: InstId,
) -> Result<Vec<RevGradient>> {
    let result_ty = builder.func().data_type(fwd_inst);
    let (rows, cols) = match types.get(result_ty) {
        Type::Matrix { rows, cols } => (*rows, *cols),
        other => panic!("MakeMatrixFromScalar result is not a matrix type, found {other:?}"),
    };
    let scalar = builder.func().operand(fwd_inst, 0);
    let scalar_ty = types.insert(Type::Scalar);
    let row_ty = types.insert(Type::Vector { len: cols });
    let mut out = Vec::with_capacity((rows * cols) as usize);
    for r in 0..rows {
        let ridx = builder.int_lit(r as i64, scalar_ty);
        let row = builder.element_extract(rev_value, ridx, row_ty);
        for c in 0..cols {
            let cidx = builder.int_lit(c as i64, scalar_ty);
            let component = builder.element_extract(row, cidx, scalar_ty);
            out.push(RevGradient::simple(scalar, component));
        }
    }
    Ok(out)
}

/// Reshape's reverse takes `rev_value`'s overlapping block with the
/// source shape, truncating or zero-padding columns, and rebuilds a
/// matrix of the source shape (§4.3 "MatrixReshape").
fn transpose_matrix_reshape(
    builder: &mut Builder,
    types: &mut TypeTable,
    conformance: &mut ConformanceRegistry,
    fwd_inst: InstId,
    rev_value: InstId,
) -> Result<Vec<RevGradient>> {
    let source = builder.func().operand(fwd_inst, 0);
    let source_ty = builder.func().data_type(source);
    let result_ty = builder.func().data_type(fwd_inst);
    let (srows, scols) = match types.get(source_ty) {
        Type::Matrix { rows, cols } => (*rows, *cols),
        other => panic!("MatrixReshape source is not a matrix type, found {other:?}"),
    };
    let (rrows, rcols) = match types.get(result_ty) {
        Type::Matrix { rows, cols } => (*rows, *cols),
        other => panic!("MatrixReshape result is not a matrix type, found {other:?}"),
    };
    let result_row_ty = types.insert(Type::Vector { len: rcols });
    let scalar_ty = types.insert(Type::Scalar);
    let source_row_ty = types.insert(Type::Vector { len: scols });
    let zero_row = conformance
        .emit_zero(builder, types, source_row_ty)
        .ok_or(TransposeError::MissingConformance { inst: fwd_inst })?;

    let overlap_rows = srows.min(rrows);
    let overlap_cols = scols.min(rcols);

    let mut rows = Vec::with_capacity(srows as usize);
    for r in 0..srows {
        if r < overlap_rows {
            let idx = builder.int_lit(r as i64, scalar_ty);
            let src_row = builder.element_extract(rev_value, idx, result_row_ty);
            let indices: Vec<u32> = (0..overlap_cols).collect();
            let truncated_ty = types.insert(Type::Vector { len: overlap_cols });
            let truncated = builder.swizzle(src_row, indices, truncated_ty);
            if overlap_cols == scols {
                rows.push(truncated);
            } else {
                let mut components = Vec::with_capacity(scols as usize);
                for c in 0..overlap_cols {
                    let cidx = builder.int_lit(c as i64, scalar_ty);
                    components.push(builder.element_extract(truncated, cidx, scalar_ty));
                }
                let zero_scalar = conformance
                    .emit_zero(builder, types, scalar_ty)
                    .ok_or(TransposeError::MissingConformance { inst: fwd_inst })?;
                for _ in overlap_cols..scols {
                    components.push(zero_scalar);
                }
                rows.push(builder.make_vector(components, types.insert(Type::Vector { len: scols })));
            }
        } else {
            rows.push(zero_row);
        }
    }
    let rebuilt = builder.make_matrix(rows, source_ty);
    Ok(vec![RevGradient::simple(source, rebuilt)])
}

fn transpose_make_struct(builder: &mut Builder, types: &mut TypeTable, fwd_inst: InstId, rev_value: InstId) -> Result<Vec<RevGradient>> {
    let result_ty = builder.func().data_type(fwd_inst);
    let fields = match types.get(result_ty) {
        Type::Struct { fields } => fields.clone(),
        other => panic!("MakeStruct result is not a struct type, found {other:?}"),
    };
    let operands = builder.func().inst(fwd_inst).operands.clone();
    let mut out = Vec::with_capacity(operands.len());
    for ((key, field_ty), operand) in fields.into_iter().zip(operands) {
        let extracted = builder.field_extract(rev_value, key, field_ty);
        out.push(RevGradient::simple(operand, extracted));
    }
    Ok(out)
}

fn transpose_make_array(builder: &mut Builder, types: &mut TypeTable, fwd_inst: InstId, rev_value: InstId) -> Result<Vec<RevGradient>> {
    let result_ty = builder.func().data_type(fwd_inst);
    let elem_ty = match types.get(result_ty) {
        Type::Array { elem, .. } => *elem,
        other => panic!("MakeArray result is not an array type, found {other:?}"),
    };
    let index_ty = types.insert(Type::Scalar);
    let operands = builder.func().inst(fwd_inst).operands.clone();
    let mut out = Vec::with_capacity(operands.len());
    for (i, operand) in operands.into_iter().enumerate() {
        let idx = builder.int_lit(i as i64, index_ty);
        let extracted = builder.element_extract(rev_value, idx, elem_ty);
        out.push(RevGradient::simple(operand, extracted));
    }
    Ok(out)
}

fn transpose_make_array_from_element(
    builder: &mut Builder,
    types: &mut TypeTable,
    fwd_inst: InstId,
    rev_value: InstId,
) -> Result<Vec<RevGradient>> {
    let result_ty = builder.func().data_type(fwd_inst);
    let (elem_ty, len) = match types.get(result_ty) {
        Type::Array { elem, len } => (*elem, *len),
        other => panic!("MakeArrayFromElement result is not an array type, found {other:?}"),
    };
    let elem = builder.func().operand(fwd_inst, 0);
    let index_ty = types.insert(Type::Scalar);
    let mut out = Vec::with_capacity(len as usize);
    for i in 0..len {
        let idx = builder.int_lit(i as i64, index_ty);
        let extracted = builder.element_extract(rev_value, idx, elem_ty);
        out.push(RevGradient::simple(elem, extracted));
    }
    Ok(out)
}

fn chain_elem_type(types: &TypeTable, base_ty: TypeId, chain: &[u32]) -> TypeId {
    let mut ty = base_ty;
    for _ in chain {
        ty = match types.get(ty) {
            Type::Array { elem, .. } => *elem,
            other => panic!("UpdateElement chain walks off a non-array type, found {other:?}"),
        };
    }
    ty
}

fn extract_chain(builder: &mut Builder, types: &mut TypeTable, base: InstId, base_ty: TypeId, chain: &[u32]) -> InstId {
    let index_ty = types.insert(Type::Scalar);
    let mut cur = base;
    let mut cur_ty = base_ty;
    for &idx in chain {
        let elem_ty = match types.get(cur_ty) {
            Type::Array { elem, .. } => *elem,
            other => panic!("UpdateElement chain walks off a non-array type, found {other:?}"),
        };
        let idx_lit = builder.int_lit(idx as i64, index_ty);
        cur = builder.element_extract(cur, idx_lit, elem_ty);
        cur_ty = elem_ty;
    }
    cur
}

/// `v` gets the value at `chain` in `rev_value`; `arr` gets `rev_value`
/// with that position zeroed, so the adjoint does not double-flow
/// through the position the forward pass overwrote (§4.3
/// "UpdateElement").
fn transpose_update_element(
    builder: &mut Builder,
    types: &mut TypeTable,
    conformance: &mut ConformanceRegistry,
    fwd_inst: InstId,
    rev_value: InstId,
) -> Result<Vec<RevGradient>> {
    let result_ty = builder.func().data_type(fwd_inst);
    let arr = builder.func().operand(fwd_inst, 0);
    let v = builder.func().operand(fwd_inst, 1);
    let chain = match &builder.func().inst(fwd_inst).extra {
        InstExtra::Indices(v) => v.clone(),
        other => panic!("UpdateElement has no index chain, found {other:?}"),
    };
    let elem_ty = chain_elem_type(types, result_ty, &chain);
    let extracted = extract_chain(builder, types, rev_value, result_ty, &chain);
    let zero_elem = conformance
        .emit_zero(builder, types, elem_ty)
        .ok_or(TransposeError::MissingConformance { inst: fwd_inst })?;
    let zeroed_arr = builder.update_element(rev_value, chain, zero_elem, result_ty);
    Ok(vec![RevGradient::simple(v, extracted), RevGradient::simple(arr, zeroed_arr)])
}

/// Reads the current contents of `ptr`, adds `rev_value` to it, and
/// stores the sum back, so that any number of `Load`s of the same
/// pointer accumulate correctly regardless of visitation order (§4.3
/// "Load").
fn transpose_load(
    builder: &mut Builder,
    types: &mut TypeTable,
    conformance: &mut ConformanceRegistry,
    fwd_inst: InstId,
    rev_value: InstId,
) -> Result<Vec<RevGradient>> {
    let value_ty = builder.func().data_type(fwd_inst);
    let ptr = builder.func().operand(fwd_inst, 0);
    let current = builder.load(ptr, value_ty);
    let summed = conformance
        .emit_add(builder, types, value_ty, current, rev_value)
        .ok_or(TransposeError::MissingConformance { inst: fwd_inst })?;
    let void_ty = types.insert(Type::Void);
    builder.store(ptr, summed, void_ty);
    Ok(Vec::new())
}

/// `Store(ptr, v)` is reversed by reading `ptr`'s current adjoint and
/// attributing it to `v` (§4.3 "Store").
fn transpose_store(builder: &mut Builder, fwd_inst: InstId) -> Result<Vec<RevGradient>> {
    let ptr = builder.func().operand(fwd_inst, 0);
    let v = builder.func().operand(fwd_inst, 1);
    let v_ty = builder.func().data_type(v);
    let loaded = builder.load(ptr, v_ty);
    Ok(vec![RevGradient::simple(v, loaded)])
}

/// An ordinary `Call` reached by the walk only if something downstream
/// attributed a partial to it; with no differentiable arguments there
/// is nothing to propagate, otherwise this pass does not know how to
/// route the adjoint into an opaque callee (§1 Non-goals).
fn transpose_call_opaque(builder: &mut Builder, fwd_inst: InstId) -> Result<Vec<RevGradient>> {
    let inst = builder.func().inst(fwd_inst);
    if inst.operands.is_empty() {
        return Ok(Vec::new());
    }
    let callee = match inst.extra {
        InstExtra::Callee(f) => f,
        _ => unreachable!("Call always carries InstExtra::Callee"),
    };
    Err(TransposeError::UnsupportedCallArguments { callee, inst: fwd_inst })
}

/// Call transposition (§4.3 "Call"): seed an out-parameter slot per
/// differential-pair argument (primal preserved, tangent zeroed),
/// append the aggregated adjoint and the primal replay context, invoke
/// the registered backward entry, then read each slot's tangent back
/// out as the corresponding argument's partial.
fn transpose_call(
    builder: &mut Builder,
    types: &mut TypeTable,
    conformance: &mut ConformanceRegistry,
    backward_entries: &FxHashMap<FuncId, FuncId>,
    fwd_inst: InstId,
    rev_value: InstId,
) -> Result<Vec<RevGradient>> {
    let (callee, arg_ids) = {
        let inst = builder.func().inst(fwd_inst);
        let callee = match inst.extra {
            InstExtra::Callee(f) => f,
            _ => unreachable!("ForwardDifferentiateCall always carries InstExtra::Callee"),
        };
        (callee, inst.operands.clone())
    };
    let backward = backward_entries
        .get(&callee)
        .copied()
        .ok_or(TransposeError::MissingBackwardEntry { callee, inst: fwd_inst })?;
    let primal_ctx = builder
        .func()
        .inst(fwd_inst)
        .find_decoration(|d| matches!(d, Decoration::BackwardDerivativePrimalContext(_)))
        .map(|d| match d {
            Decoration::BackwardDerivativePrimalContext(ptr) => *ptr,
            _ => unreachable!(),
        })
        .ok_or(TransposeError::UnhandledInstruction { opcode: Opcode::ForwardDifferentiateCall, inst: fwd_inst })?;

    let void_ty = types.insert(Type::Void);
    let mut call_args = Vec::with_capacity(arg_ids.len() + 2);
    let mut pair_slots: Vec<(InstId, InstId, TypeId)> = Vec::new();

    for &arg in &arg_ids {
        let arg_ty = builder.func().data_type(arg);
        if let Type::DifferentialPair { primal: primal_ty } = types.get(arg_ty).clone() {
            let primal_component = match builder.func().inst(arg).opcode {
                Opcode::MakeDifferentialPair => builder.func().inst(arg).operands[0],
                _ => arg,
            };
            let diff_ty = conformance
                .differential_type_for(types, primal_ty)
                .ok_or(TransposeError::MissingConformance { inst: arg })?;
            let zero_diff = conformance
                .emit_zero(builder, types, diff_ty)
                .ok_or(TransposeError::MissingConformance { inst: arg })?;
            let seeded_pair = builder.make_pair(primal_component, zero_diff, arg_ty);
            let slot_ty = types.insert(Type::Pointer { pointee: arg_ty });
            let slot = builder.emit_var(slot_ty);
            builder.store(slot, seeded_pair, void_ty);
            call_args.push(slot);
            pair_slots.push((arg, slot, arg_ty));
        } else {
            call_args.push(arg);
        }
    }
    call_args.push(rev_value);
    call_args.push(primal_ctx);
    builder.call(backward, call_args, void_ty);

    let mut partials = Vec::with_capacity(pair_slots.len());
    for (orig_arg, slot, pair_ty) in pair_slots {
        let primal_ty = match types.get(pair_ty) {
            Type::DifferentialPair { primal } => *primal,
            _ => unreachable!(),
        };
        let diff_ty = conformance
            .differential_type_for(types, primal_ty)
            .ok_or(TransposeError::MissingConformance { inst: orig_arg })?;
        let loaded_pair = builder.load(slot, pair_ty);
        let diff_value = builder.get_differential(loaded_pair, diff_ty);
        partials.push(RevGradient::simple(orig_arg, diff_value));
    }
    Ok(partials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::function::Function;
    use crate::ir::inst::Inst;

    fn mark_differential(f: &mut Function, inst: InstId, primal: InstId, primal_type: TypeId) {
        f.inst_mut(inst).decorations.push(Decoration::DifferentialInst { primal, primal_type });
    }

    #[test]
    fn add_attributes_rev_value_to_both_operands() {
        let mut types = TypeTable::new();
        let scalar = types.insert(Type::Scalar);
        let mut f = Function::new("f");
        let entry = f.entry;
        let a = f.append(entry, Inst::new(Opcode::IntLit, vec![], scalar));
        let b = f.append(entry, Inst::new(Opcode::IntLit, vec![], scalar));
        let add = f.append(entry, Inst::new(Opcode::Add, vec![a, b], scalar));
        let rev = f.append(entry, Inst::new(Opcode::IntLit, vec![], scalar));
        let mut builder = Builder::new(&mut f, entry);
        let mut conformance = ConformanceRegistry::new();
        let backward = FxHashMap::default();
        let partials = transpose_inst(&mut builder, &mut types, &mut conformance, &backward, add, rev).unwrap();
        assert_eq!(partials.len(), 2);
        assert_eq!(partials[0].target, a);
        assert_eq!(partials[0].value, rev);
        assert_eq!(partials[1].target, b);
        assert_eq!(partials[1].value, rev);
    }

    #[test]
    fn sub_negates_the_second_operands_partial() {
        let mut types = TypeTable::new();
        let scalar = types.insert(Type::Scalar);
        let mut f = Function::new("f");
        let entry = f.entry;
        let a = f.append(entry, Inst::new(Opcode::IntLit, vec![], scalar));
        let b = f.append(entry, Inst::new(Opcode::IntLit, vec![], scalar));
        let sub = f.append(entry, Inst::new(Opcode::Sub, vec![a, b], scalar));
        let rev = f.append(entry, Inst::new(Opcode::IntLit, vec![], scalar));
        let mut builder = Builder::new(&mut f, entry);
        let mut conformance = ConformanceRegistry::new();
        let backward = FxHashMap::default();
        let partials = transpose_inst(&mut builder, &mut types, &mut conformance, &backward, sub, rev).unwrap();
        assert_eq!(partials[0].value, rev);
        assert_eq!(builder.func().inst(partials[1].value).opcode, Opcode::Neg);
    }

    #[test]
    fn mul_with_two_differential_operands_errors() {
        let mut types = TypeTable::new();
        let scalar = types.insert(Type::Scalar);
        let mut f = Function::new("f");
        let entry = f.entry;
        let a = f.append(entry, Inst::new(Opcode::IntLit, vec![], scalar));
        let b = f.append(entry, Inst::new(Opcode::IntLit, vec![], scalar));
        mark_differential(&mut f, a, a, scalar);
        mark_differential(&mut f, b, b, scalar);
        let mul = f.append(entry, Inst::new(Opcode::Mul, vec![a, b], scalar));
        let rev = f.append(entry, Inst::new(Opcode::IntLit, vec![], scalar));
        let mut builder = Builder::new(&mut f, entry);
        let mut conformance = ConformanceRegistry::new();
        let backward = FxHashMap::default();
        let err = transpose_inst(&mut builder, &mut types, &mut conformance, &backward, mul, rev).unwrap_err();
        assert_eq!(err, TransposeError::UnhandledArithmetic { opcode: Opcode::Mul, inst: mul });
    }

    #[test]
    fn mul_with_one_differential_operand_multiplies_by_the_other() {
        let mut types = TypeTable::new();
        let scalar = types.insert(Type::Scalar);
        let mut f = Function::new("f");
        let entry = f.entry;
        let a = f.append(entry, Inst::new(Opcode::IntLit, vec![], scalar));
        let b = f.append(entry, Inst::new(Opcode::IntLit, vec![], scalar));
        mark_differential(&mut f, a, a, scalar);
        let mul = f.append(entry, Inst::new(Opcode::Mul, vec![a, b], scalar));
        let rev = f.append(entry, Inst::new(Opcode::IntLit, vec![], scalar));
        let mut builder = Builder::new(&mut f, entry);
        let mut conformance = ConformanceRegistry::new();
        let backward = FxHashMap::default();
        let partials = transpose_inst(&mut builder, &mut types, &mut conformance, &backward, mul, rev).unwrap();
        assert_eq!(partials.len(), 1);
        assert_eq!(partials[0].target, a);
        let produced = builder.func().inst(partials[0].value);
        assert_eq!(produced.opcode, Opcode::Mul);
        assert_eq!(produced.operands, vec![b, rev]);
    }

    #[test]
    fn make_struct_distributes_field_extracts_per_operand() {
        let mut types = TypeTable::new();
        let scalar = types.insert(Type::Scalar);
        let s = types.insert(Type::Struct { fields: vec![("x", scalar), ("y", scalar)] });
        let mut f = Function::new("f");
        let entry = f.entry;
        let x = f.append(entry, Inst::new(Opcode::IntLit, vec![], scalar));
        let y = f.append(entry, Inst::new(Opcode::IntLit, vec![], scalar));
        let make = f.append(entry, Inst::new(Opcode::MakeStruct, vec![x, y], s));
        let rev = f.append(entry, Inst::new(Opcode::IntLit, vec![], s));
        let mut builder = Builder::new(&mut f, entry);
        let mut conformance = ConformanceRegistry::new();
        let backward = FxHashMap::default();
        let partials = transpose_inst(&mut builder, &mut types, &mut conformance, &backward, make, rev).unwrap();
        assert_eq!(partials[0].target, x);
        assert_eq!(partials[1].target, y);
        assert_eq!(builder.func().inst(partials[0].value).opcode, Opcode::FieldExtract);
    }

    #[test]
    fn load_reads_adds_and_stores_back_into_the_pointer() {
        let mut types = TypeTable::new();
        let scalar = types.insert(Type::Scalar);
        let ptr_ty = types.insert(Type::Pointer { pointee: scalar });
        let mut f = Function::new("f");
        let entry = f.entry;
        let ptr = f.append(entry, Inst::new(Opcode::Var, vec![], ptr_ty));
        let load = f.append(entry, Inst::new(Opcode::Load, vec![ptr], scalar));
        let rev = f.append(entry, Inst::new(Opcode::IntLit, vec![], scalar));
        let mut builder = Builder::new(&mut f, entry);
        let mut conformance = ConformanceRegistry::new();
        let backward = FxHashMap::default();
        let partials = transpose_inst(&mut builder, &mut types, &mut conformance, &backward, load, rev).unwrap();
        assert!(partials.is_empty());
        let insts = &builder.func().block(entry).insts;
        let last_three = &insts[insts.len() - 3..];
        assert_eq!(builder.func().inst(last_three[0]).opcode, Opcode::Load);
        assert_eq!(builder.func().inst(last_three[1]).opcode, Opcode::Add);
        assert_eq!(builder.func().inst(last_three[2]).opcode, Opcode::Store);
    }

    #[test]
    fn store_attributes_a_load_of_the_pointer_to_the_stored_value() {
        let mut types = TypeTable::new();
        let scalar = types.insert(Type::Scalar);
        let ptr_ty = types.insert(Type::Pointer { pointee: scalar });
        let void_ty = types.insert(Type::Void);
        let mut f = Function::new("f");
        let entry = f.entry;
        let ptr = f.append(entry, Inst::new(Opcode::Var, vec![], ptr_ty));
        let v = f.append(entry, Inst::new(Opcode::IntLit, vec![], scalar));
        let store = f.append(entry, Inst::new(Opcode::Store, vec![ptr, v], void_ty));
        let mut builder = Builder::new(&mut f, entry);
        let mut conformance = ConformanceRegistry::new();
        let backward = FxHashMap::default();
        let partials = transpose_inst(&mut builder, &mut types, &mut conformance, &backward, store, InstId(0)).unwrap();
        assert_eq!(partials.len(), 1);
        assert_eq!(partials[0].target, v);
        assert_eq!(builder.func().inst(partials[0].value).opcode, Opcode::Load);
    }
}
