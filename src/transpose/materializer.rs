// SPDX-License-Identifier: EPL-2.0 OR GPL-2.0-or-later
// SPDX-FileCopyrightText: Bradley M. Bell <bradbell@seanet.com>
// SPDX-FileContributor: 2025-26 Bradley M. Bell
//
//! §4.2: the adjoint materializer. Scatter-then-load for aggregate
//! destructors, then a left-to-right `add` fold. Grounded directly on
//! `slang-ir-autodiff-transpose.h`'s `emitAggregateValue` /
//! `materializeGradientSet`.
//!
//! Link to [parent module](super)

use crate::conformance::ConformanceRegistry;
use crate::error::{Result, TransposeError};
use crate::ir::builder::Builder;
use crate::ir::ids::{InstId, TypeId};
use crate::ir::inst::InstExtra;
use crate::ir::types::{FieldKey, Type, TypeTable};

use super::gradient_store::{Flavor, RevGradient};

/// `emitAggregate(primalType, gradients)` (§4.2): folds `gradients`,
/// all attributed to `target`, into a single value of `target`'s
/// primal type's differential type. Returns `None` when there are no
/// gradients and no differential type exists for `primal_type`
/// ("absent value" case).
pub fn emit_aggregate(
    builder: &mut Builder,
    types: &mut TypeTable,
    conformance: &mut ConformanceRegistry,
    target: InstId,
    primal_type: TypeId,
    gradients: Vec<RevGradient>,
) -> Result<Option<InstId>> {
    if types.get(primal_type).is_differential_pair() {
        return Err(TransposeError::AggregateOfDifferentialPair);
    }

    let mut sorted = gradients;
    sorted.sort_by_key(flavor_rank);

    let mut simples: Vec<InstId> = Vec::new();
    let mut i = 0;
    while i < sorted.len() {
        let flavor = sorted[i].flavor;
        let mut j = i + 1;
        while j < sorted.len() && sorted[j].flavor == flavor {
            j += 1;
        }
        let run = &sorted[i..j];
        let value = materialize_run(builder, types, conformance, target, primal_type, flavor, run)?;
        simples.push(value);
        i = j;
    }

    if simples.is_empty() {
        return Ok(conformance.emit_zero(builder, types, primal_type));
    }
    fold_add(builder, types, conformance, target, primal_type, &simples).map(Some)
}

fn flavor_rank(g: &RevGradient) -> u8 {
    match g.flavor {
        Flavor::Simple => 0,
        Flavor::Swizzle => 1,
        Flavor::FieldExtract => 2,
        Flavor::GetElement => 3,
        Flavor::GetDifferential => 4,
    }
}

/// Left-to-right `add` reduction; returns the lone element unchanged
/// rather than emitting a trivial `add(x, zero)`.
fn fold_add(
    builder: &mut Builder,
    types: &mut TypeTable,
    conformance: &mut ConformanceRegistry,
    target: InstId,
    ty: TypeId,
    values: &[InstId],
) -> Result<InstId> {
    let mut acc = values[0];
    for &v in &values[1..] {
        acc = conformance
            .emit_add(builder, types, ty, acc, v)
            .ok_or(TransposeError::MissingConformance { inst: target })?;
    }
    Ok(acc)
}

fn materialize_run(
    builder: &mut Builder,
    types: &mut TypeTable,
    conformance: &mut ConformanceRegistry,
    target: InstId,
    primal_type: TypeId,
    flavor: Flavor,
    run: &[RevGradient],
) -> Result<InstId> {
    match flavor {
        Flavor::Simple | Flavor::GetDifferential => {
            let values: Vec<InstId> = run.iter().map(|g| g.value).collect();
            fold_add(builder, types, conformance, target, primal_type, &values)
        }
        Flavor::Swizzle => materialize_swizzle(builder, types, conformance, target, primal_type, run),
        Flavor::FieldExtract => materialize_field_extract(builder, types, conformance, target, primal_type, run),
        Flavor::GetElement => materialize_get_element(builder, types, conformance, target, primal_type, run),
    }
}

fn swizzle_indices(builder: &Builder, origin: InstId) -> Vec<u32> {
    match &builder.func().inst(origin).extra {
        InstExtra::Indices(v) => v.clone(),
        _ => panic!("Swizzle-flavored gradient's origin is not a Swizzle instruction"),
    }
}

/// Builds a vector whose components are zero except at the indices
/// named by each partial's forward `Swizzle`, then folds the
/// resulting vectors as `Simple` (§4.2 "Swizzle").
fn materialize_swizzle(
    builder: &mut Builder,
    types: &mut TypeTable,
    conformance: &mut ConformanceRegistry,
    target: InstId,
    primal_type: TypeId,
    run: &[RevGradient],
) -> Result<InstId> {
    let len = match types.get(primal_type) {
        Type::Vector { len } => *len,
        _ => panic!("Swizzle-flavored gradient's target is not a vector type"),
    };
    let scalar_ty = types.insert(Type::Scalar);
    let zero_scalar = conformance
        .emit_zero(builder, types, scalar_ty)
        .ok_or(TransposeError::MissingConformance { inst: target })?;

    let mut vectors = Vec::with_capacity(run.len());
    for g in run {
        let origin = g.origin.ok_or(TransposeError::MissingConformance { inst: target })?;
        let indices = swizzle_indices(builder, origin);
        let mut components = vec![zero_scalar; len as usize];
        for (slot, &dest) in indices.iter().enumerate() {
            let component = if indices.len() == 1 {
                g.value
            } else {
                let idx_lit = builder.int_lit(slot as i64, scalar_ty);
                builder.element_extract(g.value, idx_lit, scalar_ty)
            };
            components[dest as usize] = component;
        }
        vectors.push(builder.make_vector(components, primal_type));
    }
    fold_add(builder, types, conformance, target, primal_type, &vectors)
}

fn field_key(builder: &Builder, origin: InstId) -> FieldKey {
    match &builder.func().inst(origin).extra {
        InstExtra::Field(k) => k,
        _ => panic!("FieldExtract-flavored gradient's origin is not a FieldExtract instruction"),
    }
}

fn struct_field_type(types: &TypeTable, struct_ty: TypeId, key: FieldKey) -> TypeId {
    match types.get(struct_ty) {
        Type::Struct { fields } => fields
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, t)| *t)
            .unwrap_or_else(|| panic!("struct type has no field {key}")),
        other => panic!("expected a struct type, found {other:?}"),
    }
}

/// Scatters each bucket of field-keyed partials into a fresh
/// accumulator of the struct's differential type, then loads it
/// (§4.2 "FieldExtract").
fn materialize_field_extract(
    builder: &mut Builder,
    types: &mut TypeTable,
    conformance: &mut ConformanceRegistry,
    target: InstId,
    primal_type: TypeId,
    run: &[RevGradient],
) -> Result<InstId> {
    let diff_ty = conformance
        .differential_type_for(types, primal_type)
        .ok_or(TransposeError::MissingConformance { inst: target })?;
    let void_ty = types.insert(Type::Void);
    let pointer_ty = types.insert(Type::Pointer { pointee: diff_ty });
    let cell = builder.emit_var(pointer_ty);
    let zero = conformance
        .emit_zero(builder, types, diff_ty)
        .ok_or(TransposeError::MissingConformance { inst: target })?;
    builder.store(cell, zero, void_ty);

    let mut buckets: Vec<(FieldKey, Vec<InstId>)> = Vec::new();
    for g in run {
        let origin = g.origin.ok_or(TransposeError::MissingConformance { inst: target })?;
        let key = field_key(builder, origin);
        match buckets.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(g.value),
            None => buckets.push((key, vec![g.value])),
        }
    }
    for (key, values) in buckets {
        let field_ty = struct_field_type(types, diff_ty, key);
        let summed = fold_add(builder, types, conformance, target, field_ty, &values)?;
        let field_ptr_ty = types.insert(Type::Pointer { pointee: field_ty });
        let addr = builder.field_address(cell, key, field_ptr_ty);
        builder.store(addr, summed, void_ty);
    }
    Ok(builder.load(cell, diff_ty))
}

fn array_elem_type(types: &TypeTable, array_ty: TypeId) -> TypeId {
    match types.get(array_ty) {
        Type::Array { elem, .. } => *elem,
        other => panic!("expected an array type, found {other:?}"),
    }
}

/// As `FieldExtract`, but buckets by index-expression identity and
/// uses element-address stores (§4.2 "GetElement").
fn materialize_get_element(
    builder: &mut Builder,
    types: &mut TypeTable,
    conformance: &mut ConformanceRegistry,
    target: InstId,
    primal_type: TypeId,
    run: &[RevGradient],
) -> Result<InstId> {
    let diff_ty = conformance
        .differential_type_for(types, primal_type)
        .ok_or(TransposeError::MissingConformance { inst: target })?;
    let void_ty = types.insert(Type::Void);
    let pointer_ty = types.insert(Type::Pointer { pointee: diff_ty });
    let cell = builder.emit_var(pointer_ty);
    let zero = conformance
        .emit_zero(builder, types, diff_ty)
        .ok_or(TransposeError::MissingConformance { inst: target })?;
    builder.store(cell, zero, void_ty);

    let mut buckets: Vec<(InstId, Vec<InstId>)> = Vec::new();
    for g in run {
        let origin = g.origin.ok_or(TransposeError::MissingConformance { inst: target })?;
        let index = builder.func().inst(origin).operands[1];
        match buckets.iter_mut().find(|(idx, _)| *idx == index) {
            Some((_, values)) => values.push(g.value),
            None => buckets.push((index, vec![g.value])),
        }
    }
    let elem_ty = array_elem_type(types, diff_ty);
    for (index, values) in buckets {
        let summed = fold_add(builder, types, conformance, target, elem_ty, &values)?;
        let elem_ptr_ty = types.insert(Type::Pointer { pointee: elem_ty });
        let addr = builder.element_address(cell, index, elem_ptr_ty);
        builder.store(addr, summed, void_ty);
    }
    Ok(builder.load(cell, diff_ty))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::function::Function;
    use crate::ir::inst::{Inst, Opcode};

    fn scalar_fixture() -> (Function, TypeTable, TypeId) {
        let mut types = TypeTable::new();
        let scalar = types.insert(Type::Scalar);
        (Function::new("f"), types, scalar)
    }

    #[test]
    fn single_simple_gradient_passes_through_unchanged() {
        let (mut f, mut types, scalar) = scalar_fixture();
        let entry = f.entry;
        let target = f.append(entry, Inst::new(Opcode::IntLit, vec![], scalar));
        let g_value = f.append(entry, Inst::new(Opcode::IntLit, vec![], scalar));
        let mut builder = Builder::new(&mut f, entry);
        let mut conformance = ConformanceRegistry::new();
        let result = emit_aggregate(
            &mut builder,
            &mut types,
            &mut conformance,
            target,
            scalar,
            vec![RevGradient::simple(target, g_value)],
        )
        .unwrap();
        assert_eq!(result, Some(g_value));
    }

    #[test]
    fn empty_gradients_return_zero() {
        let (mut f, mut types, scalar) = scalar_fixture();
        let entry = f.entry;
        let target = f.append(entry, Inst::new(Opcode::IntLit, vec![], scalar));
        let mut builder = Builder::new(&mut f, entry);
        let mut conformance = ConformanceRegistry::new();
        let result = emit_aggregate(&mut builder, &mut types, &mut conformance, target, scalar, vec![]).unwrap();
        assert!(result.is_some());
        assert_eq!(builder.func().inst(result.unwrap()).opcode, Opcode::FloatLit);
    }

    #[test]
    fn two_simple_gradients_fold_with_add() {
        let (mut f, mut types, scalar) = scalar_fixture();
        let entry = f.entry;
        let target = f.append(entry, Inst::new(Opcode::IntLit, vec![], scalar));
        let a = f.append(entry, Inst::new(Opcode::IntLit, vec![], scalar));
        let b = f.append(entry, Inst::new(Opcode::IntLit, vec![], scalar));
        let mut builder = Builder::new(&mut f, entry);
        let mut conformance = ConformanceRegistry::new();
        let result = emit_aggregate(
            &mut builder,
            &mut types,
            &mut conformance,
            target,
            scalar,
            vec![RevGradient::simple(target, a), RevGradient::simple(target, b)],
        )
        .unwrap()
        .unwrap();
        let sum = builder.func().inst(result);
        assert_eq!(sum.opcode, Opcode::Add);
        assert_eq!(sum.operands, vec![a, b]);
    }

    #[test]
    fn swizzle_scatters_scalar_into_named_slot() {
        let mut types = TypeTable::new();
        let scalar = types.insert(Type::Scalar);
        let vec2 = types.insert(Type::Vector { len: 2 });
        let mut f = Function::new("f");
        let entry = f.entry;
        let base = f.append(entry, Inst::new(Opcode::IntLit, vec![], vec2));
        let mut swizzle_inst = Inst::new(Opcode::Swizzle, vec![base], scalar);
        swizzle_inst.extra = InstExtra::Indices(vec![1]);
        let origin = f.append(entry, swizzle_inst);
        let g_value = f.append(entry, Inst::new(Opcode::IntLit, vec![], scalar));
        let mut builder = Builder::new(&mut f, entry);
        let mut conformance = ConformanceRegistry::new();
        let result = emit_aggregate(
            &mut builder,
            &mut types,
            &mut conformance,
            base,
            vec2,
            vec![RevGradient::with_origin(base, g_value, origin, Flavor::Swizzle)],
        )
        .unwrap()
        .unwrap();
        let make = builder.func().inst(result);
        assert_eq!(make.opcode, Opcode::MakeVector);
        assert_eq!(make.operands[1], g_value);
    }
}
