// SPDX-License-Identifier: EPL-2.0 OR GPL-2.0-or-later
// SPDX-FileCopyrightText: Bradley M. Bell <bradbell@seanet.com>
// SPDX-FileContributor: 2025-26 Bradley M. Bell
//
//! The differentiable-type conformance collaborator (§11): for a
//! primal type, its differential type, its zero value, and its `add`
//! operation. Grounded on `op/info.rs`'s `OpInfo<V>` table-of-closures
//! idiom (here: a table of `fn` pointers keyed by `TypeId`, with a
//! recursive structural default for `Struct`/`Array` shapes so most
//! types never need explicit registration).

use rustc_hash::FxHashMap;

use crate::ir::builder::Builder;
use crate::ir::ids::{InstId, TypeId};
use crate::ir::types::{Type, TypeTable};

/// A zero-value synthesizer: emits `ty`'s zero as IR into the
/// function currently under the builder's cursor.
pub type ZeroFn = fn(&mut Builder, TypeId) -> InstId;
/// An `add` synthesizer: emits `a + b` at type `ty`.
pub type AddFn = fn(&mut Builder, TypeId, InstId, InstId) -> InstId;

/// In-process stand-in for the externally provided
/// `differentialTypeFor`/`zeroMethodFor`/`addMethodFor` collaborator
/// of §6. Explicit registrations take priority; otherwise `Scalar`/
/// `Vector`/`Matrix` are their own differential type and recurse
/// structurally into `Struct`/`Array`. `Pointer`, `Func`, `Void`, and
/// `DifferentialPair` have no differential type.
#[derive(Default)]
pub struct ConformanceRegistry {
    differential_of: FxHashMap<TypeId, TypeId>,
    zero_override: FxHashMap<TypeId, ZeroFn>,
    add_override: FxHashMap<TypeId, AddFn>,
}

impl ConformanceRegistry {
    /// Creates an empty registry; every type conforms via the
    /// structural default until told otherwise.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an explicit differential type for `primal`, bypassing
    /// the structural default.
    pub fn register_differential_type(&mut self, primal: TypeId, differential: TypeId) {
        self.differential_of.insert(primal, differential);
    }

    /// Registers an explicit zero synthesizer for `primal`.
    pub fn register_zero(&mut self, primal: TypeId, f: ZeroFn) {
        self.zero_override.insert(primal, f);
    }

    /// Registers an explicit add synthesizer for `primal`.
    pub fn register_add(&mut self, primal: TypeId, f: AddFn) {
        self.add_override.insert(primal, f);
    }

    /// `differentialTypeFor(T)`: the differential type of `primal`, if
    /// one exists. Memoizes structurally derived results.
    pub fn differential_type_for(&mut self, types: &mut TypeTable, primal: TypeId) -> Option<TypeId> {
        if let Some(&d) = self.differential_of.get(&primal) {
            return Some(d);
        }
        let computed = match types.get(primal).clone() {
            Type::Scalar | Type::Vector { .. } | Type::Matrix { .. } => Some(primal),
            Type::Struct { fields } => {
                let mut diff_fields = Vec::with_capacity(fields.len());
                for (key, field_ty) in fields {
                    diff_fields.push((key, self.differential_type_for(types, field_ty)?));
                }
                Some(types.insert(Type::Struct { fields: diff_fields }))
            }
            Type::Array { elem, len } => {
                let diff_elem = self.differential_type_for(types, elem)?;
                Some(types.insert(Type::Array { elem: diff_elem, len }))
            }
            Type::Pointer { .. } | Type::Func | Type::Void | Type::DifferentialPair { .. } => None,
        };
        if let Some(d) = computed {
            self.differential_of.insert(primal, d);
        }
        computed
    }

    /// `zeroMethodFor(T)`: emits `ty`'s zero value as IR.
    pub fn emit_zero(&self, builder: &mut Builder, types: &mut TypeTable, ty: TypeId) -> Option<InstId> {
        if let Some(f) = self.zero_override.get(&ty) {
            return Some(f(builder, ty));
        }
        match types.get(ty).clone() {
            Type::Scalar => Some(builder.float_lit(0.0, ty)),
            Type::Vector { .. } => {
                let scalar_ty = types.insert(Type::Scalar);
                let zero_scalar = builder.float_lit(0.0, scalar_ty);
                Some(builder.make_vector_from_scalar(zero_scalar, ty))
            }
            Type::Matrix { .. } => {
                let scalar_ty = types.insert(Type::Scalar);
                let zero_scalar = builder.float_lit(0.0, scalar_ty);
                Some(builder.make_matrix_from_scalar(zero_scalar, ty))
            }
            Type::Struct { fields } => {
                let mut elems = Vec::with_capacity(fields.len());
                for (_, field_ty) in fields {
                    elems.push(self.emit_zero(builder, types, field_ty)?);
                }
                Some(builder.make_struct(elems, ty))
            }
            Type::Array { elem, .. } => {
                let elem_zero = self.emit_zero(builder, types, elem)?;
                Some(builder.make_array_from_element(elem_zero, ty))
            }
            Type::Pointer { .. } | Type::Func | Type::Void | Type::DifferentialPair { .. } => None,
        }
    }

    /// `addMethodFor(T)`: emits `a + b` at type `ty`.
    pub fn emit_add(&self, builder: &mut Builder, types: &mut TypeTable, ty: TypeId, a: InstId, b: InstId) -> Option<InstId> {
        if let Some(f) = self.add_override.get(&ty) {
            return Some(f(builder, ty, a, b));
        }
        match types.get(ty).clone() {
            Type::Scalar | Type::Vector { .. } | Type::Matrix { .. } => Some(builder.add(a, b, ty)),
            Type::Struct { fields } => {
                let mut elems = Vec::with_capacity(fields.len());
                for (key, field_ty) in fields {
                    let fa = builder.field_extract(a, key, field_ty);
                    let fb = builder.field_extract(b, key, field_ty);
                    elems.push(self.emit_add(builder, types, field_ty, fa, fb)?);
                }
                Some(builder.make_struct(elems, ty))
            }
            Type::Array { elem, len } => {
                let index_ty = types.insert(Type::Scalar);
                let mut elems = Vec::with_capacity(len as usize);
                for i in 0..len {
                    let idx = builder.int_lit(i as i64, index_ty);
                    let ea = builder.element_extract(a, idx, elem);
                    let idx2 = builder.int_lit(i as i64, index_ty);
                    let eb = builder.element_extract(b, idx2, elem);
                    elems.push(self.emit_add(builder, types, elem, ea, eb)?);
                }
                Some(builder.make_array(elems, ty))
            }
            Type::Pointer { .. } | Type::Func | Type::Void | Type::DifferentialPair { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::function::Function;

    #[test]
    fn scalar_differential_type_is_identity() {
        let mut types = TypeTable::new();
        let scalar = types.insert(Type::Scalar);
        let mut reg = ConformanceRegistry::new();
        assert_eq!(reg.differential_type_for(&mut types, scalar), Some(scalar));
    }

    #[test]
    fn struct_differential_type_recurses_into_fields() {
        let mut types = TypeTable::new();
        let scalar = types.insert(Type::Scalar);
        let s = types.insert(Type::Struct { fields: vec![("x", scalar), ("y", scalar)] });
        let mut reg = ConformanceRegistry::new();
        let d = reg.differential_type_for(&mut types, s).unwrap();
        match types.get(d) {
            Type::Struct { fields } => assert_eq!(fields.len(), 2),
            other => panic!("expected struct, got {other:?}"),
        }
    }

    #[test]
    fn pointer_has_no_differential_type() {
        let mut types = TypeTable::new();
        let scalar = types.insert(Type::Scalar);
        let ptr = types.insert(Type::Pointer { pointee: scalar });
        let mut reg = ConformanceRegistry::new();
        assert_eq!(reg.differential_type_for(&mut types, ptr), None);
    }

    #[test]
    fn emit_zero_for_scalar_is_a_float_literal() {
        let mut types = TypeTable::new();
        let scalar = types.insert(Type::Scalar);
        let mut f = Function::new("f");
        let entry = f.entry;
        let mut b = Builder::new(&mut f, entry);
        let reg = ConformanceRegistry::new();
        let z = reg.emit_zero(&mut b, &mut types, scalar).unwrap();
        assert_eq!(b.func().inst(z).opcode, crate::ir::inst::Opcode::FloatLit);
    }

    #[test]
    fn emit_add_for_struct_recurses_per_field() {
        let mut types = TypeTable::new();
        let scalar = types.insert(Type::Scalar);
        let s = types.insert(Type::Struct { fields: vec![("x", scalar), ("y", scalar)] });
        let mut f = Function::new("f");
        let entry = f.entry;
        let mut b = Builder::new(&mut f, entry);
        let reg = ConformanceRegistry::new();
        let a = b.int_lit(1, scalar);
        let bv = b.int_lit(2, scalar);
        let a_struct = b.make_struct(vec![a, a], s);
        let b_struct = b.make_struct(vec![bv, bv], s);
        let sum = reg.emit_add(&mut b, &mut types, s, a_struct, b_struct).unwrap();
        assert_eq!(b.func().inst(sum).opcode, crate::ir::inst::Opcode::MakeStruct);
    }
}
