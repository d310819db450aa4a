// SPDX-License-Identifier: EPL-2.0 OR GPL-2.0-or-later
// SPDX-FileCopyrightText: Bradley M. Bell <bradbell@seanet.com>
// SPDX-FileContributor: 2025-26 Bradley M. Bell
//
//! Closed type vocabulary the pass is defined over.
//!
//! Link to [parent module](super)

use super::ids::TypeId;

/// A struct field key, stable across `MakeStruct`/`FieldExtract` pairs.
pub type FieldKey = &'static str;

/// The small set of shapes the transposer needs to reason about.
///
/// This is not a general source-language type system; it carries just
/// enough structure to drive operand promotion and the materializer's
/// flavor strategies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Type {
    /// A scalar floating-point value.
    Scalar,
    /// A fixed-length vector of scalars.
    Vector { len: u32 },
    /// A fixed-shape matrix of scalars.
    Matrix { rows: u32, cols: u32 },
    /// A named aggregate of (key, type) fields, in declaration order.
    Struct { fields: Vec<(FieldKey, TypeId)> },
    /// A fixed-length array of a single element type.
    Array { elem: TypeId, len: u32 },
    /// A pointer to a value of the pointee type.
    Pointer { pointee: TypeId },
    /// A primal/tangent pair, as produced by forward differentiation.
    DifferentialPair { primal: TypeId },
    /// The callee type of a function reference; carries no shape.
    Func,
    /// No value (return type of void-returning calls).
    Void,
}

/// Interning table for [`Type`], keyed by [`TypeId`].
#[derive(Default)]
pub struct TypeTable {
    types: Vec<Type>,
}

impl TypeTable {
    /// Creates an empty type table.
    pub fn new() -> Self {
        Self { types: Vec::new() }
    }

    /// Interns `ty`, returning a fresh [`TypeId`].
    ///
    /// Unlike most interning tables this one does not deduplicate by
    /// structural equality: `Struct`/`Array` element `TypeId`s already
    /// provide sharing, and the pass never compares `TypeId`s for
    /// type-equality purposes, only to drive dispatch on the `Type` they
    /// resolve to.
    pub fn insert(&mut self, ty: Type) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(ty);
        id
    }

    /// Resolves a [`TypeId`] back to its [`Type`].
    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.index()]
    }
}

impl Type {
    /// True for the `DifferentialPair` variant.
    pub fn is_differential_pair(&self) -> bool {
        matches!(self, Type::DifferentialPair { .. })
    }

    /// True for `Pointer` and `Func`, the two kinds this pass conveys
    /// through a block unchanged rather than differentiating.
    pub fn is_opaque(&self) -> bool {
        matches!(self, Type::Pointer { .. } | Type::Func)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_returns_distinct_ids() {
        let mut table = TypeTable::new();
        let a = table.insert(Type::Scalar);
        let b = table.insert(Type::Vector { len: 3 });
        assert_ne!(a, b);
        assert_eq!(table.get(a), &Type::Scalar);
        assert_eq!(table.get(b), &Type::Vector { len: 3 });
    }

    #[test]
    fn differential_pair_and_opaque_classification() {
        let mut table = TypeTable::new();
        let scalar = table.insert(Type::Scalar);
        let pair = Type::DifferentialPair { primal: scalar };
        assert!(pair.is_differential_pair());
        assert!(!Type::Scalar.is_opaque());
        let ptr = Type::Pointer { pointee: scalar };
        assert!(ptr.is_opaque());
    }
}
