// SPDX-License-Identifier: EPL-2.0 OR GPL-2.0-or-later
// SPDX-FileCopyrightText: Bradley M. Bell <bradbell@seanet.com>
// SPDX-FileContributor: 2025-26 Bradley M. Bell
//
//! The IR mutation surface named in §6, behind a single scoped
//! insertion cursor (§9 "Insertion-cursor discipline").
//!
//! Link to [parent module](super)

use ordered_float::OrderedFloat;

use super::block::Terminator;
use super::ids::{BlockId, FuncId, InstId, TypeId};
use super::inst::{Inst, InstExtra, Opcode};
use super::types::FieldKey;
use super::function::Function;

/// A saved cursor position, returned by [`Builder::set_insert_point`]
/// so callers can restore it explicitly; [`Builder::with_insert_point`]
/// is the preferred scoped form and restores automatically on every
/// exit path, including early `?` returns from the closure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InsertionPoint(BlockId);

/// Wraps a [`Function`] with a single current-block insertion cursor
/// and exposes exactly the mutation primitives of §6/§10.
///
/// No global cursor state exists anywhere else in the crate: every
/// `emit_*`/constructor method inserts at `self.point`, and every
/// caller that must temporarily redirect insertion does so through
/// [`Builder::with_insert_point`], never by hand-saving and restoring
/// a field.
pub struct Builder<'f> {
    func: &'f mut Function,
    point: BlockId,
    /// When `Some(i)`, the next emitted instruction is inserted at
    /// index `i` of the current block rather than appended, and `i` is
    /// advanced; used by [`Builder::with_head_insertion`] so a whole
    /// group of instructions (e.g. an accumulator's variable, its zero
    /// value, and the store of that zero) lands at the block's head in
    /// the order it was written, ahead of anything already there.
    head_cursor: Option<usize>,
}

impl<'f> Builder<'f> {
    /// Creates a builder over `func`, initially inserting at `point`.
    pub fn new(func: &'f mut Function, point: BlockId) -> Self {
        Self { func, point, head_cursor: None }
    }

    /// Runs `body` with instructions it emits inserted at the head of
    /// `block`, in written order, ahead of whatever `block` already
    /// contains. Restores the previous cursor and head-insertion state
    /// on every exit path, nesting safely with
    /// [`Builder::with_insert_point`].
    pub fn with_head_insertion<R>(&mut self, block: BlockId, body: impl FnOnce(&mut Self) -> R) -> R {
        let saved_point = self.set_insert_point(block);
        let saved_head = self.head_cursor.replace(0);
        let result = body(self);
        self.head_cursor = saved_head;
        self.restore_insert_point(saved_point);
        result
    }

    /// Borrows the underlying function immutably.
    pub fn func(&self) -> &Function {
        self.func
    }

    /// Borrows the underlying function mutably.
    pub fn func_mut(&mut self) -> &mut Function {
        self.func
    }

    /// The block new instructions are currently inserted into.
    pub fn insert_point(&self) -> BlockId {
        self.point
    }

    /// Moves the cursor to `block`, returning the previous position so
    /// it can be restored with [`Builder::restore_insert_point`].
    /// Prefer [`Builder::with_insert_point`] unless the scope does not
    /// nest cleanly (e.g. the CFG reverser leaves the cursor parked on
    /// a freshly closed block for the caller to continue from).
    pub fn set_insert_point(&mut self, block: BlockId) -> InsertionPoint {
        let saved = InsertionPoint(self.point);
        self.point = block;
        saved
    }

    /// Restores a cursor position saved by `set_insert_point`.
    pub fn restore_insert_point(&mut self, saved: InsertionPoint) {
        self.point = saved.0;
    }

    /// Runs `body` with the cursor temporarily moved to `block`,
    /// restoring it afterward regardless of how `body` returns. This
    /// is the scoped-acquisition discipline of §9: nothing outlives
    /// the call.
    pub fn with_insert_point<R>(&mut self, block: BlockId, body: impl FnOnce(&mut Self) -> R) -> R {
        let saved = self.set_insert_point(block);
        let result = body(self);
        self.restore_insert_point(saved);
        result
    }

    fn emit(&mut self, opcode: Opcode, operands: Vec<InstId>, ty: TypeId, extra: InstExtra) -> InstId {
        let inst = Inst { opcode, operands, ty, decorations: Vec::new(), extra };
        match self.head_cursor {
            Some(index) => {
                let id = self.func.prepend_at(self.point, index, inst);
                self.head_cursor = Some(index + 1);
                id
            }
            None => self.func.append(self.point, inst),
        }
    }

    // -- block / terminator emission --

    /// Allocates a fresh empty block, independent of the cursor.
    pub fn emit_block(&mut self) -> BlockId {
        self.func.new_block()
    }

    /// Closes the current block with an unconditional branch.
    pub fn emit_branch(&mut self, target: BlockId, args: Vec<InstId>) {
        self.func.set_terminator(self.point, Terminator::Branch { target, args });
    }

    /// Closes the current block with a structured if/else.
    pub fn emit_if_else(&mut self, cond: InstId, then_block: BlockId, else_block: BlockId, after: BlockId) {
        self.func.set_terminator(self.point, Terminator::If { cond, then_block, else_block, after });
    }

    /// Closes the current block with a structured loop header.
    pub fn emit_loop(&mut self, body: BlockId, break_block: BlockId, continue_block: BlockId) {
        self.func.set_terminator(self.point, Terminator::Loop { body, break_block, continue_block });
    }

    /// Closes the current block with a structured switch.
    pub fn emit_switch(&mut self, value: InstId, cases: Vec<(i64, BlockId)>, break_block: BlockId) {
        self.func.set_terminator(self.point, Terminator::Switch { value, cases, break_block });
    }

    /// Closes the current block with a return.
    pub fn emit_return(&mut self, value: Option<InstId>) {
        self.func.set_terminator(self.point, Terminator::Return { value });
    }

    /// Adds a block parameter (phi node) of type `ty` to `block`.
    pub fn emit_param(&mut self, block: BlockId, ty: TypeId) -> InstId {
        let inst = Inst::new(Opcode::Param, Vec::new(), ty);
        self.func.add_param(block, inst)
    }

    // -- memory --

    /// Declares a stack variable of type `pointer_ty`, yielding a
    /// pointer instruction. Callers that need head-of-block placement
    /// (accumulator cells, §4.1) wrap this in
    /// [`Builder::with_head_insertion`].
    pub fn emit_var(&mut self, pointer_ty: TypeId) -> InstId {
        self.emit(Opcode::Var, Vec::new(), pointer_ty, InstExtra::None)
    }

    /// Loads the value currently stored at `ptr`.
    pub fn load(&mut self, ptr: InstId, value_ty: TypeId) -> InstId {
        self.emit(Opcode::Load, vec![ptr], value_ty, InstExtra::None)
    }

    /// Stores `value` into `ptr`; has no meaningful result type.
    pub fn store(&mut self, ptr: InstId, value: InstId, void_ty: TypeId) -> InstId {
        self.emit(Opcode::Store, vec![ptr, value], void_ty, InstExtra::None)
    }

    // -- aggregate destructors --

    /// Extracts element `index` of array-typed `base`.
    pub fn element_extract(&mut self, base: InstId, index: InstId, elem_ty: TypeId) -> InstId {
        self.emit(Opcode::GetElement, vec![base, index], elem_ty, InstExtra::None)
    }

    /// Addresses element `index` of the array pointed to by `base_ptr`.
    pub fn element_address(&mut self, base_ptr: InstId, index: InstId, ptr_ty: TypeId) -> InstId {
        self.emit(Opcode::ElementAddress, vec![base_ptr, index], ptr_ty, InstExtra::None)
    }

    /// Extracts field `key` of struct-typed `base`.
    pub fn field_extract(&mut self, base: InstId, key: FieldKey, field_ty: TypeId) -> InstId {
        self.emit(Opcode::FieldExtract, vec![base], field_ty, InstExtra::Field(key))
    }

    /// Addresses field `key` of the struct pointed to by `base_ptr`.
    pub fn field_address(&mut self, base_ptr: InstId, key: FieldKey, ptr_ty: TypeId) -> InstId {
        self.emit(Opcode::FieldAddress, vec![base_ptr], ptr_ty, InstExtra::Field(key))
    }

    /// Extracts a sub-vector of `base` at the given component indices.
    pub fn swizzle(&mut self, base: InstId, indices: Vec<u32>, result_ty: TypeId) -> InstId {
        self.emit(Opcode::Swizzle, vec![base], result_ty, InstExtra::Indices(indices))
    }

    // -- aggregate constructors --

    /// Builds a vector from per-component operands.
    pub fn make_vector(&mut self, elems: Vec<InstId>, vector_ty: TypeId) -> InstId {
        self.emit(Opcode::MakeVector, elems, vector_ty, InstExtra::None)
    }

    /// Builds a vector by splatting a single scalar to every component.
    pub fn make_vector_from_scalar(&mut self, scalar: InstId, vector_ty: TypeId) -> InstId {
        self.emit(Opcode::MakeVectorFromScalar, vec![scalar], vector_ty, InstExtra::None)
    }

    /// Builds a matrix from per-row (or per-column) vector operands.
    pub fn make_matrix(&mut self, rows: Vec<InstId>, matrix_ty: TypeId) -> InstId {
        self.emit(Opcode::MakeMatrix, rows, matrix_ty, InstExtra::None)
    }

    /// Builds a matrix by splatting a single scalar to every entry.
    pub fn make_matrix_from_scalar(&mut self, scalar: InstId, matrix_ty: TypeId) -> InstId {
        self.emit(Opcode::MakeMatrixFromScalar, vec![scalar], matrix_ty, InstExtra::None)
    }

    /// Reshapes matrix `m` into `result_ty`.
    pub fn matrix_reshape(&mut self, m: InstId, result_ty: TypeId) -> InstId {
        self.emit(Opcode::MatrixReshape, vec![m], result_ty, InstExtra::None)
    }

    /// Builds a struct from field operands, ordered to match
    /// `struct_ty`'s declared field order.
    pub fn make_struct(&mut self, fields: Vec<InstId>, struct_ty: TypeId) -> InstId {
        self.emit(Opcode::MakeStruct, fields, struct_ty, InstExtra::None)
    }

    /// Builds a fixed-length array from per-element operands.
    pub fn make_array(&mut self, elems: Vec<InstId>, array_ty: TypeId) -> InstId {
        self.emit(Opcode::MakeArray, elems, array_ty, InstExtra::None)
    }

    /// Builds a fixed-length array by splatting a single element.
    pub fn make_array_from_element(&mut self, elem: InstId, array_ty: TypeId) -> InstId {
        self.emit(Opcode::MakeArrayFromElement, vec![elem], array_ty, InstExtra::None)
    }

    /// Replaces the element named by `chain` (a path of element/field
    /// indices) in `arr` with `value`.
    pub fn update_element(&mut self, arr: InstId, chain: Vec<u32>, value: InstId, array_ty: TypeId) -> InstId {
        self.emit(Opcode::UpdateElement, vec![arr, value], array_ty, InstExtra::Indices(chain))
    }

    /// Builds a differential pair from a primal and its tangent.
    pub fn make_pair(&mut self, primal: InstId, diff: InstId, pair_ty: TypeId) -> InstId {
        self.emit(Opcode::MakeDifferentialPair, vec![primal, diff], pair_ty, InstExtra::None)
    }

    /// Extracts the tangent component of a differential pair.
    pub fn get_differential(&mut self, pair: InstId, diff_ty: TypeId) -> InstId {
        self.emit(Opcode::DifferentialPairGetDifferential, vec![pair], diff_ty, InstExtra::None)
    }

    // -- arithmetic --

    /// Emits `a + b`.
    pub fn add(&mut self, a: InstId, b: InstId, ty: TypeId) -> InstId {
        self.emit(Opcode::Add, vec![a, b], ty, InstExtra::None)
    }

    /// Emits `a - b`.
    pub fn sub(&mut self, a: InstId, b: InstId, ty: TypeId) -> InstId {
        self.emit(Opcode::Sub, vec![a, b], ty, InstExtra::None)
    }

    /// Emits `a * b`.
    pub fn mul(&mut self, a: InstId, b: InstId, ty: TypeId) -> InstId {
        self.emit(Opcode::Mul, vec![a, b], ty, InstExtra::None)
    }

    /// Emits `-a`.
    pub fn negate(&mut self, a: InstId, ty: TypeId) -> InstId {
        self.emit(Opcode::Neg, vec![a], ty, InstExtra::None)
    }

    // -- literals --

    /// Constructs an integer literal.
    pub fn int_lit(&mut self, v: i64, ty: TypeId) -> InstId {
        self.emit(Opcode::IntLit, Vec::new(), ty, InstExtra::Int(v))
    }

    /// Constructs a floating-point literal.
    pub fn float_lit(&mut self, v: f64, ty: TypeId) -> InstId {
        self.emit(Opcode::FloatLit, Vec::new(), ty, InstExtra::Float(OrderedFloat(v)))
    }

    // -- calls --

    /// Emits an ordinary (non-differentiable) call.
    pub fn call(&mut self, callee: FuncId, args: Vec<InstId>, result_ty: TypeId) -> InstId {
        self.emit(Opcode::Call, args, result_ty, InstExtra::Callee(callee))
    }

    /// Emits a forward-mode differentiable call `fwdDiff(f)(args...)`.
    pub fn forward_differentiate_call(&mut self, callee: FuncId, args: Vec<InstId>, result_ty: TypeId) -> InstId {
        self.emit(Opcode::ForwardDifferentiateCall, args, result_ty, InstExtra::Callee(callee))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::types::Type;

    #[test]
    fn with_insert_point_restores_on_every_return_path() {
        let mut f = Function::new("f");
        let entry = f.entry;
        let side = f.new_block();
        let mut types = super::super::types::TypeTable::new();
        let scalar = types.insert(Type::Scalar);
        let mut b = Builder::new(&mut f, entry);
        let a = b.int_lit(1, scalar);
        let inside = b.with_insert_point(side, |b| b.int_lit(2, scalar));
        assert_eq!(b.insert_point(), entry);
        assert_eq!(b.func().block(entry).insts, vec![a]);
        assert_eq!(b.func().block(side).insts, vec![inside]);
    }

    #[test]
    fn with_head_insertion_groups_land_before_existing_code() {
        let mut f = Function::new("f");
        let entry = f.entry;
        let mut types = super::super::types::TypeTable::new();
        let scalar = types.insert(Type::Scalar);
        let ptr = types.insert(Type::Pointer { pointee: scalar });
        let mut b = Builder::new(&mut f, entry);
        let first = b.int_lit(1, scalar);
        let (var, zero) = b.with_head_insertion(entry, |b| {
            let var = b.emit_var(ptr);
            let zero = b.float_lit(0.0, scalar);
            (var, zero)
        });
        assert_eq!(b.func().block(entry).insts, vec![var, zero, first]);
    }
}
