// SPDX-License-Identifier: EPL-2.0 OR GPL-2.0-or-later
// SPDX-FileCopyrightText: Bradley M. Bell <bradbell@seanet.com>
// SPDX-FileContributor: 2025-26 Bradley M. Bell
//
//! A single function: its block and instruction arenas, plus the
//! queries `transpose::*` is written against.
//!
//! Link to [parent module](super)

use rustc_hash::FxHashMap;

use super::block::{Block, Terminator};
use super::decoration::Decoration;
use super::ids::{BlockId, InstId};
use super::inst::{Inst, Opcode};

/// One function: its block and instruction arenas, named, with a
/// distinguished entry block.
///
/// Instructions and blocks are arena-indexed (§9 "Arena / index-based
/// IR"): `insts`/`blocks` are append-only vectors, and `InstId`/
/// `BlockId` are indices into them. `inst_parent` is kept alongside so
/// `parent_of` is O(1) rather than a scan over every block.
pub struct Function {
    pub name: String,
    pub insts: Vec<Inst>,
    pub blocks: Vec<Block>,
    pub entry: BlockId,
    inst_parent: Vec<BlockId>,
}

impl Function {
    /// Creates a function with a single empty, unterminated entry
    /// block.
    pub fn new(name: impl Into<String>) -> Self {
        let entry_block = Block::new();
        Self {
            name: name.into(),
            insts: Vec::new(),
            blocks: vec![entry_block],
            entry: BlockId(0),
            inst_parent: Vec::new(),
        }
    }

    /// Allocates a new empty, unterminated block and returns its id.
    pub fn new_block(&mut self) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(Block::new());
        id
    }

    /// Allocates `inst` in the instruction arena without attaching it
    /// to any block; used for block parameters, whose "position" is
    /// the block's `params` list rather than `insts`.
    pub fn alloc_inst(&mut self, inst: Inst) -> InstId {
        let id = InstId(self.insts.len() as u32);
        self.insts.push(inst);
        self.inst_parent.push(BlockId(u32::MAX));
        id
    }

    /// Appends `inst` to the end of `block`'s ordinary instruction
    /// list and records its parent.
    pub fn append(&mut self, block: BlockId, inst: Inst) -> InstId {
        let id = self.alloc_inst(inst);
        self.blocks[block.index()].insts.push(id);
        self.inst_parent[id.index()] = block;
        id
    }

    /// Inserts `inst` at the head of `block`'s ordinary instruction
    /// list (before any instruction already present).
    pub fn prepend(&mut self, block: BlockId, inst: Inst) -> InstId {
        self.prepend_at(block, 0, inst)
    }

    /// Inserts `inst` at position `index` of `block`'s ordinary
    /// instruction list. Used to hoist pointer-typed values and to
    /// seed accumulator zero-stores at the head of the first reverse
    /// differential block, keeping several head-inserted instructions
    /// in their written order (§4.1, §4.4 step 2).
    pub fn prepend_at(&mut self, block: BlockId, index: usize, inst: Inst) -> InstId {
        let id = self.alloc_inst(inst);
        self.blocks[block.index()].insts.insert(index, id);
        self.inst_parent[id.index()] = block;
        id
    }

    /// Adds `inst` as a block parameter (phi node) of `block`.
    pub fn add_param(&mut self, block: BlockId, inst: Inst) -> InstId {
        let id = self.alloc_inst(inst);
        self.blocks[block.index()].params.push(id);
        self.inst_parent[id.index()] = block;
        id
    }

    /// Resolves an instruction handle.
    pub fn inst(&self, id: InstId) -> &Inst {
        &self.insts[id.index()]
    }

    /// Resolves an instruction handle, mutably.
    pub fn inst_mut(&mut self, id: InstId) -> &mut Inst {
        &mut self.insts[id.index()]
    }

    /// Resolves a block handle.
    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.index()]
    }

    /// Resolves a block handle, mutably.
    pub fn block_mut(&mut self, id: BlockId) -> &mut Block {
        &mut self.blocks[id.index()]
    }

    /// The block that owns `inst` (its ordinary position or its phi
    /// parameter list).
    pub fn parent_of(&self, inst: InstId) -> BlockId {
        self.inst_parent[inst.index()]
    }

    /// The data type of `inst`.
    pub fn data_type(&self, inst: InstId) -> super::ids::TypeId {
        self.insts[inst.index()].ty
    }

    /// Number of operands of `inst`.
    pub fn operand_count(&self, inst: InstId) -> usize {
        self.insts[inst.index()].operands.len()
    }

    /// The `i`-th operand of `inst`.
    pub fn operand(&self, inst: InstId, i: usize) -> InstId {
        self.insts[inst.index()].operands[i]
    }

    /// The terminator of `block`.
    pub fn terminator(&self, block: BlockId) -> &Terminator {
        &self.blocks[block.index()].terminator
    }

    /// Sets the terminator of `block`.
    pub fn set_terminator(&mut self, block: BlockId, term: Terminator) {
        self.blocks[block.index()].terminator = term;
    }

    /// The successor blocks reachable from `block`'s terminator, in a
    /// stable order (then before else, body/continue before break,
    /// cases in declaration order before break).
    pub fn successors(&self, block: BlockId) -> Vec<BlockId> {
        match &self.blocks[block.index()].terminator {
            Terminator::Unset | Terminator::Return { .. } => Vec::new(),
            Terminator::Branch { target, .. } => vec![*target],
            Terminator::If { then_block, else_block, .. } => vec![*then_block, *else_block],
            Terminator::Loop { body, break_block, .. } => vec![*body, *break_block],
            Terminator::Switch { cases, break_block, .. } => {
                let mut out: Vec<BlockId> = cases.iter().map(|(_, b)| *b).collect();
                out.push(*break_block);
                out
            }
        }
    }

    /// The blocks whose terminator names `block` as a successor.
    pub fn predecessors(&self, block: BlockId) -> Vec<BlockId> {
        let mut preds = Vec::new();
        for (i, _) in self.blocks.iter().enumerate() {
            let b = BlockId(i as u32);
            if self.successors(b).contains(&block) {
                preds.push(b);
            }
        }
        preds
    }

    /// All instructions (ordinary, terminator operands, and phi-branch
    /// arguments) that reference `inst` as an operand.
    pub fn uses(&self, inst: InstId) -> Vec<InstId> {
        let mut out = Vec::new();
        for (i, candidate) in self.insts.iter().enumerate() {
            if candidate.operands.contains(&inst) {
                out.push(InstId(i as u32));
            }
        }
        out
    }

    /// True if any use of `inst` (ordinary operand or terminator/branch
    /// argument) lives in a block other than `home`.
    pub fn used_outside_block(&self, inst: InstId, home: BlockId) -> bool {
        if self.uses(inst).iter().any(|&u| self.parent_of(u) != home) {
            return true;
        }
        for (i, block) in self.blocks.iter().enumerate() {
            let b = BlockId(i as u32);
            if b == home {
                continue;
            }
            if Self::terminator_refs(&block.terminator).contains(&inst) {
                return true;
            }
        }
        false
    }

    /// Operand-like references carried directly on a terminator
    /// (condition, switch scrutinee, branch arguments).
    pub fn terminator_refs(term: &Terminator) -> Vec<InstId> {
        match term {
            Terminator::Unset => Vec::new(),
            Terminator::Return { value } => value.iter().copied().collect(),
            Terminator::Branch { args, .. } => args.clone(),
            Terminator::If { cond, .. } => vec![*cond],
            Terminator::Loop { .. } => Vec::new(),
            Terminator::Switch { value, .. } => vec![*value],
        }
    }

    /// Finds the unique block whose terminator is `Return` and is
    /// marked differential, if any.
    pub fn terminal_differential_block(&self) -> Option<BlockId> {
        self.blocks
            .iter()
            .enumerate()
            .find(|(_, b)| b.is_differential() && matches!(b.terminator, Terminator::Return { .. }))
            .map(|(i, _)| BlockId(i as u32))
    }

    /// Finds the unique block whose terminator is `Return` and is not
    /// marked differential, if any.
    pub fn terminal_primal_block(&self) -> Option<BlockId> {
        self.blocks
            .iter()
            .enumerate()
            .find(|(_, b)| !b.is_differential() && matches!(b.terminator, Terminator::Return { .. }))
            .map(|(i, _)| BlockId(i as u32))
    }

    /// All blocks marked differential, in arena (program) order.
    pub fn differential_blocks(&self) -> Vec<BlockId> {
        self.blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_differential())
            .map(|(i, _)| BlockId(i as u32))
            .collect()
    }

    /// Propagates a `NameHint` decoration from `from` onto `to`,
    /// appending `_T` to the hint text if present (§4.4 step 3e).
    pub fn propagate_name_hint(&mut self, from: InstId, to: InstId) {
        let hint = self.insts[from.index()]
            .find_decoration(|d| matches!(d, Decoration::NameHint(_)))
            .map(|d| match d {
                Decoration::NameHint(s) => s.clone(),
                _ => unreachable!(),
            });
        if let Some(hint) = hint {
            self.insts[to.index()].decorations.push(Decoration::NameHint(format!("{hint}_T")));
        }
    }

    /// Deletes a set of blocks from the arena-view of the function by
    /// clearing their contents; their `BlockId`s are never reused and
    /// nothing may reference them afterward (driver step 8).
    pub fn delete_blocks(&mut self, blocks: &[BlockId]) {
        for &b in blocks {
            self.blocks[b.index()] = Block::new();
        }
    }

    /// Builds a forward-block -> reverse-image map for `blocks`,
    /// allocating a fresh empty block marked differential per entry,
    /// in the given order (driver step 1).
    pub fn make_reverse_images(&mut self, blocks: &[BlockId]) -> FxHashMap<BlockId, BlockId> {
        let mut map = FxHashMap::default();
        for &b in blocks {
            let rev = self.new_block();
            self.blocks[rev.index()].mark_differential(b);
            map.insert(b, rev);
        }
        map
    }

    /// True if `opcode` names a `Var`/`FieldAddress`/`ElementAddress`
    /// instruction, i.e. one hoisted through blocks unchanged.
    pub fn is_pointer_producing(opcode: Opcode) -> bool {
        opcode.is_opaque_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ids::TypeId;

    #[test]
    fn append_records_parent_and_order() {
        let mut f = Function::new("f");
        let entry = f.entry;
        let a = f.append(entry, Inst::new(Opcode::IntLit, vec![], TypeId(0)));
        let b = f.append(entry, Inst::new(Opcode::IntLit, vec![], TypeId(0)));
        assert_eq!(f.parent_of(a), entry);
        assert_eq!(f.block(entry).insts, vec![a, b]);
    }

    #[test]
    fn prepend_inserts_before_existing() {
        let mut f = Function::new("f");
        let entry = f.entry;
        let a = f.append(entry, Inst::new(Opcode::IntLit, vec![], TypeId(0)));
        let b = f.prepend(entry, Inst::new(Opcode::IntLit, vec![], TypeId(0)));
        assert_eq!(f.block(entry).insts, vec![b, a]);
    }

    #[test]
    fn uses_finds_referencing_instructions() {
        let mut f = Function::new("f");
        let entry = f.entry;
        let a = f.append(entry, Inst::new(Opcode::IntLit, vec![], TypeId(0)));
        let b = f.append(entry, Inst::new(Opcode::Neg, vec![a], TypeId(0)));
        assert_eq!(f.uses(a), vec![b]);
        assert!(f.uses(b).is_empty());
    }

    #[test]
    fn successors_follow_terminator_shape() {
        let mut f = Function::new("f");
        let entry = f.entry;
        let then_b = f.new_block();
        let else_b = f.new_block();
        let after = f.new_block();
        let cond = f.append(entry, Inst::new(Opcode::IntLit, vec![], TypeId(0)));
        f.set_terminator(entry, Terminator::If { cond, then_block: then_b, else_block: else_b, after });
        assert_eq!(f.successors(entry), vec![then_b, else_b]);
        assert!(f.predecessors(then_b).contains(&entry));
    }
}
