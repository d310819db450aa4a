// SPDX-License-Identifier: EPL-2.0 OR GPL-2.0-or-later
// SPDX-FileCopyrightText: Bradley M. Bell <bradbell@seanet.com>
// SPDX-FileContributor: 2025-26 Bradley M. Bell
//
//! §4.6: the driver. Sequences block marking, per-block transposition,
//! and CFG reversal into the single `run` entry point a host compiler
//! calls once per already-forward-differentiated function. Grounded on
//! the teacher's top-level `reverse_one`/`reverse_der` entry points in
//! `adfn/mod.rs`.
//!
//! Link to [parent module](super)

use tracing::info_span;

use crate::conformance::ConformanceRegistry;
use crate::error::{Result, TransposeError};
use crate::ir::block::Terminator;
use crate::ir::builder::Builder;
use crate::ir::decoration::Decoration;
use crate::ir::ids::{BlockId, FuncId, InstId};
use crate::ir::module::Module;

use super::block_transpose::{transpose_block, PhiGradMap};
use super::cfg_reverse::reverse_region;
use super::gradient_store::{GradientStore, RevGradient};

/// Inputs to [`run`] beyond the function itself (§6 "Inputs to
/// `run(function, info)`"). `primals_map` is not threaded explicitly:
/// the forward primal instructions it would name are already live in
/// the IR the reverse code references directly.
pub struct TransposeInfo {
    /// The initial adjoint of the function's return value, or `None`
    /// for a void-returning function.
    pub d_out_inst: Option<InstId>,
}

/// No block will ever carry this id; used as `reverse_region`'s `end`
/// when the region to reverse has no upper bound (driver step 5's
/// "empty endSet").
const NO_END: BlockId = BlockId(u32::MAX);

/// Transposes `func_id` in place (§4.6): marks and mirrors its
/// differential blocks, transposes each one, reverses the structured
/// control flow between them, and splices the result between the
/// function's primal and (now deleted) forward-differential code.
pub fn run(module: &mut Module, func_id: FuncId, info: TransposeInfo) -> Result<()> {
    let _span = info_span!("transpose_run", func = ?func_id).entered();
    let backward_entries = module.backward_entries().clone();
    let (types, func) = module.split_mut(func_id);
    let mut conformance = ConformanceRegistry::new();
    let mut store = GradientStore::new();
    let mut phi_grads = PhiGradMap::default();

    // Step 1: mark/collect differential blocks in reverse program
    // order, and allocate one empty reverse image per block.
    let mut fwd_diff_blocks = func.differential_blocks();
    if fwd_diff_blocks.is_empty() {
        return Ok(());
    }
    fwd_diff_blocks.reverse();
    let rev_of = func.make_reverse_images(&fwd_diff_blocks);

    // Step 2: firstRevDiffBlock is the reverse image of the terminal
    // differential block, where reverse execution begins and where
    // accumulator cells get their head-of-block zero-seed.
    let terminal_diff_block = func.terminal_differential_block().ok_or(TransposeError::NotSingleReturnDifferential)?;
    let first_rev_diff_block = rev_of[&terminal_diff_block];

    // Step 3: seed the return value's adjoint from the caller-supplied
    // output gradient.
    if let Terminator::Return { value: Some(ret_inst) } = func.terminator(terminal_diff_block).clone() {
        if let Some(d_out) = info.d_out_inst {
            store.add(ret_inst, RevGradient::simple(ret_inst, d_out));
        }
    }

    let mut builder = Builder::new(func, first_rev_diff_block);

    // Step 4: transpose each block, terminal-block-first, matching the
    // order blocks were collected in step 1.
    for &fwd_block in &fwd_diff_blocks {
        let rev_block = rev_of[&fwd_block];
        transpose_block(
            &mut builder,
            types,
            &mut conformance,
            &mut store,
            &backward_entries,
            &mut phi_grads,
            first_rev_diff_block,
            fwd_block,
            rev_block,
        )?;
    }

    // Step 5: reverse the structured control flow starting from the
    // first forward differential block (program order), with no upper
    // bound. This returns the reverse image of that same block, the
    // one no emitted branch ever targets.
    let entry_diff_block = *fwd_diff_blocks.last().expect("checked non-empty above");
    let last_rev_block = reverse_region(&mut builder, &rev_of, &phi_grads, entry_diff_block, NO_END)?;

    // Step 6: redirect the terminal primal block into the reverse
    // walk, recording the primal return value for the caller to
    // recover later.
    let terminal_primal_block =
        builder.func().terminal_primal_block().ok_or(TransposeError::NotSingleReturnPrimal)?;
    let primal_return_value = match builder.func().terminator(terminal_primal_block).clone() {
        Terminator::Return { value } => value,
        _ => None,
    };
    builder.func_mut().block_mut(terminal_primal_block).decorations.push(Decoration::ReturnValue(primal_return_value));
    builder.with_insert_point(terminal_primal_block, |b| b.emit_branch(first_rev_diff_block, Vec::new()));

    // Step 7: close the last reverse block with a plain return.
    builder.with_insert_point(last_rev_block, |b| b.emit_return(None));

    // Step 8: the forward differential blocks are fully subsumed by
    // their reverse images now; delete them.
    builder.func_mut().delete_blocks(&fwd_diff_blocks);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::function::Function;
    use crate::ir::inst::{Inst, Opcode};
    use crate::ir::types::Type;

    #[test]
    fn single_block_function_reverses_to_a_matching_shape() {
        let mut module = Module::new();
        let scalar = module.intern_type(Type::Scalar);

        let mut f = Function::new("f");
        let primal = f.entry;
        let diff = f.new_block();
        f.block_mut(diff).mark_differential(primal);

        let a = f.append(primal, Inst::new(Opcode::IntLit, vec![], scalar));
        let b = f.append(primal, Inst::new(Opcode::IntLit, vec![], scalar));
        f.inst_mut(a).decorations.push(Decoration::DifferentialInst { primal: a, primal_type: scalar });
        // Primal and differential code are separate chains in the
        // unzipped forward IR this driver consumes; the primal chain
        // returns on its own, and step 6 is what later splices it into
        // the reverse walk.
        f.set_terminator(primal, Terminator::Return { value: Some(a) });
        let mul = f.append(diff, Inst::new(Opcode::Mul, vec![a, b], scalar));
        f.inst_mut(mul).decorations.push(Decoration::DifferentialInst { primal: mul, primal_type: scalar });
        f.set_terminator(diff, Terminator::Return { value: Some(mul) });

        let func_id = module.add_function(f);
        let d_out = {
            let func = module.function_mut(func_id);
            let seed_block = func.new_block();
            func.append(seed_block, Inst::new(Opcode::FloatLit, vec![], scalar))
        };

        run(&mut module, func_id, TransposeInfo { d_out_inst: Some(d_out) }).unwrap();

        let func = module.function(func_id);
        assert!(matches!(func.terminator(primal), Terminator::Branch { .. }));
        assert!(func.block(primal).decorations.iter().any(|d| matches!(d, Decoration::ReturnValue(_))));
        assert!(func.block(diff).insts.is_empty());
    }

    #[test]
    fn empty_differential_region_is_a_no_op() {
        let mut module = Module::new();
        let mut f = Function::new("f");
        let entry = f.entry;
        f.set_terminator(entry, Terminator::Return { value: None });
        let func_id = module.add_function(f);
        run(&mut module, func_id, TransposeInfo { d_out_inst: None }).unwrap();
        assert_eq!(module.function(func_id).terminator(entry), &Terminator::Return { value: None });
    }
}
