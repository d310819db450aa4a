// SPDX-License-Identifier: EPL-2.0 OR GPL-2.0-or-later
// SPDX-FileCopyrightText: Bradley M. Bell <bradbell@seanet.com>
// SPDX-FileContributor: 2025-26 Bradley M. Bell

//! A reverse-mode automatic differentiation transposition pass for
//! already forward-differentiated SSA IR.
//!
//! The pass expects a function whose primal and differential code have
//! already been "unzipped" into separate basic blocks (the differential
//! blocks carrying a `DifferentialBlock` decoration), and turns that
//! forward differential code into its reverse-mode transpose: the
//! control-flow graph is reversed, each instruction's contribution to
//! its operands' adjoints is emitted by [`transpose::inst_transpose`],
//! and partial adjoints are accumulated through [`transpose::gradient_store`]
//! and folded by [`transpose::materializer`] before being routed across
//! block boundaries by cross-block accumulator cells.
//!
//! [`transpose::driver::run`] is the single entry point: it sequences
//! block marking, per-block transposition (§4.4), and structured CFG
//! reversal (§4.5) into one pass over a [`ir::Function`].
//!
//! # Example
//! ```
//! use revtrans::ir::{Builder, Decoration, Function, Inst, Module, Opcode, Terminator, Type};
//! use revtrans::transpose::{self, TransposeInfo};
//!
//! let mut module = Module::new();
//! let scalar = module.intern_type(Type::Scalar);
//!
//! let mut f = Function::new("square");
//! let primal = f.entry;
//! let diff = f.new_block();
//! f.block_mut(diff).mark_differential(primal);
//!
//! let x = f.append(primal, Inst::new(Opcode::IntLit, vec![], scalar));
//! f.inst_mut(x).decorations.push(Decoration::DifferentialInst { primal: x, primal_type: scalar });
//! f.set_terminator(primal, Terminator::Return { value: Some(x) });
//! let y = f.append(diff, Inst::new(Opcode::Mul, vec![x, x], scalar));
//! f.inst_mut(y).decorations.push(Decoration::DifferentialInst { primal: y, primal_type: scalar });
//! f.set_terminator(diff, Terminator::Return { value: Some(y) });
//!
//! let func_id = module.add_function(f);
//! let d_out = {
//!     let seed_block = module.function_mut(func_id).new_block();
//!     let mut b = Builder::new(module.function_mut(func_id), seed_block);
//!     b.float_lit(1.0, scalar)
//! };
//!
//! transpose::run(&mut module, func_id, TransposeInfo { d_out_inst: Some(d_out) }).unwrap();
//! ```

pub mod conformance;
pub mod error;
pub mod ir;
pub mod transpose;

pub use error::{Result, TransposeError};
