// SPDX-License-Identifier: EPL-2.0 OR GPL-2.0-or-later
// SPDX-FileCopyrightText: Bradley M. Bell <bradbell@seanet.com>
// SPDX-FileContributor: 2025-26 Bradley M. Bell
//
//! Reverse-mode transposition proper (§4): the gradient store, the
//! adjoint materializer, the per-instruction and per-block
//! transposers, the structured CFG reverser, and the driver that
//! sequences them into one pass over a function.

pub mod block_transpose;
pub mod cfg_reverse;
pub mod driver;
pub mod gradient_store;
pub mod inst_transpose;
pub mod materializer;

pub use block_transpose::{transpose_block, PhiGradMap};
pub use cfg_reverse::reverse_region;
pub use driver::{run, TransposeInfo};
pub use gradient_store::{Flavor, GradientStore, RevGradient};
pub use inst_transpose::transpose_inst;
pub use materializer::emit_aggregate;
