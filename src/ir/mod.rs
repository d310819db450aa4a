// SPDX-License-Identifier: EPL-2.0 OR GPL-2.0-or-later
// SPDX-FileCopyrightText: Bradley M. Bell <bradbell@seanet.com>
// SPDX-FileContributor: 2025-26 Bradley M. Bell
//
//! The concrete IR this pass is defined over: arena-indexed
//! instructions, blocks, and functions, plus a builder exposing
//! exactly the mutation primitives §6 of the specification names.
//!
//! This module is the *only* place the pass touches concrete IR node
//! shapes (§10); [`crate::transpose`]'s components are written purely
//! against the queries and mutators exposed here.

pub mod block;
pub mod builder;
pub mod decoration;
pub mod function;
pub mod ids;
pub mod inst;
pub mod module;
pub mod types;

pub use block::{Block, Terminator};
pub use builder::{Builder, InsertionPoint};
pub use decoration::Decoration;
pub use function::Function;
pub use ids::{BlockId, FuncId, InstId, TypeId};
pub use inst::{Inst, InstExtra, Opcode};
pub use module::Module;
pub use types::{FieldKey, Type, TypeTable};
