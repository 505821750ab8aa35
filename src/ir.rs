//! Instruction-graph intermediate representation.
//!
//! Every instruction is one node of a control-flow graph. Nodes live
//! in a flat arena owned by a `Graph` and refer to each other by
//! index, so successor and predecessor lists never form ownership
//! cycles.

use crate::declare_entity;

declare_entity!(Inst, "i");
declare_entity!(Var, "v");

mod display;
mod graph;
mod inst;

pub use display::*;
pub use graph::*;
pub use inst::*;
