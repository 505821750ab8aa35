//! FLOWFIX: monotone dataflow equations over a small instruction
//! graph, solved by round-robin fixpoint iteration.

pub mod analysis;
pub mod entity;
mod errors;
mod ir;
pub mod pass;

pub use errors::*;
pub use ir::*;

mod interp;
pub use interp::*;
