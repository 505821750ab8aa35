//! Analyses built on the equation framework.

pub mod liveness;
pub mod reaching_defs;

pub use liveness::Liveness;
pub use reaching_defs::ReachingDefs;
