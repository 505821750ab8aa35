//! Equation-based dataflow framework.
//!
//! An analysis is described as a flat list of equations, one per
//! program point it computes. Each equation owns one named slot in a
//! shared environment and knows how to recompute that slot from the
//! current contents of the others. The solver re-evaluates the whole
//! list until a pass leaves every slot unchanged.

pub mod env;
pub use env::*;
pub mod equation;
pub use equation::*;
pub mod lattice;
pub use lattice::*;
pub mod point;
pub use point::*;
pub mod solver;
pub use solver::*;
