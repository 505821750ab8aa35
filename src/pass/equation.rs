//! The equation abstraction shared by every analysis.

use super::{Environment, Lattice, Point};
use crate::errors::SolveError;

/// One dataflow equation: `slot = f(environment)`.
///
/// An implementation says which slot it owns (`point`) and how to
/// recompute it (`eval_aux`). `eval_aux` may read any slot, including
/// ones not yet refreshed in the current pass; the solver makes no
/// ordering promises within a pass.
pub trait Equation {
    type L: Lattice;

    /// The slot this equation writes.
    fn point(&self) -> Point;

    /// The slot's textual key, `IN_<id>` or `OUT_<id>`.
    fn name(&self) -> String {
        self.point().to_string()
    }

    /// Compute what the slot should contain under `env`. Must be
    /// monotone in `env`.
    fn eval_aux(&self, env: &Environment<Self::L>) -> Result<Self::L, SolveError>;

    /// Recompute the slot and store it. Returns whether the stored
    /// value changed. Implementations should not override this.
    fn eval(&self, env: &mut Environment<Self::L>) -> Result<bool, SolveError> {
        let value = self.eval_aux(env)?;
        env.update(self.point(), value)
    }
}
