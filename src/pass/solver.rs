//! Round-robin fixpoint iteration over an equation list.

use super::{Environment, Equation, Lattice};
use crate::errors::SolveError;

/// Knobs for the fixpoint solver.
#[derive(Clone, Debug, Default)]
pub struct SolverOptions {
    /// Give up with `SolveError::NotConverged` after this many passes.
    /// `None` iterates until a fixpoint however long that takes; the
    /// bundled analyses replace it with their lattice-height bound.
    pub max_passes: Option<usize>,
}

impl SolverOptions {
    pub fn with_max_passes(max_passes: usize) -> Self {
        SolverOptions {
            max_passes: Some(max_passes),
        }
    }

    /// Fill in a pass limit for `equations` equations whose slots can
    /// each hold at most `facts` facts. Every pass but the last grows
    /// some slot by at least one fact, so `equations * facts + 1`
    /// passes always suffice for a monotone system.
    pub fn or_height_bound(&self, equations: usize, facts: usize) -> SolverOptions {
        SolverOptions {
            max_passes: Some(self.max_passes.unwrap_or_else(|| {
                equations.saturating_mul(facts).saturating_add(1)
            })),
        }
    }
}

/// A solved equation system.
#[derive(Clone, Debug)]
pub struct Solution<L: Lattice> {
    pub env: Environment<L>,
    /// Passes run, including the final pass that changed nothing.
    pub passes: usize,
}

/// Compute the least fixpoint of `equations`.
///
/// Every slot starts at `top`; each pass evaluates every equation once
/// in list order. Iteration stops after the first pass in which no
/// equation changed its slot.
pub fn solve<E: Equation>(
    equations: &[E],
    options: &SolverOptions,
) -> Result<Solution<E::L>, SolveError> {
    let mut env = Environment::new(equations.iter().map(|eq| eq.point()))?;
    let mut passes = 0;
    loop {
        if let Some(max) = options.max_passes {
            if passes >= max {
                log::debug!("solve: giving up after {} passes", passes);
                return Err(SolveError::NotConverged { passes });
            }
        }
        passes += 1;

        let mut changed = 0;
        for eq in equations {
            if eq.eval(&mut env)? {
                log::trace!("pass {}: {} changed", passes, eq.point());
                changed += 1;
            }
        }
        log::debug!(
            "solve: pass {}: {} of {} equations changed",
            passes,
            changed,
            equations.len()
        );

        if changed == 0 {
            return Ok(Solution { env, passes });
        }
    }
}
