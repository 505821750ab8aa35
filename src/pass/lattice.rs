//! Lattice trait definition and the set lattice used by the bundled
//! analyses.

use std::collections::BTreeSet;
use std::fmt::Debug;

/// A lattice type used for an analysis.
///
/// `top` is the value every slot starts from. The `meet` operator
/// combines facts arriving from several program points, and must be
/// commutative, associative and idempotent. Equality is value
/// equality: the solver compares the old and new value of a slot to
/// decide whether anything changed.
///
/// The solver only terminates if every chain of strictly changing
/// values is finite, and if each equation's transfer function is
/// monotone over the lattice order.
pub trait Lattice: Clone + Debug + PartialEq {
    /// Return the `top` lattice value.
    fn top() -> Self;
    /// Mutate self to `meet(self, other)`. Returns `true` if any
    /// changes occurred.
    fn meet_with(&mut self, other: &Self) -> bool;
}

/// Finite sets ordered by inclusion, for may-analyses. `top` is the
/// empty set and `meet` is union.
impl<T: Ord + Clone + Debug> Lattice for BTreeSet<T> {
    fn top() -> Self {
        BTreeSet::new()
    }

    fn meet_with(&mut self, other: &Self) -> bool {
        let before = self.len();
        self.extend(other.iter().cloned());
        self.len() != before
    }
}
