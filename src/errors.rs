//! Error types.

use crate::ir::Inst;
use crate::pass::Point;

/// An error that occurs while building an instruction graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GraphError {
    /// The edge is already present. Edge lists are sets in practice,
    /// and a duplicate would double-count a predecessor.
    DuplicateEdge { from: Inst, to: Inst },
    /// A branch target was set twice. `taken` says which one: the
    /// target for a true condition, or the one for a false condition.
    TargetAlreadySet { branch: Inst, taken: bool },
    /// A true edge was added to an instruction that is not a branch.
    NotABranch(Inst),
    /// The instruction was not allocated by this graph.
    UnknownInst(Inst),
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            GraphError::DuplicateEdge { from, to } => {
                write!(f, "duplicate edge {} -> {}", from, to)
            }
            GraphError::TargetAlreadySet { branch, taken } => {
                write!(f, "branch {} already has a {} target", branch, taken)
            }
            GraphError::NotABranch(inst) => write!(f, "{} is not a branch", inst),
            GraphError::UnknownInst(inst) => write!(f, "unknown instruction {}", inst),
        }
    }
}

impl std::error::Error for GraphError {}

/// An error that occurs while solving an equation system. All of
/// these indicate a malformed equation set; a partially solved
/// environment is never returned alongside one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SolveError {
    /// An equation read or wrote a slot that no equation owns.
    MissingPoint(Point),
    /// Two equations write the same slot.
    DuplicatePoint(Point),
    /// The iteration cap was reached before a fixpoint.
    NotConverged { passes: usize },
}

impl std::fmt::Display for SolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            SolveError::MissingPoint(point) => write!(f, "no equation defines {}", point),
            SolveError::DuplicatePoint(point) => {
                write!(f, "more than one equation defines {}", point)
            }
            SolveError::NotConverged { passes } => {
                write!(f, "no fixpoint reached after {} passes", passes)
            }
        }
    }
}

impl std::error::Error for SolveError {}
