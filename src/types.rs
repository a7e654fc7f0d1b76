//! Core types shared across the crate.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The direction of optimization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Minimize the result (errors, losses).
    #[default]
    Minimize,
    /// Maximize the result (scores, accuracies).
    Maximize,
}

impl Direction {
    /// Returns `true` if `a` is strictly better than `b` in this direction.
    #[must_use]
    pub fn is_better(self, a: f64, b: f64) -> bool {
        match self {
            Direction::Minimize => a < b,
            Direction::Maximize => a > b,
        }
    }

    /// Converts the `minimization_problem` flag used by experiment records.
    #[must_use]
    pub fn from_minimization(minimization_problem: bool) -> Self {
        if minimization_problem {
            Direction::Minimize
        } else {
            Direction::Maximize
        }
    }
}

/// The lifecycle partition a candidate currently belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CandidateState {
    /// Proposed (or paused) and waiting for a worker.
    Pending,
    /// Currently being evaluated.
    Working,
    /// Evaluation finished, successfully or not.
    Finished,
}
