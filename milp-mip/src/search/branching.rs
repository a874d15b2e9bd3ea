//! Branching variable selection.

use super::BoundChange;
use crate::model::MipProblem;
use crate::settings::BranchingRule;

/// A branching decision.
#[derive(Debug, Clone)]
pub struct BranchDecision {
    /// Variable to branch on.
    pub var: usize,

    /// Current (fractional) value.
    pub value: f64,

    /// Bound change for "down" branch (x <= floor(value)).
    pub down_branch: BoundChange,

    /// Bound change for "up" branch (x >= ceil(value)).
    pub up_branch: BoundChange,

    /// Fractionality of the chosen variable.
    pub score: f64,
}

/// Fractionalities closer than this are ties.
const TIE_TOL: f64 = 1e-9;

/// Branching variable selector.
#[derive(Debug, Clone)]
pub struct BranchingSelector {
    rule: BranchingRule,
}

impl BranchingSelector {
    /// Create a selector for `rule`.
    pub fn new(rule: BranchingRule) -> Self {
        Self { rule }
    }

    /// Select a branching variable.
    ///
    /// Returns None if the solution is integer-feasible.
    pub fn select(&self, x: &[f64], prob: &MipProblem, tol: f64) -> Option<BranchDecision> {
        // Fractional integer variables, in increasing index order
        let fractional = prob.get_fractional_vars(x, tol);

        let (var, value, frac) = match self.rule {
            BranchingRule::MostFractional => Self::most_fractional(&fractional)?,
            BranchingRule::FirstFractional => fractional.first().copied()?,
        };

        Some(Self::make_decision(var, value, frac))
    }

    /// Largest distance to the nearest integer; lowest index on ties.
    fn most_fractional(fractional: &[(usize, f64, f64)]) -> Option<(usize, f64, f64)> {
        let mut best: Option<(usize, f64, f64)> = None;
        for &cand in fractional {
            if best.map_or(true, |(_, _, f)| cand.2 > f + TIE_TOL) {
                best = Some(cand);
            }
        }
        best
    }

    /// Create a branch decision for a variable.
    fn make_decision(var: usize, value: f64, score: f64) -> BranchDecision {
        BranchDecision {
            var,
            value,
            down_branch: BoundChange::down_branch(var, value),
            up_branch: BoundChange::up_branch(var, value),
            score,
        }
    }
}
