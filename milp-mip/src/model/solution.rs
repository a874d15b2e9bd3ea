//! MIP solution types.

use milp_core::ObjectiveSense;
use serde::Serialize;

use crate::trace::SolveTrace;

/// Status of a MIP solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MipStatus {
    /// Optimal integer solution found.
    Optimal,

    /// Root relaxation is infeasible, or no integer point exists.
    Infeasible,

    /// Root relaxation is unbounded.
    Unbounded,

    /// Node limit reached, best solution returned.
    NodeLimit,

    /// Time limit reached, best solution returned.
    TimeLimit,

    /// Cutting-plane loop could not derive another useful cut.
    CutsExhausted,

    /// Cutting-plane round limit, or simplex pivot limit at the root.
    IterationLimit,
}

impl MipStatus {
    /// Returns true if the search may have stopped with an incumbent.
    pub fn has_solution(&self) -> bool {
        matches!(
            self,
            MipStatus::Optimal | MipStatus::NodeLimit | MipStatus::TimeLimit
        )
    }

    /// Returns true if optimality was proven.
    pub fn is_optimal(&self) -> bool {
        matches!(self, MipStatus::Optimal)
    }
}

impl std::fmt::Display for MipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MipStatus::Optimal => "Optimal",
            MipStatus::Infeasible => "Infeasible",
            MipStatus::Unbounded => "Unbounded",
            MipStatus::NodeLimit => "Node Limit",
            MipStatus::TimeLimit => "Time Limit",
            MipStatus::CutsExhausted => "Cuts Exhausted",
            MipStatus::IterationLimit => "Iteration Limit",
        };
        write!(f, "{}", s)
    }
}

/// Uniform `{feasible, objective, solution}` record for the export layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveRecord {
    /// An integer-feasible solution was found.
    pub feasible: bool,

    /// Objective of the reported solution.
    pub objective: f64,

    /// Reported solution.
    pub solution: Vec<f64>,
}

/// Complete MIP solution with diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct MipSolution {
    /// Solve status.
    pub status: MipStatus,

    /// Best integer solution; for `CutsExhausted`/`IterationLimit` the last
    /// fractional relaxation point.
    pub x: Vec<f64>,

    /// Objective value of `x`, or the best relaxation objective seen when
    /// cutting planes stop early.
    pub obj_val: f64,

    /// Best relaxation bound still open when the search stopped.
    pub bound: f64,

    /// Number of B&B nodes explored (or cutting-plane rounds).
    pub nodes_explored: u64,

    /// Number of nodes fathomed.
    pub nodes_pruned: u64,

    /// Number of cuts added.
    pub cuts_added: u64,

    /// Number of times incumbent was updated.
    pub incumbent_updates: u64,

    /// Number of simplex solves.
    pub lp_solves: u64,

    /// Total solve time in milliseconds.
    pub solve_time_ms: u64,

    /// Audit log.
    pub trace: SolveTrace,
}

impl MipSolution {
    /// Solution shell with the given status and no point.
    pub fn empty(status: MipStatus, sense: ObjectiveSense) -> Self {
        Self {
            status,
            x: Vec::new(),
            obj_val: sense.worst_value(),
            bound: sense.worst_value(),
            nodes_explored: 0,
            nodes_pruned: 0,
            cuts_added: 0,
            incumbent_updates: 0,
            lp_solves: 0,
            solve_time_ms: 0,
            trace: SolveTrace::new(),
        }
    }

    /// Check if an integer-feasible point is reported.
    pub fn has_solution(&self) -> bool {
        self.status.has_solution() && !self.x.is_empty()
    }

    /// Alias used by the export record.
    pub fn feasible(&self) -> bool {
        self.has_solution()
    }

    /// Relative gap between incumbent and bound.
    pub fn gap(&self) -> f64 {
        compute_gap(self.obj_val, self.bound)
    }

    /// Export record.
    pub fn record(&self) -> SolveRecord {
        SolveRecord {
            feasible: self.feasible(),
            objective: self.obj_val,
            solution: self.x.clone(),
        }
    }
}

/// Relative gap `|primal - dual| / max(|primal|, 1e-10)`.
pub fn compute_gap(primal: f64, dual: f64) -> f64 {
    if !primal.is_finite() || !dual.is_finite() {
        return f64::INFINITY;
    }
    let denom = primal.abs().max(1e-10);
    (primal - dual).abs() / denom
}

/// Tracks the best known integer-feasible solution (incumbent).
#[derive(Debug, Clone)]
pub struct IncumbentTracker {
    /// Optimization direction.
    pub sense: ObjectiveSense,

    /// Current best solution (if any).
    pub solution: Option<Vec<f64>>,

    /// Objective value of incumbent.
    /// Starts at -inf when maximizing and +inf when minimizing.
    pub obj_val: f64,

    /// Number of times incumbent was updated.
    pub update_count: u64,

    tol: f64,
}

impl IncumbentTracker {
    /// Create a new incumbent tracker; candidates must beat it by more than `tol`.
    pub fn new(sense: ObjectiveSense, tol: f64) -> Self {
        Self {
            sense,
            solution: None,
            obj_val: sense.worst_value(),
            update_count: 0,
            tol,
        }
    }

    /// Check if we have an incumbent.
    pub fn has_incumbent(&self) -> bool {
        self.solution.is_some()
    }

    /// Check if a relaxation value could still beat the incumbent.
    ///
    /// Always true before the first incumbent exists.
    pub fn can_improve(&self, relaxed_obj: f64) -> bool {
        !self.has_incumbent() || self.sense.is_better(relaxed_obj, self.obj_val, self.tol)
    }

    /// Try to update incumbent with a new solution.
    ///
    /// Returns true if the incumbent was improved.
    pub fn update(&mut self, x: &[f64], obj: f64) -> bool {
        if self.can_improve(obj) {
            self.solution = Some(x.to_vec());
            self.obj_val = obj;
            self.update_count += 1;
            true
        } else {
            false
        }
    }
}
