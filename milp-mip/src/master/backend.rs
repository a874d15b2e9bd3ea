//! Relaxation backend trait and types.

use milp_core::{Constraint, LinearModel, Relation, SimplexResult, SolveStatus, StandardRow, Tableau};

use crate::error::MipResult;

/// Status of a relaxation solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MasterStatus {
    /// Optimal solution found.
    Optimal,

    /// Relaxation is infeasible (node can be pruned).
    Infeasible,

    /// Relaxation is unbounded.
    Unbounded,

    /// Pivot limit hit before optimality was proven.
    IterationLimit,
}

impl From<SolveStatus> for MasterStatus {
    fn from(status: SolveStatus) -> Self {
        match status {
            SolveStatus::Optimal => MasterStatus::Optimal,
            SolveStatus::Infeasible => MasterStatus::Infeasible,
            SolveStatus::Unbounded => MasterStatus::Unbounded,
            SolveStatus::IterationLimit => MasterStatus::IterationLimit,
        }
    }
}

impl From<MasterStatus> for SolveStatus {
    fn from(status: MasterStatus) -> Self {
        match status {
            MasterStatus::Optimal => SolveStatus::Optimal,
            MasterStatus::Infeasible => SolveStatus::Infeasible,
            MasterStatus::Unbounded => SolveStatus::Unbounded,
            MasterStatus::IterationLimit => SolveStatus::IterationLimit,
        }
    }
}

/// Result from solving a relaxation.
#[derive(Debug, Clone)]
pub struct MasterResult {
    /// Solve status.
    pub status: MasterStatus,

    /// Primal solution x (original variables).
    pub x: Vec<f64>,

    /// Objective value in the model's sense.
    pub obj_val: f64,

    /// Pivots spent.
    pub iterations: usize,

    /// Final tableau, for cut generation.
    pub tableau: Option<Tableau>,

    /// Standard-form rows behind the tableau.
    pub rows: Vec<StandardRow>,
}

impl MasterResult {
    /// Returns true if the relaxation has an optimal point.
    pub fn is_optimal(&self) -> bool {
        self.status == MasterStatus::Optimal
    }
}

impl From<SimplexResult> for MasterResult {
    fn from(r: SimplexResult) -> Self {
        Self {
            status: r.status.into(),
            x: r.x,
            obj_val: r.objective,
            iterations: r.iterations,
            tableau: r.tableau,
            rows: r.rows,
        }
    }
}

/// Source of a cut (for tracking and debugging).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutSource {
    /// Gomory (Chvatal-Gomory) cut from a tableau row.
    Gomory {
        /// Basic variable of the source row.
        source_var: usize,
        /// Cutting-plane round that produced the cut.
        round: usize,
    },

    /// User-provided cut.
    User,
}

/// A linear cut: a^T x <= rhs.
#[derive(Debug, Clone)]
pub struct LinearCut {
    /// Coefficient vector (dense, length n).
    pub coefs: Vec<f64>,

    /// Right-hand side.
    pub rhs: f64,

    /// Source of this cut.
    pub source: CutSource,
}

impl LinearCut {
    /// Create a new cut.
    pub fn new(coefs: Vec<f64>, rhs: f64, source: CutSource) -> Self {
        Self { coefs, rhs, source }
    }

    /// Compute violation: a^T x - rhs (positive means violated).
    pub fn violation(&self, x: &[f64]) -> f64 {
        let lhs: f64 = self.coefs.iter().zip(x.iter()).map(|(a, x)| a * x).sum();
        lhs - self.rhs
    }

    /// Check if cut is violated by more than tolerance.
    pub fn is_violated(&self, x: &[f64], tol: f64) -> bool {
        self.violation(x) > tol
    }

    /// Check if cut has valid coefficients (not all zeros, finite).
    pub fn is_valid(&self) -> bool {
        let has_nonzero = self.coefs.iter().any(|c| c.abs() > 1e-12);
        let all_finite = self.coefs.iter().all(|c| c.is_finite()) && self.rhs.is_finite();
        has_nonzero && all_finite
    }

    /// The cut as a model constraint.
    pub fn to_constraint(&self) -> Constraint {
        Constraint::new(self.coefs.clone(), Relation::LessEq, self.rhs)
    }
}

/// Trait for relaxation backends.
///
/// Every search node owns its own model, so a backend only has to solve
/// whatever model it is handed; it never keeps model state between calls.
pub trait RelaxationBackend {
    /// Solve the continuous relaxation of `model`.
    fn solve(&mut self, model: &LinearModel) -> MipResult<MasterResult>;

    /// Number of relaxations solved so far.
    fn num_solves(&self) -> u64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cut_violation() {
        // Cut: x0 + x1 <= 1
        let cut = LinearCut::new(vec![1.0, 1.0], 1.0, CutSource::User);

        // (0.5, 0.5) satisfies: 0.5 + 0.5 = 1 <= 1
        assert!(!cut.is_violated(&[0.5, 0.5], 1e-6));

        // (0.6, 0.6) violates: 0.6 + 0.6 = 1.2 > 1
        assert!(cut.is_violated(&[0.6, 0.6], 1e-6));

        let viol = cut.violation(&[0.6, 0.6]);
        assert!((viol - 0.2).abs() < 1e-10);
    }

    #[test]
    fn test_cut_validity_and_constraint() {
        let zero = LinearCut::new(vec![0.0, 0.0], 1.0, CutSource::User);
        assert!(!zero.is_valid());

        let cut = LinearCut::new(
            vec![0.0, 1.0],
            2.0,
            CutSource::Gomory {
                source_var: 1,
                round: 1,
            },
        );
        assert!(cut.is_valid());
        let c = cut.to_constraint();
        assert_eq!(c.relation, Relation::LessEq);
        assert_eq!(c.to_string(), "x2 <= 2");
    }

    #[test]
    fn test_status_conversion() {
        assert_eq!(MasterStatus::from(SolveStatus::Unbounded), MasterStatus::Unbounded);
        assert_eq!(SolveStatus::from(MasterStatus::Infeasible), SolveStatus::Infeasible);
    }
}
