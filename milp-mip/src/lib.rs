//! Mixed-integer layer of the MILP workspace.
//!
//! Three solvers sit on top of the [`milp_core`] simplex engine:
//!
//! - **Branch-and-Bound**: best-first (or depth-first) tree search over
//!   single-variable bound splits, each node owning its own model copy
//! - **Cutting Planes**: one working model refined by Gomory cuts derived
//!   from the final simplex tableau
//! - **Knapsack**: a self-contained 0/1 knapsack branch-and-bound with a
//!   fractional bound
//!
//! Every solve returns a [`SolveTrace`] alongside its result; its `Display`
//! impl is the human-readable audit log.
//!
//! # Example
//!
//! ```
//! use milp_core::{LinearModel, ObjectiveSense, Relation};
//! use milp_mip::{solve_mip, MipSettings, MipStatus};
//!
//! // max 5x1 + 4x2 s.t. 6x1 + 4x2 <= 24, x1 + 2x2 <= 6, integer
//! let model = LinearModel::new(ObjectiveSense::Maximize, vec![5.0, 4.0])
//!     .subject_to(vec![6.0, 4.0], Relation::LessEq, 24.0)
//!     .subject_to(vec![1.0, 2.0], Relation::LessEq, 6.0);
//!
//! let sol = solve_mip(model, &MipSettings::default())?;
//! assert_eq!(sol.status, MipStatus::Optimal);
//! assert!((sol.obj_val - 20.0).abs() < 1e-9);
//! # Ok::<(), milp_mip::MipError>(())
//! ```

#![warn(missing_docs)]

pub mod cuts;
pub mod error;
pub mod knapsack;
pub mod master;
pub mod model;
pub mod search;
pub mod settings;
pub mod trace;

pub use cuts::{CutFailure, CutPool, CuttingPlane, GomoryCut, GomoryGenerator};
pub use error::{MipError, MipResult};
pub use knapsack::{KnapsackProblem, KnapsackSolution, KnapsackSolver};
pub use master::{RelaxationBackend, SimplexBackend};
pub use model::{MipProblem, MipSolution, MipStatus, SolveRecord};
pub use search::BranchAndBound;
pub use settings::{BranchingRule, MipSettings, NodeSelection};
pub use trace::{FathomReason, SolveTrace, TraceEvent};

use milp_core::{LinearModel, ObjectiveSense};

/// Solve a MILP by branch-and-bound.
///
/// Integer-restricted variables are those tagged `int`/`bin`; when none is
/// tagged, every variable is.
pub fn solve_mip(model: LinearModel, settings: &MipSettings) -> MipResult<MipSolution> {
    let problem = MipProblem::new(model)?;
    BranchAndBound::new(problem, settings.clone()).solve()
}

/// Solve a MILP by Gomory cutting planes.
pub fn solve_cutting_plane(model: LinearModel, settings: &MipSettings) -> MipResult<MipSolution> {
    let problem = MipProblem::new(model)?;
    CuttingPlane::new(problem, settings.clone()).solve()
}

/// Solve a 0/1 knapsack.
///
/// `sense` is `"max"` or `"min"` (case-insensitive).
pub fn solve_knapsack(
    values: &[f64],
    weights: &[f64],
    capacity: f64,
    sense: &str,
) -> MipResult<KnapsackSolution> {
    let sense: ObjectiveSense = sense.parse()?;
    let problem = KnapsackProblem::new(values.to_vec(), weights.to_vec(), capacity, sense)?;
    Ok(KnapsackSolver::new(problem).solve())
}
