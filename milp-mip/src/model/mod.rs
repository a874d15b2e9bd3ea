//! Problem and solution types for the MIP solvers.

mod problem;
mod solution;

pub use problem::MipProblem;
pub use solution::{compute_gap, IncumbentTracker, MipSolution, MipStatus, SolveRecord};
