//! Error types for the MIP solver.

use milp_core::LpError;
use thiserror::Error;

/// Errors that can occur during MIP solving.
///
/// Node-level infeasibility, unboundedness and degenerate cuts are search
/// outcomes, not errors; they appear in [`crate::MipStatus`] and the trace.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MipError {
    /// Knapsack data is inconsistent
    #[error("Invalid knapsack: {0}")]
    InvalidKnapsack(String),

    /// Error raised by the LP core (malformed model, bad token)
    #[error("LP core error: {0}")]
    Core(#[from] LpError),
}

/// Result type for MIP operations.
pub type MipResult<T> = Result<T, MipError>;
