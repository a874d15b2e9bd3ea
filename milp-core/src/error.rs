//! Error types for the LP core.

use thiserror::Error;

/// Errors raised before or outside of a simplex solve.
///
/// Infeasibility and unboundedness are solve *outcomes* and are reported
/// through [`crate::SolveStatus`], not through this type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LpError {
    /// Model data is inconsistent (coefficient length mismatch, NaN, ...).
    #[error("Malformed model: {0}")]
    MalformedModel(String),

    /// A token or argument could not be interpreted.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for LP core operations.
pub type LpResult<T> = Result<T, LpError>;
