//! Cutting-plane method.
//!
//! - Gomory cut derivation from the final simplex tableau
//! - Cut pool with duplicate detection
//! - The solve / cut / re-solve loop

mod gomory;
mod pool;
mod solver;

pub use gomory::{CutFailure, GomoryCut, GomoryGenerator};
pub use pool::CutPool;
pub use solver::CuttingPlane;
