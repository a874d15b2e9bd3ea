//! Relaxation (master LP) management.

mod backend;
mod simplex_backend;

pub use backend::{CutSource, LinearCut, MasterResult, MasterStatus, RelaxationBackend};
pub use simplex_backend::SimplexBackend;
