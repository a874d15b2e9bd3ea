//! Relaxation backend using the milp-core tableau simplex.

use milp_core::{solve, LinearModel, SimplexSettings};

use super::{MasterResult, RelaxationBackend};
use crate::error::MipResult;

/// Relaxation backend using the two-phase simplex from milp-core.
#[derive(Debug, Clone)]
pub struct SimplexBackend {
    /// Solver settings.
    settings: SimplexSettings,

    /// Relaxations solved.
    solves: u64,
}

impl SimplexBackend {
    /// Create a new simplex backend.
    pub fn new(settings: SimplexSettings) -> Self {
        Self {
            settings,
            solves: 0,
        }
    }
}

impl RelaxationBackend for SimplexBackend {
    fn solve(&mut self, model: &LinearModel) -> MipResult<MasterResult> {
        let result = solve(model, &self.settings)?;
        self.solves += 1;
        Ok(result.into())
    }

    fn num_solves(&self) -> u64 {
        self.solves
    }
}
