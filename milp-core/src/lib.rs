//! Linear models and a two-phase tableau simplex engine.
//!
//! This crate is the continuous core of the MILP workspace. It provides:
//!
//! - **Linear Model**: objective sense, objective coefficients, constraints
//!   and sign-restriction tags, with deep-copy semantics for branching
//! - **Simplex Engine**: a dense tableau simplex (phase one with artificial
//!   variables, phase two with Dantzig pricing and a Bland fallback) that
//!   reports optimal, infeasible, unbounded and iteration-limited outcomes
//!   and exposes its final tableau to cut generators
//!
//! # Example
//!
//! ```
//! use milp_core::{solve, LinearModel, ObjectiveSense, Relation, SimplexSettings, SolveStatus};
//!
//! // max 2x1 + 3x2 s.t. x1 + x2 <= 4, x1 <= 2, x2 <= 2
//! let model = LinearModel::new(ObjectiveSense::Maximize, vec![2.0, 3.0])
//!     .subject_to(vec![1.0, 1.0], Relation::LessEq, 4.0)
//!     .subject_to(vec![1.0, 0.0], Relation::LessEq, 2.0)
//!     .subject_to(vec![0.0, 1.0], Relation::LessEq, 2.0);
//!
//! let result = solve(&model, &SimplexSettings::default())?;
//! assert_eq!(result.status, SolveStatus::Optimal);
//! assert!((result.objective - 10.0).abs() < 1e-9);
//! # Ok::<(), milp_core::LpError>(())
//! ```

#![warn(clippy::all)]

pub mod error;
pub mod problem;
pub mod simplex;
pub mod util;

// Re-export main types
pub use error::{LpError, LpResult};
pub use problem::{
    Constraint, LinearModel, ObjectiveSense, Relation, SignRestriction, SimplexSettings,
    SolveStatus,
};
pub use simplex::{solve, SimplexResult, StandardRow, Tableau};
