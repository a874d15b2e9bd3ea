//! Cutting-plane loop.
//!
//! Solve, test integrality, add one Gomory cut, re-solve from scratch. The
//! working model is a single copy of the input that only ever grows.

use std::time::Instant;

use milp_core::SolveStatus;

use super::{CutPool, GomoryGenerator};
use crate::error::MipResult;
use crate::master::{RelaxationBackend, SimplexBackend};
use crate::model::{MipProblem, MipSolution, MipStatus};
use crate::settings::MipSettings;
use crate::trace::{SolveTrace, TraceEvent};

/// Cutting-plane controller.
pub struct CuttingPlane<B: RelaxationBackend = SimplexBackend> {
    problem: MipProblem,
    backend: B,
    generator: GomoryGenerator,
    pool: CutPool,
    settings: MipSettings,
    trace: SolveTrace,
}

impl CuttingPlane<SimplexBackend> {
    /// Create a controller using the simplex backend.
    pub fn new(problem: MipProblem, settings: MipSettings) -> Self {
        let backend = SimplexBackend::new(settings.simplex.clone());
        Self::with_backend(problem, settings, backend)
    }
}

impl<B: RelaxationBackend> CuttingPlane<B> {
    /// Create a controller with an explicit relaxation backend.
    pub fn with_backend(problem: MipProblem, settings: MipSettings, backend: B) -> Self {
        Self {
            generator: GomoryGenerator::new(settings.cut_int_tol),
            pool: CutPool::new(),
            problem,
            backend,
            settings,
            trace: SolveTrace::new(),
        }
    }

    /// Run the loop until an integer point, a failure, or the round limit.
    pub fn solve(mut self) -> MipResult<MipSolution> {
        let start = Instant::now();
        let sense = self.problem.sense();
        let mut model = self.problem.model.clone();

        let mut best_obj = sense.worst_value();
        let mut last_obj = sense.worst_value();
        let mut last_x: Vec<f64> = Vec::new();
        let mut solution: Option<(Vec<f64>, f64)> = None;
        let mut rounds = 0;

        let status = loop {
            if rounds >= self.settings.max_cut_rounds {
                break MipStatus::IterationLimit;
            }
            rounds += 1;

            let relax = self.backend.solve(&model)?;
            let lp_status: SolveStatus = relax.status.into();
            self.trace.push(TraceEvent::CutRound {
                round: rounds,
                status: lp_status,
                objective: relax.obj_val,
                x: relax.x.clone(),
            });

            match lp_status {
                SolveStatus::Optimal => {}
                SolveStatus::Infeasible => break MipStatus::Infeasible,
                SolveStatus::Unbounded => break MipStatus::Unbounded,
                SolveStatus::IterationLimit => break MipStatus::IterationLimit,
            }

            if sense.is_better(relax.obj_val, best_obj, 0.0) {
                best_obj = relax.obj_val;
            }
            last_obj = relax.obj_val;
            last_x = relax.x.clone();

            if self
                .problem
                .is_integer_feasible(&relax.x, self.settings.cut_int_tol)
            {
                let mut x = relax.x.clone();
                self.problem.round_integers(&mut x);
                let obj = self.problem.model.evaluate(&x);
                self.trace.push(TraceEvent::IncumbentUpdated {
                    node: rounds as u64,
                    objective: obj,
                });
                solution = Some((x, obj));
                break MipStatus::Optimal;
            }

            let gomory = match self
                .generator
                .generate(&relax, &self.problem.integer_vars, rounds)
            {
                Ok(g) => g,
                Err(failure) => {
                    self.trace.push(TraceEvent::CutFailed {
                        round: rounds,
                        reason: failure.to_string(),
                    });
                    break MipStatus::CutsExhausted;
                }
            };

            if !gomory.cut.is_violated(&relax.x, self.settings.bound_tol) {
                self.trace.push(TraceEvent::CutFailed {
                    round: rounds,
                    reason: "cut does not separate the vertex".to_string(),
                });
                break MipStatus::CutsExhausted;
            }

            let (_, duplicate) = self.pool.add(gomory.cut.clone(), rounds);
            if duplicate {
                self.trace.push(TraceEvent::CutFailed {
                    round: rounds,
                    reason: "cut repeats an earlier cut".to_string(),
                });
                break MipStatus::CutsExhausted;
            }

            let row = gomory.cut.to_constraint();
            model.add_constraint(row.clone())?;
            self.trace.push(TraceEvent::CutAdded {
                round: rounds,
                source_var: gomory.source_var,
                cut: row,
            });

            if self.settings.verbose && (rounds as u64) % self.settings.log_freq.max(1) == 0 {
                log::info!(
                    "Round {} | LP obj: {:.6e} | cuts: {}",
                    rounds,
                    relax.obj_val,
                    self.pool.len()
                );
            }
        };

        let mut out = MipSolution::empty(status, sense);
        match (status, solution) {
            (MipStatus::Optimal, Some((x, obj))) => {
                out.x = x;
                out.obj_val = obj;
                out.bound = obj;
                out.incumbent_updates = 1;
            }
            (MipStatus::CutsExhausted | MipStatus::IterationLimit, _) => {
                out.x = last_x;
                out.obj_val = best_obj;
                out.bound = last_obj;
            }
            _ => {}
        }

        if self.settings.verbose {
            log::info!(
                "Cutting planes finished: {} | obj={:.6e} | rounds={} | cuts={}",
                status,
                out.obj_val,
                rounds,
                self.pool.len()
            );
        }

        out.nodes_explored = rounds as u64;
        out.cuts_added = self.pool.len() as u64;
        out.lp_solves = self.backend.num_solves();
        out.solve_time_ms = start.elapsed().as_millis() as u64;
        out.trace = self.trace;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use milp_core::{LinearModel, ObjectiveSense, Relation};

    /// max x2 s.t. 3x1 + 2x2 <= 6, -3x1 + 2x2 <= 0; integer optimum 1 at (1, 1).
    fn triangle() -> MipProblem {
        let model = LinearModel::new(ObjectiveSense::Maximize, vec![0.0, 1.0])
            .subject_to(vec![3.0, 2.0], Relation::LessEq, 6.0)
            .subject_to(vec![-3.0, 2.0], Relation::LessEq, 0.0);
        MipProblem::new(model).unwrap()
    }

    #[test]
    fn test_cuts_reach_integer_point() {
        let sol = CuttingPlane::new(triangle(), MipSettings::default())
            .solve()
            .unwrap();

        assert_eq!(sol.status, MipStatus::Optimal);
        assert!((sol.obj_val - 1.0).abs() < 1e-9);
        assert_eq!(sol.x, vec![1.0, 1.0]);
        assert!(sol.cuts_added >= 1);
        assert_eq!(sol.lp_solves, sol.nodes_explored);
        assert!(sol.record().feasible);
    }

    #[test]
    fn test_verbose_progress_logging() {
        // Every round hits the progress line
        let sol = CuttingPlane::new(triangle(), MipSettings::verbose())
            .solve()
            .unwrap();

        assert_eq!(sol.status, MipStatus::Optimal);
        assert!((sol.obj_val - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cuts_separate_each_vertex() {
        let sol = CuttingPlane::new(triangle(), MipSettings::default())
            .solve()
            .unwrap();
        assert!(!sol
            .trace
            .events()
            .iter()
            .any(|e| matches!(e, TraceEvent::CutFailed { .. })));
    }

    #[test]
    fn test_integral_relaxation_adds_no_cut() {
        let model = LinearModel::new(ObjectiveSense::Maximize, vec![2.0, 3.0])
            .subject_to(vec![1.0, 1.0], Relation::LessEq, 4.0)
            .subject_to(vec![1.0, 0.0], Relation::LessEq, 2.0)
            .subject_to(vec![0.0, 1.0], Relation::LessEq, 2.0);
        let sol = CuttingPlane::new(MipProblem::new(model).unwrap(), MipSettings::default())
            .solve()
            .unwrap();

        assert_eq!(sol.status, MipStatus::Optimal);
        assert_eq!(sol.cuts_added, 0);
        assert_eq!(sol.nodes_explored, 1);
        assert!((sol.obj_val - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_round_limit() {
        let settings = MipSettings::default().with_max_cut_rounds(1);
        let sol = CuttingPlane::new(triangle(), settings).solve().unwrap();

        assert_eq!(sol.status, MipStatus::IterationLimit);
        assert_eq!(sol.cuts_added, 1);
        assert!((sol.obj_val - 1.5).abs() < 1e-9);
        assert!(!sol.has_solution());
    }

    #[test]
    fn test_infeasible_root() {
        let model = LinearModel::new(ObjectiveSense::Minimize, vec![1.0])
            .subject_to(vec![1.0], Relation::GreaterEq, 3.0)
            .subject_to(vec![1.0], Relation::LessEq, 2.0);
        let sol = CuttingPlane::new(MipProblem::new(model).unwrap(), MipSettings::default())
            .solve()
            .unwrap();
        assert_eq!(sol.status, MipStatus::Infeasible);
        assert!(sol.x.is_empty());
    }

    #[test]
    fn test_continuous_rows_exhaust_cuts() {
        // x2 is continuous and shares the only row with x1
        let model = LinearModel::new(ObjectiveSense::Maximize, vec![1.0, 1.0])
            .subject_to(vec![2.0, 1.0], Relation::LessEq, 3.0)
            .subject_to(vec![0.0, 1.0], Relation::LessEq, 0.5)
            .with_sign_restrictions(vec![
                milp_core::SignRestriction::Integer,
                milp_core::SignRestriction::NonNegative,
            ]);
        let sol = CuttingPlane::new(MipProblem::new(model).unwrap(), MipSettings::default())
            .solve()
            .unwrap();

        assert_eq!(sol.status, MipStatus::CutsExhausted);
        assert!((sol.obj_val - 1.75).abs() < 1e-9);
        assert!(sol
            .trace
            .events()
            .iter()
            .any(|e| matches!(e, TraceEvent::CutFailed { .. })));
    }
}
