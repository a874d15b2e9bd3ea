//! Gomory fractional cuts from the final simplex tableau.
//!
//! For a source row with a fractional basic integer variable,
//!
//! ```text
//! x_B + sum_k a_k z_k = b,   f0 = b - floor(b) in (0, 1)
//! ```
//!
//! rounding every coefficient down gives the Chvatal-Gomory cut
//! `sum_k floor(a_k) z_k <= floor(b)`, valid whenever every column with a
//! nonzero entry in the row is a non-negative integer variable. Each slack
//! column `s_i = sigma_i (b_i - a_i^T x)` is then substituted by its
//! standard-form row so the cut is stated over the original variables.
//! With integral model data the result has integral coefficients.
//!
//! At the current vertex the cut's left-hand side equals `b`, so the
//! violation is exactly `f0 > 0`.

use std::fmt;

use milp_core::util::numerics::{frac_part, is_integral, snapped_floor};
use milp_core::StandardRow;

use crate::master::{CutSource, LinearCut, MasterResult};

/// Why no cut could be derived this round.
#[derive(Debug, Clone, PartialEq)]
pub enum CutFailure {
    /// Relaxation carries no tableau (not optimal).
    NoTableau,

    /// No fractional integer variable has a usable unit row.
    NoSourceRow,

    /// Right-hand-side fraction is within tolerance of 0 or 1.
    Degenerate {
        /// Source variable.
        var: usize,
        /// Fractional part of the row's RHS.
        frac: f64,
    },

    /// Rounding produced a cut with no nonzero coefficient.
    Trivial {
        /// Source variable.
        var: usize,
    },
}

impl fmt::Display for CutFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CutFailure::NoTableau => write!(f, "relaxation has no tableau"),
            CutFailure::NoSourceRow => {
                write!(f, "no tableau row found for a fractional integer variable")
            }
            CutFailure::Degenerate { var, frac } => write!(
                f,
                "fractional part {:.6} of the row for x{} is too close to an integer",
                frac,
                var + 1
            ),
            CutFailure::Trivial { var } => {
                write!(f, "cut from the row for x{} has no nonzero coefficient", var + 1)
            }
        }
    }
}

/// A derived cut with its provenance.
#[derive(Debug, Clone)]
pub struct GomoryCut {
    /// The cut `a^T x <= rhs` over original variables.
    pub cut: LinearCut,

    /// Basic variable of the source row.
    pub source_var: usize,

    /// Tableau row index.
    pub source_row: usize,

    /// Fractional part of the source row's RHS (the cut's violation at the vertex).
    pub rhs_frac: f64,
}

/// Gomory cut generator.
#[derive(Debug, Clone)]
pub struct GomoryGenerator {
    /// Integrality / degeneracy tolerance.
    int_tol: f64,

    /// Snapping tolerance for tableau entries.
    coef_tol: f64,
}

impl GomoryGenerator {
    /// Create a generator with the given integrality tolerance.
    pub fn new(int_tol: f64) -> Self {
        Self {
            int_tol,
            coef_tol: 1e-9,
        }
    }

    /// Derive a cut from the first fractional integer variable with a usable row.
    pub fn generate(
        &self,
        relax: &MasterResult,
        integer_vars: &[usize],
        round: usize,
    ) -> Result<GomoryCut, CutFailure> {
        let tableau = relax.tableau.as_ref().ok_or(CutFailure::NoTableau)?;
        let n = tableau.num_original();
        let m = tableau.num_slack();

        let is_int_var = |j: usize| integer_vars.contains(&j);
        let int_slack: Vec<bool> = relax
            .rows
            .iter()
            .map(|r| slack_is_integral(r, &is_int_var, self.coef_tol))
            .collect();

        for &var in integer_vars {
            let Some(&val) = relax.x.get(var) else { continue };
            if is_integral(val, self.int_tol) {
                continue;
            }
            let Some(row) = tableau.basic_row(var, self.coef_tol) else {
                log::debug!("x{} has no unit column", var + 1);
                continue;
            };

            // Every column present in the row must be an integer column
            let entries = tableau.row_entries(row);
            let usable = entries.iter().enumerate().all(|(k, &a)| {
                a.abs() <= self.coef_tol
                    || if k < n {
                        is_int_var(k)
                    } else {
                        int_slack.get(k - n).copied().unwrap_or(false)
                    }
            });
            if !usable {
                log::debug!("row {} mixes continuous columns, skipped", row);
                continue;
            }

            let b = tableau.rhs(row);
            let f0 = frac_part(b, self.coef_tol);
            if f0 <= self.int_tol || f0 >= 1.0 - self.int_tol {
                return Err(CutFailure::Degenerate { var, frac: f0 });
            }

            // Rounded row: sum floor(a_k) z_k <= floor(b)
            let mut coefs = vec![0.0; n];
            let mut rhs = snapped_floor(b, self.coef_tol);
            for (k, &a) in entries.iter().enumerate().take(n + m) {
                let g = snapped_floor(a, self.coef_tol);
                if g == 0.0 {
                    continue;
                }
                if k < n {
                    coefs[k] += g;
                } else if let Some(sr) = relax.rows.get(k - n) {
                    // s = sigma (b' - a'^T x)
                    for (j, &aj) in sr.coefs.iter().enumerate() {
                        coefs[j] -= g * sr.slack_sign * aj;
                    }
                    rhs -= g * sr.slack_sign * sr.rhs;
                }
            }

            let coefs: Vec<f64> = coefs.into_iter().map(|c| clean(c, self.coef_tol)).collect();
            let cut = LinearCut::new(
                coefs,
                clean(rhs, self.coef_tol),
                CutSource::Gomory {
                    source_var: var,
                    round,
                },
            );
            if !cut.is_valid() {
                return Err(CutFailure::Trivial { var });
            }

            return Ok(GomoryCut {
                cut,
                source_var: var,
                source_row: row,
                rhs_frac: f0,
            });
        }

        Err(CutFailure::NoSourceRow)
    }
}

/// A slack is integral when its row has integral data over integer variables only.
fn slack_is_integral(row: &StandardRow, is_int_var: &impl Fn(usize) -> bool, tol: f64) -> bool {
    row.slack_sign != 0.0
        && is_integral(row.rhs, tol)
        && row
            .coefs
            .iter()
            .enumerate()
            .all(|(j, &a)| a == 0.0 || (is_int_var(j) && is_integral(a, tol)))
}

/// Snap near-integers and flush negative zero.
fn clean(v: f64, tol: f64) -> f64 {
    let r = v.round();
    let v = if (v - r).abs() <= tol { r } else { v };
    if v == 0.0 {
        0.0
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::master::{RelaxationBackend, SimplexBackend};
    use milp_core::{LinearModel, ObjectiveSense, Relation, SimplexSettings};

    fn relax(model: &LinearModel) -> MasterResult {
        SimplexBackend::new(SimplexSettings::default())
            .solve(model)
            .unwrap()
    }

    /// max x2 s.t. 3x1 + 2x2 <= 6, -3x1 + 2x2 <= 0; LP optimum (1, 1.5).
    fn triangle() -> LinearModel {
        LinearModel::new(ObjectiveSense::Maximize, vec![0.0, 1.0])
            .subject_to(vec![3.0, 2.0], Relation::LessEq, 6.0)
            .subject_to(vec![-3.0, 2.0], Relation::LessEq, 0.0)
    }

    #[test]
    fn test_cut_excludes_vertex_and_keeps_integer_points() {
        let model = triangle();
        let r = relax(&model);
        assert!((r.x[1] - 1.5).abs() < 1e-9);

        let g = GomoryGenerator::new(1e-4)
            .generate(&r, &[0, 1], 1)
            .unwrap();
        assert_eq!(g.source_var, 1);
        assert!((g.rhs_frac - 0.5).abs() < 1e-9);

        // Violated by exactly f0 at the vertex
        assert!((g.cut.violation(&r.x) - 0.5).abs() < 1e-9);

        // Integral data
        assert!(g.cut.coefs.iter().all(|c| c.fract() == 0.0));
        assert_eq!(g.cut.rhs.fract(), 0.0);

        // Every integer point of the model survives
        for x1 in 0..=3 {
            for x2 in 0..=3 {
                let p = [x1 as f64, x2 as f64];
                if model.is_feasible_point(&p, 1e-9) {
                    assert!(g.cut.violation(&p) <= 1e-9, "cut removes {:?}", p);
                }
            }
        }
    }

    #[test]
    fn test_integral_relaxation_has_no_source_row() {
        let model = LinearModel::new(ObjectiveSense::Maximize, vec![1.0, 1.0])
            .subject_to(vec![1.0, 0.0], Relation::LessEq, 2.0)
            .subject_to(vec![0.0, 1.0], Relation::LessEq, 3.0);
        let r = relax(&model);
        let err = GomoryGenerator::new(1e-4)
            .generate(&r, &[0, 1], 1)
            .unwrap_err();
        assert_eq!(err, CutFailure::NoSourceRow);
    }

    #[test]
    fn test_continuous_column_row_is_skipped() {
        // x2 continuous appears in x1's row: no valid rounding
        let model = LinearModel::new(ObjectiveSense::Maximize, vec![1.0, 1.0])
            .subject_to(vec![2.0, 1.0], Relation::LessEq, 3.0)
            .subject_to(vec![0.0, 1.0], Relation::LessEq, 0.5);
        let r = relax(&model);
        assert!((r.x[0] - 1.25).abs() < 1e-9);

        let err = GomoryGenerator::new(1e-4).generate(&r, &[0], 1).unwrap_err();
        assert_eq!(err, CutFailure::NoSourceRow);
    }

    #[test]
    fn test_missing_tableau() {
        let r = MasterResult {
            status: crate::master::MasterStatus::Infeasible,
            x: vec![0.5],
            obj_val: f64::NAN,
            iterations: 0,
            tableau: None,
            rows: Vec::new(),
        };
        let err = GomoryGenerator::new(1e-4).generate(&r, &[0], 1).unwrap_err();
        assert_eq!(err, CutFailure::NoTableau);
        assert_eq!(err.to_string(), "relaxation has no tableau");
    }

    #[test]
    fn test_clean() {
        assert_eq!(clean(-0.0, 1e-9), 0.0);
        assert!(clean(-0.0, 1e-9).is_sign_positive());
        assert_eq!(clean(2.9999999999, 1e-9), 3.0);
        assert_eq!(clean(0.25, 1e-9), 0.25);
    }
}
