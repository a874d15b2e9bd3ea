//! Two-phase tableau simplex method.
//!
//! Rows are normalised to a non-negative right-hand side. `<=` rows start
//! with their slack basic; `>=` and `=` rows get an artificial column and
//! phase one drives the artificials to zero (or proves infeasibility).
//! Phase two then runs the primal simplex on the original objective.
//!
//! Pricing is Dantzig's rule (most negative reduced cost, lowest index on
//! ties); after `bland_after` consecutive degenerate pivots the engine
//! switches to Bland's rule so that degenerate models cannot cycle.

mod tableau;

pub use tableau::Tableau;

use serde::Serialize;

use crate::error::LpResult;
use crate::problem::{LinearModel, Relation, SimplexSettings, SolveStatus};

/// A constraint in standard form: `coefs^T x + slack_sign * s = rhs`, `rhs >= 0`.
///
/// `slack_sign` is +1 for a slack, -1 for a surplus and 0 for an equality
/// (whose slack column stays identically zero).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandardRow {
    /// Coefficients after sign normalisation.
    pub coefs: Vec<f64>,
    /// Coefficient of this row's slack column.
    pub slack_sign: f64,
    /// Non-negative right-hand side.
    pub rhs: f64,
}

impl StandardRow {
    fn from_constraint(coefs: &[f64], relation: Relation, rhs: f64) -> Self {
        let flip = rhs < 0.0 || (rhs == 0.0 && relation == Relation::GreaterEq);
        let (coefs, relation, rhs) = if flip {
            (coefs.iter().map(|a| -a).collect(), relation.flipped(), -rhs)
        } else {
            (coefs.to_vec(), relation, rhs)
        };
        let slack_sign = match relation {
            Relation::LessEq => 1.0,
            Relation::GreaterEq => -1.0,
            Relation::Equal => 0.0,
        };
        Self {
            coefs,
            slack_sign,
            rhs: if rhs == 0.0 { 0.0 } else { rhs },
        }
    }

    /// Whether the row needs an artificial variable to start phase one.
    fn needs_artificial(&self) -> bool {
        self.slack_sign <= 0.0
    }

}

/// Result of one simplex solve.
#[derive(Debug, Clone, Serialize)]
pub struct SimplexResult {
    /// Solve status.
    pub status: SolveStatus,

    /// Values of the original variables (length n, slacks excluded).
    pub x: Vec<f64>,

    /// Objective value c^T x in the model's own sense.
    /// NaN when infeasible, ±∞ when unbounded.
    pub objective: f64,

    /// Pivots performed across both phases.
    pub iterations: usize,

    /// Final tableau (phase-two layout) when phase two was reached.
    #[serde(skip)]
    pub tableau: Option<Tableau>,

    /// Standard-form rows the tableau was built from.
    pub rows: Vec<StandardRow>,
}

impl SimplexResult {
    /// Returns true if an optimal (hence feasible) point was found.
    pub fn is_feasible(&self) -> bool {
        self.status == SolveStatus::Optimal
    }

    fn without_point(status: SolveStatus, n: usize, objective: f64, iterations: usize, rows: Vec<StandardRow>) -> Self {
        Self {
            status,
            x: vec![0.0; n],
            objective,
            iterations,
            tableau: None,
            rows,
        }
    }
}

enum PhaseOutcome {
    Optimal,
    Unbounded(usize),
    IterationLimit,
}

/// Solve the LP relaxation of `model`.
///
/// Pure function of its inputs. Only a malformed model is an error;
/// infeasible, unbounded and iteration-limited solves are statuses.
pub fn solve(model: &LinearModel, settings: &SimplexSettings) -> LpResult<SimplexResult> {
    model.validate()?;

    let n = model.num_vars();
    let m = model.num_constraints();
    let rows: Vec<StandardRow> = model
        .constraints
        .iter()
        .map(|c| StandardRow::from_constraint(&c.coefs, c.relation, c.rhs))
        .collect();
    let num_artificial = rows.iter().filter(|r| r.needs_artificial()).count();

    let mut tableau = Tableau::zeros(m, n, m, num_artificial);
    let rhs_col = tableau.rhs_col();
    let mut art_col = n + m;
    for (i, row) in rows.iter().enumerate() {
        for (j, &a) in row.coefs.iter().enumerate() {
            tableau.set(i, j, a);
        }
        tableau.set(i, n + i, row.slack_sign);
        tableau.set(i, rhs_col, row.rhs);
        if row.needs_artificial() {
            tableau.set(i, art_col, 1.0);
            tableau.set_basic(i, art_col);
            art_col += 1;
        } else {
            tableau.set_basic(i, n + i);
        }
    }

    let mut iterations = 0;

    if num_artificial > 0 {
        // Phase one: minimise the sum of artificials.
        let obj = tableau.objective_row();
        for j in n + m..n + m + num_artificial {
            tableau.set(obj, j, 1.0);
        }
        tableau.canonicalize_objective();

        match run_phase(&mut tableau, settings, &mut iterations) {
            PhaseOutcome::Optimal => {}
            PhaseOutcome::IterationLimit => {
                return Ok(SimplexResult::without_point(
                    SolveStatus::IterationLimit,
                    n,
                    f64::NAN,
                    iterations,
                    rows,
                ));
            }
            PhaseOutcome::Unbounded(col) => {
                // Bounded below by zero; only numerical trouble gets here.
                log::warn!("phase one reported unbounded column {}, treating model as infeasible", col);
                return Ok(SimplexResult::without_point(
                    SolveStatus::Infeasible,
                    n,
                    f64::NAN,
                    iterations,
                    rows,
                ));
            }
        }

        let infeasibility = -tableau.objective_rhs();
        if infeasibility > settings.feas_tol {
            log::debug!("phase one optimum {:.3e} > {:.1e}: infeasible", infeasibility, settings.feas_tol);
            return Ok(SimplexResult::without_point(
                SolveStatus::Infeasible,
                n,
                f64::NAN,
                iterations,
                rows,
            ));
        }

        drive_out_artificials(&mut tableau, settings.pivot_tol);
        tableau = tableau.without_artificials();
    }

    // Phase two objective: w = c (min) or -c (max).
    let sign = model.sense.min_sign();
    let obj = tableau.objective_row();
    for j in 0..tableau.num_cols() {
        tableau.set(obj, j, 0.0);
    }
    let rhs_col = tableau.rhs_col();
    tableau.set(obj, rhs_col, 0.0);
    for (j, &c) in model.objective.iter().enumerate() {
        tableau.set(obj, j, sign * c);
    }
    tableau.canonicalize_objective();

    let outcome = run_phase(&mut tableau, settings, &mut iterations);
    let x = tableau.extract_solution();

    let (status, objective) = match outcome {
        PhaseOutcome::Optimal => (SolveStatus::Optimal, -sign * tableau.objective_rhs()),
        PhaseOutcome::Unbounded(col) => {
            log::debug!("column {} has no leaving row: unbounded", col);
            (SolveStatus::Unbounded, -sign * f64::INFINITY)
        }
        PhaseOutcome::IterationLimit => (SolveStatus::IterationLimit, model.evaluate(&x)),
    };

    if settings.verbose {
        log::info!(
            "simplex: status={} obj={:.6} pivots={} (m={}, n={})",
            status,
            objective,
            iterations,
            m,
            n
        );
    }

    Ok(SimplexResult {
        status,
        x,
        objective,
        iterations,
        tableau: Some(tableau),
        rows,
    })
}

fn run_phase(tableau: &mut Tableau, settings: &SimplexSettings, iterations: &mut usize) -> PhaseOutcome {
    let tol = settings.pivot_tol;
    let mut degenerate_streak = 0;

    loop {
        let bland = degenerate_streak >= settings.bland_after;
        let entering = if bland {
            tableau.entering_bland(tol)
        } else {
            tableau.entering_most_negative(tol)
        };
        let Some(col) = entering else {
            return PhaseOutcome::Optimal;
        };
        let Some(row) = tableau.leaving_row(col, tol, bland) else {
            return PhaseOutcome::Unbounded(col);
        };
        if *iterations >= settings.max_iter {
            return PhaseOutcome::IterationLimit;
        }

        if tableau.rhs(row).abs() <= tol {
            degenerate_streak += 1;
        } else {
            degenerate_streak = 0;
        }

        log::trace!(
            "pivot {}: enter col {} leave row {} (rhs {:.6}){}",
            *iterations,
            col,
            row,
            tableau.rhs(row),
            if bland { " [bland]" } else { "" }
        );
        tableau.pivot(row, col);
        *iterations += 1;
    }
}

/// Pivot zero-level basic artificials onto any non-artificial column of their row.
fn drive_out_artificials(tableau: &mut Tableau, tol: f64) {
    let keep = tableau.num_original() + tableau.num_slack();
    for r in 0..tableau.num_rows() {
        let Some(b) = tableau.basis()[r] else { continue };
        if !tableau.is_artificial(b) {
            continue;
        }
        match (0..keep).find(|&j| tableau.get(r, j).abs() > tol) {
            Some(j) => tableau.pivot(r, j),
            None => log::debug!("row {} is redundant", r),
        }
    }
}
