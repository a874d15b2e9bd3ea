//! Problem data structures and validation.
//!
//! This module defines the canonical linear model representation
//! and the settings shared by every simplex solve.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{LpError, LpResult};

/// Optimization direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ObjectiveSense {
    /// Maximize c^T x
    Maximize,
    /// Minimize c^T x
    Minimize,
}

impl ObjectiveSense {
    /// Returns true if `candidate` is strictly better than `reference` by more than `tol`.
    pub fn is_better(self, candidate: f64, reference: f64, tol: f64) -> bool {
        match self {
            ObjectiveSense::Maximize => candidate > reference + tol,
            ObjectiveSense::Minimize => candidate < reference - tol,
        }
    }

    /// The objective value every finite value improves on.
    ///
    /// -∞ for maximization, +∞ for minimization.
    pub fn worst_value(self) -> f64 {
        match self {
            ObjectiveSense::Maximize => f64::NEG_INFINITY,
            ObjectiveSense::Minimize => f64::INFINITY,
        }
    }

    /// Multiplier mapping this sense onto minimization (+1 or -1).
    pub fn min_sign(self) -> f64 {
        match self {
            ObjectiveSense::Maximize => -1.0,
            ObjectiveSense::Minimize => 1.0,
        }
    }
}

impl FromStr for ObjectiveSense {
    type Err = LpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "max" | "maximize" | "maximise" => Ok(ObjectiveSense::Maximize),
            "min" | "minimize" | "minimise" => Ok(ObjectiveSense::Minimize),
            other => Err(LpError::InvalidInput(format!(
                "objective sense must be 'max' or 'min', got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ObjectiveSense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectiveSense::Maximize => write!(f, "max"),
            ObjectiveSense::Minimize => write!(f, "min"),
        }
    }
}

/// Constraint relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Relation {
    /// a^T x <= b
    LessEq,
    /// a^T x >= b
    GreaterEq,
    /// a^T x = b
    Equal,
}

impl Relation {
    /// Relation obtained after multiplying both sides by -1.
    pub fn flipped(self) -> Self {
        match self {
            Relation::LessEq => Relation::GreaterEq,
            Relation::GreaterEq => Relation::LessEq,
            Relation::Equal => Relation::Equal,
        }
    }
}

impl FromStr for Relation {
    type Err = LpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "<=" | "=<" | "≤" => Ok(Relation::LessEq),
            ">=" | "=>" | "≥" => Ok(Relation::GreaterEq),
            "=" | "==" => Ok(Relation::Equal),
            other => Err(LpError::InvalidInput(format!("unknown relation '{}'", other))),
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::LessEq => write!(f, "<="),
            Relation::GreaterEq => write!(f, ">="),
            Relation::Equal => write!(f, "="),
        }
    }
}

/// Sign restriction tag for a variable.
///
/// The simplex engine always works with x >= 0; these tags are recorded
/// for the I/O layer. `Integer` and `Binary` select the variables the
/// integer algorithms must make integral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SignRestriction {
    /// `+`
    #[default]
    NonNegative,
    /// `-`
    NonPositive,
    /// `urs`
    Unrestricted,
    /// `int`
    Integer,
    /// `bin`
    Binary,
}

impl SignRestriction {
    /// Whether the tag demands an integral value.
    pub fn is_integral(self) -> bool {
        matches!(self, SignRestriction::Integer | SignRestriction::Binary)
    }
}

impl FromStr for SignRestriction {
    type Err = LpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "+" => Ok(SignRestriction::NonNegative),
            "-" => Ok(SignRestriction::NonPositive),
            "urs" => Ok(SignRestriction::Unrestricted),
            "int" => Ok(SignRestriction::Integer),
            "bin" => Ok(SignRestriction::Binary),
            other => Err(LpError::InvalidInput(format!(
                "unknown sign restriction '{}'",
                other
            ))),
        }
    }
}

/// A single linear constraint `coefs^T x (<=|>=|=) rhs`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Constraint {
    /// Coefficients, one per model variable.
    pub coefs: Vec<f64>,

    /// Relation between the left-hand side and `rhs`.
    pub relation: Relation,

    /// Right-hand side.
    pub rhs: f64,
}

impl Constraint {
    /// General constraint.
    pub fn new(coefs: Vec<f64>, relation: Relation, rhs: f64) -> Self {
        Self {
            coefs,
            relation,
            rhs,
        }
    }

    /// Single-variable bound `x_var (relation) rhs` in a model with `num_vars` variables.
    pub fn bound(var: usize, relation: Relation, rhs: f64, num_vars: usize) -> Self {
        let mut coefs = vec![0.0; num_vars];
        if var < num_vars {
            coefs[var] = 1.0;
        }
        Self::new(coefs, relation, rhs)
    }

    /// Evaluate the left-hand side at `x`.
    pub fn lhs(&self, x: &[f64]) -> f64 {
        self.coefs.iter().zip(x.iter()).map(|(a, xi)| a * xi).sum()
    }

    /// Amount by which `x` violates this constraint (0 when satisfied).
    pub fn violation(&self, x: &[f64]) -> f64 {
        let lhs = self.lhs(x);
        match self.relation {
            Relation::LessEq => (lhs - self.rhs).max(0.0),
            Relation::GreaterEq => (self.rhs - lhs).max(0.0),
            Relation::Equal => (lhs - self.rhs).abs(),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_linear(f, &self.coefs)?;
        write!(f, " {} {}", self.relation, self.rhs)
    }
}

fn write_linear(f: &mut fmt::Formatter<'_>, coefs: &[f64]) -> fmt::Result {
    let mut first = true;
    for (j, &a) in coefs.iter().enumerate() {
        if a == 0.0 {
            continue;
        }
        if first {
            if a < 0.0 {
                write!(f, "-")?;
            }
        } else if a < 0.0 {
            write!(f, " - ")?;
        } else {
            write!(f, " + ")?;
        }
        let mag = a.abs();
        if mag != 1.0 {
            write!(f, "{}", mag)?;
        }
        write!(f, "x{}", j + 1)?;
        first = false;
    }
    if first {
        write!(f, "0")?;
    }
    Ok(())
}

/// Linear (or mixed-integer linear) model.
///
/// ```text
/// max/min   c^T x
/// subject to a_i^T x (<=|>=|=) b_i,  i = 1..m
///            x >= 0
/// ```
///
/// Cloning performs a deep copy of every coefficient vector, so a clone
/// can be extended with [`LinearModel::add_constraint`] without affecting
/// the original.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearModel {
    /// Optimization direction.
    pub sense: ObjectiveSense,

    /// Objective coefficients c (length n, defines the variable count).
    pub objective: Vec<f64>,

    /// Constraint rows.
    pub constraints: Vec<Constraint>,

    /// Per-variable sign restriction tags (empty = all non-negative).
    pub sign_restrictions: Vec<SignRestriction>,
}

impl LinearModel {
    /// Create a model with no constraints.
    pub fn new(sense: ObjectiveSense, objective: Vec<f64>) -> Self {
        Self {
            sense,
            objective,
            constraints: Vec::new(),
            sign_restrictions: Vec::new(),
        }
    }

    /// Builder: append a constraint without validation.
    pub fn subject_to(mut self, coefs: Vec<f64>, relation: Relation, rhs: f64) -> Self {
        self.constraints.push(Constraint::new(coefs, relation, rhs));
        self
    }

    /// Builder: set sign restriction tags.
    pub fn with_sign_restrictions(mut self, tags: Vec<SignRestriction>) -> Self {
        self.sign_restrictions = tags;
        self
    }

    /// Number of decision variables (n).
    pub fn num_vars(&self) -> usize {
        self.objective.len()
    }

    /// Number of constraints (m).
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Append a constraint, checking its length against the variable count.
    pub fn add_constraint(&mut self, constraint: Constraint) -> LpResult<()> {
        check_row(self.constraints.len(), &constraint, self.num_vars())?;
        self.constraints.push(constraint);
        Ok(())
    }

    /// Deep copy of this model with one more constraint.
    pub fn with_constraint(&self, constraint: Constraint) -> LpResult<Self> {
        let mut child = self.clone();
        child.add_constraint(constraint)?;
        Ok(child)
    }

    /// Validate dimensions and numeric data.
    pub fn validate(&self) -> LpResult<()> {
        let n = self.num_vars();
        if n == 0 {
            return Err(LpError::MalformedModel(
                "objective has no coefficients".to_string(),
            ));
        }
        if let Some(j) = self.objective.iter().position(|c| !c.is_finite()) {
            return Err(LpError::MalformedModel(format!(
                "objective coefficient {} is not finite",
                j + 1
            )));
        }
        for (i, c) in self.constraints.iter().enumerate() {
            check_row(i, c, n)?;
        }
        if !self.sign_restrictions.is_empty() && self.sign_restrictions.len() != n {
            return Err(LpError::MalformedModel(format!(
                "{} sign restrictions for {} variables",
                self.sign_restrictions.len(),
                n
            )));
        }
        Ok(())
    }

    /// Objective value c^T x.
    pub fn evaluate(&self, x: &[f64]) -> f64 {
        self.objective.iter().zip(x.iter()).map(|(c, xi)| c * xi).sum()
    }

    /// Largest constraint or non-negativity violation at `x`.
    pub fn max_violation(&self, x: &[f64]) -> f64 {
        let row_viol = self
            .constraints
            .iter()
            .map(|c| c.violation(x))
            .fold(0.0, f64::max);
        let sign_viol = x.iter().map(|&xi| (-xi).max(0.0)).fold(0.0, f64::max);
        row_viol.max(sign_viol)
    }

    /// Check if `x` satisfies every constraint and x >= 0 within `tol`.
    pub fn is_feasible_point(&self, x: &[f64], tol: f64) -> bool {
        x.len() == self.num_vars() && self.max_violation(x) <= tol
    }

    /// Indices of integer-restricted variables.
    ///
    /// Variables tagged `int`/`bin`; every variable when none is tagged.
    pub fn integer_vars(&self) -> Vec<usize> {
        let tagged: Vec<usize> = self
            .sign_restrictions
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_integral())
            .map(|(j, _)| j)
            .collect();
        if tagged.is_empty() {
            (0..self.num_vars()).collect()
        } else {
            tagged
        }
    }
}

fn check_row(index: usize, c: &Constraint, n: usize) -> LpResult<()> {
    if c.coefs.len() != n {
        return Err(LpError::MalformedModel(format!(
            "constraint {} has {} coefficients, expected {}",
            index + 1,
            c.coefs.len(),
            n
        )));
    }
    if c.coefs.iter().any(|a| !a.is_finite()) || !c.rhs.is_finite() {
        return Err(LpError::MalformedModel(format!(
            "constraint {} contains a non-finite value",
            index + 1
        )));
    }
    Ok(())
}

impl fmt::Display for LinearModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.sense)?;
        write_linear(f, &self.objective)?;
        writeln!(f)?;
        for c in &self.constraints {
            writeln!(f, "  {}", c)?;
        }
        Ok(())
    }
}

/// Simplex solver settings.
#[derive(Debug, Clone)]
pub struct SimplexSettings {
    /// Maximum number of pivots across both phases
    pub max_iter: usize,

    /// Entries with magnitude below this are treated as zero when pricing,
    /// in the ratio test, and in basic-column detection
    pub pivot_tol: f64,

    /// Phase-one objective above this means the model is infeasible
    pub feas_tol: f64,

    /// Consecutive degenerate pivots tolerated before switching to Bland's rule
    pub bland_after: usize,

    /// Enable verbose logging
    pub verbose: bool,
}

impl Default for SimplexSettings {
    fn default() -> Self {
        let max_iter = std::env::var("MILP_SIMPLEX_MAX_ITER")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(10_000);

        Self {
            max_iter,
            pivot_tol: 1e-9,
            feas_tol: 1e-7,
            bland_after: 50,
            verbose: std::env::var("MILP_VERBOSE")
                .map(|v| v != "0" && v.to_lowercase() != "false")
                .unwrap_or(false),
        }
    }
}

impl SimplexSettings {
    /// Set the pivot limit.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the degenerate-pivot budget before Bland's rule.
    pub fn with_bland_after(mut self, pivots: usize) -> Self {
        self.bland_after = pivots;
        self
    }
}

/// Solution status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SolveStatus {
    /// Optimal solution found
    Optimal,

    /// No point satisfies every constraint
    Infeasible,

    /// Objective improves without limit
    Unbounded,

    /// Pivot limit reached
    IterationLimit,
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "Optimal"),
            SolveStatus::Infeasible => write!(f, "Infeasible"),
            SolveStatus::Unbounded => write!(f, "Unbounded"),
            SolveStatus::IterationLimit => write!(f, "Iteration Limit"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LinearModel {
        LinearModel::new(ObjectiveSense::Maximize, vec![2.0, 3.0])
            .subject_to(vec![1.0, 1.0], Relation::LessEq, 4.0)
            .subject_to(vec![1.0, 0.0], Relation::LessEq, 2.0)
    }

    #[test]
    fn test_sense_parsing() {
        assert_eq!("MAX".parse::<ObjectiveSense>().unwrap(), ObjectiveSense::Maximize);
        assert_eq!(" min ".parse::<ObjectiveSense>().unwrap(), ObjectiveSense::Minimize);
        assert_eq!("Minimize".parse::<ObjectiveSense>().unwrap(), ObjectiveSense::Minimize);
        assert!("best".parse::<ObjectiveSense>().is_err());
    }

    #[test]
    fn test_sense_comparison() {
        let max = ObjectiveSense::Maximize;
        assert!(max.is_better(5.0, 4.0, 1e-9));
        assert!(!max.is_better(4.0, 4.0, 1e-9));
        assert!(max.is_better(-1e9, max.worst_value(), 1e-9));

        let min = ObjectiveSense::Minimize;
        assert!(min.is_better(3.0, 4.0, 1e-9));
        assert!(!min.is_better(5.0, 4.0, 1e-9));
        assert!(min.is_better(1e9, min.worst_value(), 1e-9));
    }

    #[test]
    fn test_relation_and_tags() {
        assert_eq!("<=".parse::<Relation>().unwrap(), Relation::LessEq);
        assert_eq!(">=".parse::<Relation>().unwrap(), Relation::GreaterEq);
        assert_eq!("=".parse::<Relation>().unwrap(), Relation::Equal);
        assert_eq!(Relation::LessEq.flipped(), Relation::GreaterEq);
        assert_eq!(Relation::Equal.flipped(), Relation::Equal);

        assert_eq!("int".parse::<SignRestriction>().unwrap(), SignRestriction::Integer);
        assert_eq!("URS".parse::<SignRestriction>().unwrap(), SignRestriction::Unrestricted);
        assert!("?".parse::<SignRestriction>().is_err());
    }

    #[test]
    fn test_bound_constraint() {
        let c = Constraint::bound(1, Relation::GreaterEq, 3.0, 3);
        assert_eq!(c.coefs, vec![0.0, 1.0, 0.0]);
        assert_eq!(c.violation(&[0.0, 2.0, 0.0]), 1.0);
        assert_eq!(c.violation(&[0.0, 4.0, 0.0]), 0.0);
        assert_eq!(c.to_string(), "x2 >= 3");
    }

    #[test]
    fn test_validation() {
        assert!(sample().validate().is_ok());

        let bad = sample().subject_to(vec![1.0], Relation::LessEq, 1.0);
        match bad.validate() {
            Err(LpError::MalformedModel(msg)) => assert!(msg.contains("constraint 3")),
            other => panic!("expected MalformedModel, got {:?}", other),
        }

        let empty = LinearModel::new(ObjectiveSense::Minimize, vec![]);
        assert!(empty.validate().is_err());

        let tags = sample().with_sign_restrictions(vec![SignRestriction::Integer]);
        assert!(tags.validate().is_err());
    }

    #[test]
    fn test_add_constraint_rejects_wrong_length() {
        let mut m = sample();
        assert!(m.add_constraint(Constraint::new(vec![1.0, 2.0, 3.0], Relation::LessEq, 1.0)).is_err());
        assert_eq!(m.num_constraints(), 2);
    }

    #[test]
    fn test_clone_isolation() {
        let original = sample();
        let child = original
            .with_constraint(Constraint::bound(0, Relation::LessEq, 1.0, 2))
            .unwrap();

        assert_eq!(original.num_constraints(), 2);
        assert_eq!(child.num_constraints(), 3);

        let mut other = original.clone();
        other.constraints[0].coefs[0] = 99.0;
        assert_eq!(original.constraints[0].coefs[0], 1.0);
    }

    #[test]
    fn test_feasibility_check() {
        let m = sample();
        assert!(m.is_feasible_point(&[2.0, 2.0], 1e-9));
        assert!(!m.is_feasible_point(&[3.0, 1.0], 1e-9));
        assert!(!m.is_feasible_point(&[-1.0, 1.0], 1e-9));
        assert_eq!(m.evaluate(&[2.0, 2.0]), 10.0);
    }

    #[test]
    fn test_integer_vars() {
        let m = sample();
        assert_eq!(m.integer_vars(), vec![0, 1]);

        let tagged = sample().with_sign_restrictions(vec![
            SignRestriction::NonNegative,
            SignRestriction::Binary,
        ]);
        assert_eq!(tagged.integer_vars(), vec![1]);
    }

    #[test]
    fn test_display() {
        let m = LinearModel::new(ObjectiveSense::Minimize, vec![1.0, -2.5])
            .subject_to(vec![-1.0, 1.0], Relation::GreaterEq, 0.0);
        assert_eq!(m.to_string(), "min x1 - 2.5x2\n  -x1 + x2 >= 0\n");
    }
}
