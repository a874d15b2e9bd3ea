//! MIP problem representation.

use milp_core::util::numerics::fractionality;
use milp_core::{Constraint, LinearModel, ObjectiveSense, Relation, SignRestriction};

use crate::error::MipResult;

/// Mixed-integer problem wrapper.
///
/// Extracts and organizes integrality information from a `LinearModel`.
/// Binary variables get an explicit `x_j <= 1` row so every relaxation
/// respects their range.
#[derive(Debug, Clone, PartialEq)]
pub struct MipProblem {
    /// Linear model whose relaxation is solved at every node.
    pub model: LinearModel,

    /// Indices of integer variables (includes binary).
    pub integer_vars: Vec<usize>,

    /// Indices of binary variables (subset of integer_vars).
    pub binary_vars: Vec<usize>,
}

impl MipProblem {
    /// Create a MipProblem from a LinearModel.
    ///
    /// Fails with `MalformedModel` before any solve when the data is inconsistent.
    pub fn new(model: LinearModel) -> MipResult<Self> {
        model.validate()?;

        let integer_vars = model.integer_vars();
        let binary_vars: Vec<usize> = model
            .sign_restrictions
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == SignRestriction::Binary)
            .map(|(j, _)| j)
            .collect();

        let mut model = model;
        let n = model.num_vars();
        for &j in &binary_vars {
            model.add_constraint(Constraint::bound(j, Relation::LessEq, 1.0, n))?;
        }

        Ok(Self {
            model,
            integer_vars,
            binary_vars,
        })
    }

    /// Optimization direction.
    pub fn sense(&self) -> ObjectiveSense {
        self.model.sense
    }

    /// Number of variables.
    pub fn num_vars(&self) -> usize {
        self.model.num_vars()
    }

    /// Number of constraints.
    pub fn num_constraints(&self) -> usize {
        self.model.num_constraints()
    }

    /// Number of integer variables (including binary).
    pub fn num_integers(&self) -> usize {
        self.integer_vars.len()
    }

    /// Check if a solution is integer-feasible within tolerance.
    pub fn is_integer_feasible(&self, x: &[f64], tol: f64) -> bool {
        self.integer_vars
            .iter()
            .all(|&i| x.get(i).map_or(false, |&v| fractionality(v) <= tol))
    }

    /// Round integer variables to nearest integer.
    pub fn round_integers(&self, x: &mut [f64]) {
        for &i in &self.integer_vars {
            if let Some(v) = x.get_mut(i) {
                *v = v.round();
            }
        }
    }

    /// Get fractional integer variables and their values.
    ///
    /// Returns (var_index, current_value, fractionality) for each fractional
    /// variable, in increasing index order.
    pub fn get_fractional_vars(&self, x: &[f64], tol: f64) -> Vec<(usize, f64, f64)> {
        let mut result = Vec::new();
        for &i in &self.integer_vars {
            let Some(&val) = x.get(i) else { continue };
            let frac = fractionality(val);
            if frac > tol {
                result.push((i, val, frac));
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use milp_core::LpError;

    use crate::error::MipError;

    fn simple_milp() -> LinearModel {
        // min x0 + x1 s.t. x0 + x1 >= 1, x0 binary, x1 continuous
        LinearModel::new(ObjectiveSense::Minimize, vec![1.0, 1.0])
            .subject_to(vec![1.0, 1.0], Relation::GreaterEq, 1.0)
            .with_sign_restrictions(vec![SignRestriction::Binary, SignRestriction::NonNegative])
    }

    #[test]
    fn test_mip_problem_creation() {
        let mip = MipProblem::new(simple_milp()).unwrap();

        assert_eq!(mip.num_vars(), 2);
        assert_eq!(mip.num_integers(), 1);
        assert_eq!(mip.integer_vars, vec![0]);
        assert_eq!(mip.binary_vars, vec![0]);

        // Binary var gets an x0 <= 1 row
        assert_eq!(mip.num_constraints(), 2);
        assert_eq!(mip.model.constraints[1].coefs, vec![1.0, 0.0]);
        assert_eq!(mip.model.constraints[1].relation, Relation::LessEq);
        assert_eq!(mip.model.constraints[1].rhs, 1.0);
    }

    #[test]
    fn test_untagged_model_is_pure_integer() {
        let model = LinearModel::new(ObjectiveSense::Maximize, vec![1.0, 2.0, 3.0]);
        let mip = MipProblem::new(model).unwrap();
        assert_eq!(mip.integer_vars, vec![0, 1, 2]);
        assert!(mip.binary_vars.is_empty());
    }

    #[test]
    fn test_malformed_model_rejected() {
        let model = LinearModel::new(ObjectiveSense::Maximize, vec![1.0, 2.0])
            .subject_to(vec![1.0], Relation::LessEq, 4.0);
        match MipProblem::new(model) {
            Err(MipError::Core(LpError::MalformedModel(_))) => {}
            other => panic!("expected MalformedModel, got {:?}", other),
        }
    }

    #[test]
    fn test_integer_feasibility() {
        let mip = MipProblem::new(simple_milp()).unwrap();

        // x0 = 1.0 is integer
        assert!(mip.is_integer_feasible(&[1.0, 0.5], 1e-3));

        // x0 = 0.5 is not integer
        assert!(!mip.is_integer_feasible(&[0.5, 0.5], 1e-3));

        // x0 = 0.9995 is integer within tolerance
        assert!(mip.is_integer_feasible(&[0.9995, 0.5], 1e-3));
    }

    #[test]
    fn test_fractional_vars() {
        let model = LinearModel::new(ObjectiveSense::Maximize, vec![1.0, 1.0, 1.0]);
        let mip = MipProblem::new(model).unwrap();

        let frac = mip.get_fractional_vars(&[2.5, 3.0, 1.2], 1e-3);
        assert_eq!(frac.len(), 2);
        assert_eq!(frac[0].0, 0);
        assert!((frac[0].2 - 0.5).abs() < 1e-12);
        assert_eq!(frac[1].0, 2);
        assert!((frac[1].2 - 0.2).abs() < 1e-12);

        let mut x = vec![2.0004, 2.9999, 1.0];
        mip.round_integers(&mut x);
        assert_eq!(x, vec![2.0, 3.0, 1.0]);
    }
}
