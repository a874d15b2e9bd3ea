//! Search node representation.

use milp_core::{Constraint, LinearModel, Relation, SolveStatus};

use crate::master::MasterResult;
use crate::model::IncumbentTracker;

/// A bound change from branching.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundChange {
    /// Variable index.
    pub var: usize,

    /// `LessEq` for a down branch, `GreaterEq` for an up branch.
    pub relation: Relation,

    /// New bound value (integral).
    pub bound: f64,
}

impl BoundChange {
    /// Create a "down" branch: x <= floor(value).
    pub fn down_branch(var: usize, value: f64) -> Self {
        Self {
            var,
            relation: Relation::LessEq,
            bound: value.floor(),
        }
    }

    /// Create an "up" branch: x >= ceil(value).
    pub fn up_branch(var: usize, value: f64) -> Self {
        Self {
            var,
            relation: Relation::GreaterEq,
            bound: value.ceil(),
        }
    }

    /// The bound as a constraint row for a model with `num_vars` variables.
    pub fn to_constraint(&self, num_vars: usize) -> Constraint {
        Constraint::bound(self.var, self.relation, self.bound, num_vars)
    }
}

/// A node in the B&B search tree.
///
/// Each node owns a full deep copy of its model: the parent's constraints
/// plus the node's own bound row. Siblings never share coefficient storage.
/// The relaxation is solved once when the node is created and cached here.
#[derive(Debug, Clone)]
pub struct SearchNode {
    /// Unique node identifier.
    pub id: u64,

    /// Parent node ID (None for root).
    pub parent_id: Option<u64>,

    /// Depth in the tree (0 for root).
    pub depth: usize,

    /// Bound change from parent to this node.
    pub bound_change: Option<BoundChange>,

    /// Model of this subproblem.
    pub model: LinearModel,

    /// Relaxation status.
    pub lp_status: SolveStatus,

    /// Relaxed solution.
    pub relaxed_x: Vec<f64>,

    /// Relaxed objective; bounds every integer point in the subtree.
    pub relaxed_obj: f64,
}

impl SearchNode {
    /// Create the root node from its solved relaxation.
    pub fn root(model: LinearModel, relaxation: MasterResult) -> Self {
        Self {
            id: 0,
            parent_id: None,
            depth: 0,
            bound_change: None,
            model,
            lp_status: relaxation.status.into(),
            relaxed_x: relaxation.x,
            relaxed_obj: relaxation.obj_val,
        }
    }

    /// Create a child node from a bound change, its model and its solved relaxation.
    pub fn child(
        &self,
        id: u64,
        bound_change: BoundChange,
        model: LinearModel,
        relaxation: MasterResult,
    ) -> Self {
        Self {
            id,
            parent_id: Some(self.id),
            depth: self.depth + 1,
            bound_change: Some(bound_change),
            model,
            lp_status: relaxation.status.into(),
            relaxed_x: relaxation.x,
            relaxed_obj: relaxation.obj_val,
        }
    }

    /// Bound row that created this node, as shown in the trace.
    pub fn bound_constraint(&self) -> Option<Constraint> {
        self.bound_change
            .map(|bc| bc.to_constraint(self.model.num_vars()))
    }

    /// Check if this node can be pruned by an incumbent.
    ///
    /// A node can be pruned if its relaxed objective is not strictly better
    /// than the incumbent objective.
    pub fn can_prune(&self, incumbent: &IncumbentTracker) -> bool {
        !incumbent.can_improve(self.relaxed_obj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::master::MasterStatus;
    use milp_core::ObjectiveSense;

    fn relaxation(obj: f64, x: Vec<f64>) -> MasterResult {
        MasterResult {
            status: MasterStatus::Optimal,
            x,
            obj_val: obj,
            iterations: 0,
            tableau: None,
            rows: Vec::new(),
        }
    }

    fn model() -> LinearModel {
        LinearModel::new(ObjectiveSense::Maximize, vec![1.0, 1.0])
            .subject_to(vec![2.0, 2.0], Relation::LessEq, 5.0)
    }

    #[test]
    fn test_root_node() {
        let root = SearchNode::root(model(), relaxation(2.5, vec![2.5, 0.0]));
        assert_eq!(root.id, 0);
        assert!(root.parent_id.is_none());
        assert_eq!(root.depth, 0);
        assert!(root.bound_change.is_none());
        assert!(root.bound_constraint().is_none());
        assert_eq!(root.lp_status, SolveStatus::Optimal);
    }

    #[test]
    fn test_child_node() {
        let root = SearchNode::root(model(), relaxation(2.5, vec![2.5, 0.0]));
        let bc = BoundChange::down_branch(0, 2.5);
        let child_model = root.model.with_constraint(bc.to_constraint(2)).unwrap();
        let child = root.child(1, bc, child_model, relaxation(2.5, vec![2.0, 0.5]));

        assert_eq!(child.id, 1);
        assert_eq!(child.parent_id, Some(0));
        assert_eq!(child.depth, 1);
        assert_eq!(child.model.num_constraints(), 2);
        assert_eq!(root.model.num_constraints(), 1);
        assert_eq!(child.bound_constraint().unwrap().to_string(), "x1 <= 2");
    }

    #[test]
    fn test_bound_changes() {
        // Down branch on x with value 2.7: x <= 2
        let down = BoundChange::down_branch(0, 2.7);
        assert_eq!(down.relation, Relation::LessEq);
        assert_eq!(down.bound, 2.0);

        // Up branch on x with value 2.7: x >= 3
        let up = BoundChange::up_branch(0, 2.7);
        assert_eq!(up.relation, Relation::GreaterEq);
        assert_eq!(up.bound, 3.0);
        assert_eq!(up.to_constraint(3).coefs, vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_pruning() {
        let node = SearchNode::root(model(), relaxation(10.0, vec![5.0, 5.0]));
        let mut incumbent = IncumbentTracker::new(ObjectiveSense::Maximize, 1e-9);

        // No incumbent: never pruned
        assert!(!node.can_prune(&incumbent));

        // Incumbent 8: 10 can still improve
        incumbent.update(&[4.0, 4.0], 8.0);
        assert!(!node.can_prune(&incumbent));

        // Incumbent 10: equal is pruned
        incumbent.update(&[5.0, 5.0], 10.0);
        assert!(node.can_prune(&incumbent));
    }
}
