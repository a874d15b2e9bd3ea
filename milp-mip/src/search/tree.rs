//! Branch-and-bound tree controller.

use std::time::Instant;

use milp_core::SolveStatus;

use super::{BoundChange, BranchDecision, BranchingSelector, NodeQueue, SearchNode};
use crate::error::MipResult;
use crate::master::{RelaxationBackend, SimplexBackend};
use crate::model::{IncumbentTracker, MipProblem, MipSolution, MipStatus};
use crate::settings::MipSettings;
use crate::trace::{FathomReason, SolveTrace, TraceEvent};

/// Branch-and-bound tree controller.
///
/// Manages the B&B tree, node queue, incumbent, and termination. Every node
/// relaxation is solved exactly once, when the node is created; the cached
/// result serves both as the queue priority and for processing.
pub struct BranchAndBound<B: RelaxationBackend = SimplexBackend> {
    /// Problem being solved.
    problem: MipProblem,

    /// Relaxation solver.
    backend: B,

    /// Node queue.
    queue: NodeQueue,

    /// Branching variable selector.
    branching: BranchingSelector,

    /// Incumbent solution tracker.
    pub incumbent: IncumbentTracker,

    /// Next node ID to assign.
    next_node_id: u64,

    /// Total nodes explored.
    nodes_explored: u64,

    /// Nodes pruned.
    nodes_pruned: u64,

    /// Start time.
    start_time: Option<Instant>,

    /// Audit log.
    trace: SolveTrace,

    /// Settings.
    settings: MipSettings,
}

impl BranchAndBound<SimplexBackend> {
    /// Create a new B&B controller using the simplex backend.
    pub fn new(problem: MipProblem, settings: MipSettings) -> Self {
        let backend = SimplexBackend::new(settings.simplex.clone());
        Self::with_backend(problem, settings, backend)
    }
}

impl<B: RelaxationBackend> BranchAndBound<B> {
    /// Create a new B&B controller with an explicit relaxation backend.
    pub fn with_backend(problem: MipProblem, settings: MipSettings, backend: B) -> Self {
        let sense = problem.sense();
        Self {
            queue: NodeQueue::new(settings.node_selection, sense),
            branching: BranchingSelector::new(settings.branching_rule),
            incumbent: IncumbentTracker::new(sense, settings.bound_tol),
            problem,
            backend,
            next_node_id: 1, // 0 reserved for root
            nodes_explored: 0,
            nodes_pruned: 0,
            start_time: None,
            trace: SolveTrace::new(),
            settings,
        }
    }

    /// Run the search to completion (or until a limit is hit).
    pub fn solve(mut self) -> MipResult<MipSolution> {
        self.start_time = Some(Instant::now());

        let root_relax = self.backend.solve(&self.problem.model)?;
        let root = SearchNode::root(self.problem.model.clone(), root_relax);
        self.record_relaxed(&root);

        // Root outcomes other than optimal are the overall result
        match root.lp_status {
            SolveStatus::Optimal => {}
            SolveStatus::Infeasible => {
                self.fathom(&root, FathomReason::Infeasible);
                return Ok(self.finalize(MipStatus::Infeasible));
            }
            SolveStatus::Unbounded => {
                self.fathom(&root, FathomReason::Unbounded);
                return Ok(self.finalize(MipStatus::Unbounded));
            }
            SolveStatus::IterationLimit => {
                self.trace.note("Root relaxation hit the simplex iteration limit");
                return Ok(self.finalize(MipStatus::IterationLimit));
            }
        }

        if self.settings.verbose {
            log::info!(
                "Root relaxation: obj={:.6e}, {} integer vars",
                root.relaxed_obj,
                self.problem.num_integers()
            );
        }

        self.queue.push(root);

        let status = loop {
            if let Some(status) = self.check_termination() {
                break status;
            }
            let Some(node) = self.queue.pop() else {
                break if self.incumbent.has_incumbent() {
                    MipStatus::Optimal
                } else {
                    MipStatus::Infeasible
                };
            };
            self.nodes_explored += 1;
            self.process_node(node)?;
            self.log_progress();
        };

        Ok(self.finalize(status))
    }

    /// Bound test, integrality test, then branching.
    fn process_node(&mut self, node: SearchNode) -> MipResult<()> {
        if node.can_prune(&self.incumbent) {
            self.fathom(
                &node,
                FathomReason::Bound {
                    incumbent: self.incumbent.obj_val,
                },
            );
            return Ok(());
        }

        let decision =
            self.branching
                .select(&node.relaxed_x, &self.problem, self.settings.int_feas_tol);

        match decision {
            None => {
                self.fathom(&node, FathomReason::Integral);
                let mut x = node.relaxed_x.clone();
                self.problem.round_integers(&mut x);
                let obj = self.problem.model.evaluate(&x);
                self.update_incumbent(node.id, &x, obj);
            }
            Some(decision) => self.branch(&node, decision)?,
        }
        Ok(())
    }

    /// Create, solve and enqueue both children of `parent`.
    fn branch(&mut self, parent: &SearchNode, decision: BranchDecision) -> MipResult<()> {
        let down_id = self.next_node_id;
        let up_id = self.next_node_id + 1;
        self.next_node_id += 2;

        self.trace.push(TraceEvent::Branched {
            node: parent.id,
            var: decision.var,
            value: decision.value,
            down_child: down_id,
            up_child: up_id,
        });

        for (id, bc) in [(down_id, decision.down_branch), (up_id, decision.up_branch)] {
            let child = self.make_child(parent, id, bc)?;
            self.record_relaxed(&child);
            match child.lp_status {
                SolveStatus::Optimal => self.queue.push(child),
                SolveStatus::Infeasible => self.fathom(&child, FathomReason::Infeasible),
                SolveStatus::Unbounded => self.fathom(&child, FathomReason::Unbounded),
                SolveStatus::IterationLimit => {
                    log::warn!("node {} relaxation hit the simplex iteration limit", child.id);
                    self.trace.note(format!(
                        "  Node {} dropped: simplex iteration limit",
                        child.id
                    ));
                    self.nodes_pruned += 1;
                }
            }
        }
        Ok(())
    }

    /// Deep-copy the parent's model, add the bound row and solve it.
    fn make_child(&mut self, parent: &SearchNode, id: u64, bc: BoundChange) -> MipResult<SearchNode> {
        let row = bc.to_constraint(self.problem.num_vars());
        let model = parent.model.with_constraint(row)?;
        let relax = self.backend.solve(&model)?;
        Ok(parent.child(id, bc, model, relax))
    }

    /// Update incumbent with a new solution.
    ///
    /// Returns true if incumbent was improved.
    pub fn update_incumbent(&mut self, node_id: u64, x: &[f64], obj: f64) -> bool {
        let improved = self.incumbent.update(x, obj);

        if improved {
            self.trace.push(TraceEvent::IncumbentUpdated {
                node: node_id,
                objective: obj,
            });

            // Prune nodes dominated by new incumbent
            let pruned = self.queue.prune_by_bound(&self.incumbent);
            let count = pruned.len();
            for node in &pruned {
                self.fathom(
                    node,
                    FathomReason::Bound {
                        incumbent: self.incumbent.obj_val,
                    },
                );
            }

            if self.settings.verbose {
                log::info!("New incumbent: obj={:.6e}, pruned {} nodes", obj, count);
            }
        }

        improved
    }

    fn record_relaxed(&mut self, node: &SearchNode) {
        self.trace.push(TraceEvent::NodeRelaxed {
            node: node.id,
            depth: node.depth,
            bound: node.bound_constraint(),
            status: node.lp_status,
            objective: node.relaxed_obj,
            x: node.relaxed_x.clone(),
        });
    }

    fn fathom(&mut self, node: &SearchNode, reason: FathomReason) {
        self.nodes_pruned += 1;
        self.trace.push(TraceEvent::NodeFathomed {
            node: node.id,
            objective: node.relaxed_obj,
            reason,
        });
    }

    /// Get the best bound: best open relaxation, or the incumbent when none is open.
    pub fn best_bound(&self) -> f64 {
        self.queue
            .best_bound()
            .unwrap_or(self.incumbent.obj_val)
    }

    /// Get elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> u64 {
        self.start_time
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or(0)
    }

    /// Check if time limit is exceeded.
    pub fn time_limit_exceeded(&self) -> bool {
        if let Some(limit) = self.settings.time_limit_ms {
            self.elapsed_ms() >= limit
        } else {
            false
        }
    }

    /// Check limit-based termination.
    ///
    /// Returns Some(status) if we should terminate, None otherwise.
    pub fn check_termination(&self) -> Option<MipStatus> {
        if self.queue.is_empty() {
            return None;
        }

        // Time limit
        if self.time_limit_exceeded() {
            return Some(MipStatus::TimeLimit);
        }

        // Node limit
        if self.nodes_explored >= self.settings.max_nodes {
            return Some(MipStatus::NodeLimit);
        }

        None
    }

    /// Finalize the solve and return the solution.
    fn finalize(self, status: MipStatus) -> MipSolution {
        let bound = match status {
            MipStatus::NodeLimit | MipStatus::TimeLimit => self.best_bound(),
            _ => self.incumbent.obj_val,
        };
        if self.settings.verbose {
            log::info!(
                "B&B finished: {} | obj={:.6e} | nodes={} | pruned={} | time={}ms",
                status,
                self.incumbent.obj_val,
                self.nodes_explored,
                self.nodes_pruned,
                self.elapsed_ms()
            );
        }
        MipSolution {
            status,
            x: self.incumbent.solution.clone().unwrap_or_default(),
            obj_val: self.incumbent.obj_val,
            bound,
            nodes_explored: self.nodes_explored,
            nodes_pruned: self.nodes_pruned,
            cuts_added: 0,
            incumbent_updates: self.incumbent.update_count,
            lp_solves: self.backend.num_solves(),
            solve_time_ms: self.elapsed_ms(),
            trace: self.trace,
        }
    }

    /// Log progress (if verbose).
    fn log_progress(&self) {
        if !self.settings.verbose {
            return;
        }

        if self.nodes_explored % self.settings.log_freq.max(1) != 0 {
            return;
        }

        log::info!(
            "Nodes: {} ({} open, {} created) | Bound: {:.6e} | Incumbent: {:.6e} | Time: {:.1}s",
            self.nodes_explored,
            self.queue.len(),
            self.queue.total_added(),
            self.best_bound(),
            self.incumbent.obj_val,
            self.elapsed_ms() as f64 / 1000.0,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{BranchingRule, NodeSelection};
    use milp_core::{LinearModel, ObjectiveSense, Relation};

    /// max 5x1 + 4x2 s.t. 6x1 + 4x2 <= 24, x1 + 2x2 <= 6; integer optimum 20 at (4, 0).
    fn wyndor() -> MipProblem {
        let model = LinearModel::new(ObjectiveSense::Maximize, vec![5.0, 4.0])
            .subject_to(vec![6.0, 4.0], Relation::LessEq, 24.0)
            .subject_to(vec![1.0, 2.0], Relation::LessEq, 6.0);
        MipProblem::new(model).unwrap()
    }

    #[test]
    fn test_integral_root_needs_no_branching() {
        let model = LinearModel::new(ObjectiveSense::Maximize, vec![2.0, 3.0])
            .subject_to(vec![1.0, 1.0], Relation::LessEq, 4.0)
            .subject_to(vec![1.0, 0.0], Relation::LessEq, 2.0)
            .subject_to(vec![0.0, 1.0], Relation::LessEq, 2.0);
        let tree = BranchAndBound::new(MipProblem::new(model).unwrap(), MipSettings::default());
        let sol = tree.solve().unwrap();

        assert_eq!(sol.status, MipStatus::Optimal);
        assert!((sol.obj_val - 10.0).abs() < 1e-9);
        assert_eq!(sol.x, vec![2.0, 2.0]);
        assert_eq!(sol.nodes_explored, 1);
        assert_eq!(sol.lp_solves, 1);
        assert!(!sol
            .trace
            .events()
            .iter()
            .any(|e| matches!(e, TraceEvent::Branched { .. })));
    }

    #[test]
    fn test_branching_reaches_integer_optimum() {
        let sol = BranchAndBound::new(wyndor(), MipSettings::default())
            .solve()
            .unwrap();

        assert_eq!(sol.status, MipStatus::Optimal);
        assert!((sol.obj_val - 20.0).abs() < 1e-9);
        assert_eq!(sol.x, vec![4.0, 0.0]);
        assert!(sol.nodes_explored > 1);
        assert!(sol.incumbent_updates >= 1);
    }

    #[test]
    fn test_depth_first_first_fractional_agrees() {
        let settings = MipSettings::default()
            .with_node_selection(NodeSelection::DepthFirst)
            .with_branching_rule(BranchingRule::FirstFractional);
        let sol = BranchAndBound::new(wyndor(), settings).solve().unwrap();

        assert_eq!(sol.status, MipStatus::Optimal);
        assert!((sol.obj_val - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_verbose_progress_logging() {
        let sol = BranchAndBound::new(wyndor(), MipSettings::verbose())
            .solve()
            .unwrap();

        assert_eq!(sol.status, MipStatus::Optimal);
        assert!((sol.obj_val - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_root_infeasible_and_unbounded() {
        let infeasible = LinearModel::new(ObjectiveSense::Maximize, vec![1.0])
            .subject_to(vec![1.0], Relation::LessEq, 1.0)
            .subject_to(vec![1.0], Relation::GreaterEq, 2.0);
        let sol = BranchAndBound::new(MipProblem::new(infeasible).unwrap(), MipSettings::default())
            .solve()
            .unwrap();
        assert_eq!(sol.status, MipStatus::Infeasible);
        assert!(!sol.has_solution());

        let unbounded = LinearModel::new(ObjectiveSense::Maximize, vec![1.0, 0.0])
            .subject_to(vec![0.0, 1.0], Relation::LessEq, 3.0);
        let sol = BranchAndBound::new(MipProblem::new(unbounded).unwrap(), MipSettings::default())
            .solve()
            .unwrap();
        assert_eq!(sol.status, MipStatus::Unbounded);
    }

    #[test]
    fn test_no_integer_point() {
        // 0.2 <= x <= 0.8 has a relaxation but no integer point
        let model = LinearModel::new(ObjectiveSense::Maximize, vec![1.0])
            .subject_to(vec![1.0], Relation::GreaterEq, 0.2)
            .subject_to(vec![1.0], Relation::LessEq, 0.8);
        let sol = BranchAndBound::new(MipProblem::new(model).unwrap(), MipSettings::default())
            .solve()
            .unwrap();

        assert_eq!(sol.status, MipStatus::Infeasible);
        let infeasible_children = sol
            .trace
            .events()
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    TraceEvent::NodeFathomed {
                        reason: FathomReason::Infeasible,
                        ..
                    }
                )
            })
            .count();
        assert_eq!(infeasible_children, 2);
    }

    #[test]
    fn test_node_limit() {
        let settings = MipSettings::default().with_max_nodes(1);
        let sol = BranchAndBound::new(wyndor(), settings).solve().unwrap();
        assert_eq!(sol.status, MipStatus::NodeLimit);
        assert_eq!(sol.nodes_explored, 1);
    }
}
