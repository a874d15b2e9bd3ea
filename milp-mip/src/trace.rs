//! Audit trail of a search.
//!
//! Every decision point (relaxation solved, node fathomed and why, branch
//! variable and bounds, cut added, knapsack pruning) is recorded as a typed
//! [`TraceEvent`]. `Display` on [`SolveTrace`] renders the multi-line
//! human-readable log handed to the export layer.

use std::fmt;

use milp_core::{Constraint, SolveStatus};
use serde::Serialize;

/// Why a node left the search without children.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum FathomReason {
    /// The relaxation has no feasible point.
    Infeasible,

    /// The relaxation is unbounded below a non-root node.
    Unbounded,

    /// The relaxed objective cannot beat the incumbent.
    Bound {
        /// Incumbent objective at the time of pruning.
        incumbent: f64,
    },

    /// The relaxed solution is already integral.
    Integral,
}

/// One entry of the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TraceEvent {
    /// A branch-and-bound node relaxation was solved.
    NodeRelaxed {
        /// Node id (0 = root).
        node: u64,
        /// Depth in the tree.
        depth: usize,
        /// Bound constraint that created the node (None for the root).
        bound: Option<Constraint>,
        /// Relaxation status.
        status: SolveStatus,
        /// Relaxed objective.
        objective: f64,
        /// Relaxed solution.
        x: Vec<f64>,
    },

    /// A node was discarded.
    NodeFathomed {
        /// Node id.
        node: u64,
        /// Relaxed objective of the node.
        objective: f64,
        /// Reason for discarding it.
        reason: FathomReason,
    },

    /// A node was split on a fractional variable.
    Branched {
        /// Parent node id.
        node: u64,
        /// Branching variable (0-based).
        var: usize,
        /// Fractional value of the variable.
        value: f64,
        /// Child with `x_var <= floor(value)`.
        down_child: u64,
        /// Child with `x_var >= ceil(value)`.
        up_child: u64,
    },

    /// The incumbent improved.
    IncumbentUpdated {
        /// Node (or cutting-plane round) that produced it.
        node: u64,
        /// New incumbent objective.
        objective: f64,
    },

    /// A cutting-plane round solved its relaxation.
    CutRound {
        /// Round number (1-based).
        round: usize,
        /// Relaxation status.
        status: SolveStatus,
        /// Relaxed objective.
        objective: f64,
        /// Relaxed solution.
        x: Vec<f64>,
    },

    /// A Gomory cut was added to the working model.
    CutAdded {
        /// Round number.
        round: usize,
        /// Basic fractional variable whose row produced the cut.
        source_var: usize,
        /// Cut as added to the model.
        cut: Constraint,
    },

    /// Cut generation stopped the loop.
    CutFailed {
        /// Round number.
        round: usize,
        /// Human-readable reason.
        reason: String,
    },

    /// A knapsack node was pruned.
    KnapsackFathomed {
        /// Depth (number of items decided).
        level: usize,
        /// Value accumulated on the path.
        value: f64,
        /// Optimistic bound (or accumulated value when minimizing).
        bound: f64,
        /// Best complete value at the time.
        best: f64,
    },

    /// A better complete knapsack selection was found.
    KnapsackImproved {
        /// Leaf depth.
        level: usize,
        /// New best value.
        value: f64,
    },

    /// Free-form note.
    Note(String),
}

/// Ordered list of trace events.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SolveTrace {
    events: Vec<TraceEvent>,
}

impl SolveTrace {
    /// Create an empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, mirroring it to the `log` facade at debug level.
    pub fn push(&mut self, event: TraceEvent) {
        log::debug!("{}", EventLine(&event));
        self.events.push(event);
    }

    /// Append a free-form note.
    pub fn note(&mut self, msg: impl Into<String>) {
        self.push(TraceEvent::Note(msg.into()));
    }

    /// Recorded events, oldest first.
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Incumbent objectives in the order they were accepted.
    pub fn incumbent_history(&self) -> Vec<f64> {
        self.events
            .iter()
            .filter_map(|e| match e {
                TraceEvent::IncumbentUpdated { objective, .. } => Some(*objective),
                _ => None,
            })
            .collect()
    }
}

fn fmt_vec(f: &mut fmt::Formatter<'_>, x: &[f64]) -> fmt::Result {
    write!(f, "[")?;
    for (i, v) in x.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{:.3}", v)?;
    }
    write!(f, "]")
}

struct EventLine<'a>(&'a TraceEvent);

impl fmt::Display for EventLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            TraceEvent::NodeRelaxed {
                node,
                depth,
                bound,
                status,
                objective,
                x,
            } => {
                write!(f, "Node {} (depth {}", node, depth)?;
                if let Some(b) = bound {
                    write!(f, ", {}", b)?;
                }
                write!(f, "): ")?;
                if *status == milp_core::SolveStatus::Optimal {
                    write!(f, "relaxed objective = {:.3}, x = ", objective)?;
                    fmt_vec(f, x)
                } else {
                    write!(f, "relaxation {}", status)
                }
            }
            TraceEvent::NodeFathomed {
                node,
                objective,
                reason,
            } => match reason {
                FathomReason::Infeasible => {
                    write!(f, "  Node {} fathomed: LP is infeasible", node)
                }
                FathomReason::Unbounded => {
                    write!(f, "  Node {} fathomed: LP is unbounded", node)
                }
                FathomReason::Bound { incumbent } => write!(
                    f,
                    "  Node {} fathomed: objective {:.3} is not better than incumbent {:.3}",
                    node, objective, incumbent
                ),
                FathomReason::Integral => write!(
                    f,
                    "  Node {} fathomed: integer solution with objective {:.3}",
                    node, objective
                ),
            },
            TraceEvent::Branched {
                node,
                var,
                value,
                down_child,
                up_child,
            } => write!(
                f,
                "  Node {} branches on x{} = {:.3}: x{} <= {} (node {}), x{} >= {} (node {})",
                node,
                var + 1,
                value,
                var + 1,
                value.floor(),
                down_child,
                var + 1,
                value.ceil(),
                up_child
            ),
            TraceEvent::IncumbentUpdated { node, objective } => write!(
                f,
                "  New incumbent from node {}: objective = {:.3}",
                node, objective
            ),
            TraceEvent::CutRound {
                round,
                status,
                objective,
                x,
            } => {
                write!(f, "Iteration {}: ", round)?;
                if *status == milp_core::SolveStatus::Optimal {
                    write!(f, "LP objective = {:.3}, x = ", objective)?;
                    fmt_vec(f, x)
                } else {
                    write!(f, "LP {}", status)
                }
            }
            TraceEvent::CutAdded {
                round,
                source_var,
                cut,
            } => write!(
                f,
                "  Iteration {}: Gomory cut from row of x{}: {}",
                round,
                source_var + 1,
                cut
            ),
            TraceEvent::CutFailed { round, reason } => {
                write!(f, "  Iteration {}: no cut generated ({})", round, reason)
            }
            TraceEvent::KnapsackFathomed {
                level,
                value,
                bound,
                best,
            } => write!(
                f,
                "  Fathoming node at level {} (value {}): bound {:.3} is not better than best {}",
                level, value, bound, best
            ),
            TraceEvent::KnapsackImproved { level, value } => {
                write!(f, "  New best selection at level {}: value {}", level, value)
            }
            TraceEvent::Note(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        EventLine(self).fmt(f)
    }
}

impl fmt::Display for SolveTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for event in &self.events {
            writeln!(f, "{}", event)?;
        }
        Ok(())
    }
}
