//! Node priority queue for B&B tree exploration.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use milp_core::ObjectiveSense;

use super::SearchNode;
use crate::model::IncumbentTracker;
use crate::settings::NodeSelection;

/// Entry in the node queue with priority.
struct QueuedNode {
    node: SearchNode,
    priority: f64, // Higher = selected first
    seq: u64,
}

impl QueuedNode {
    fn key(&self) -> (f64, std::cmp::Reverse<u64>) {
        (self.priority, std::cmp::Reverse(self.seq))
    }
}

impl PartialEq for QueuedNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueuedNode {}

impl PartialOrd for QueuedNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Higher priority first, then earlier insertion
        let (p1, s1) = self.key();
        let (p2, s2) = other.key();
        p1.total_cmp(&p2).then(s1.cmp(&s2))
    }
}

/// Priority queue for B&B nodes.
pub struct NodeQueue {
    /// Node selection strategy.
    strategy: NodeSelection,

    /// Objective direction.
    sense: ObjectiveSense,

    /// Priority queue (max-heap by priority).
    heap: BinaryHeap<QueuedNode>,

    /// Count of nodes added.
    nodes_added: u64,
}

impl NodeQueue {
    /// Create a new node queue with the given strategy.
    pub fn new(strategy: NodeSelection, sense: ObjectiveSense) -> Self {
        Self {
            strategy,
            sense,
            heap: BinaryHeap::new(),
            nodes_added: 0,
        }
    }

    /// Add a node to the queue.
    pub fn push(&mut self, node: SearchNode) {
        let priority = self.compute_priority(&node);
        let seq = self.nodes_added;
        self.heap.push(QueuedNode {
            node,
            priority,
            seq,
        });
        self.nodes_added += 1;
    }

    /// Get the next node to process.
    pub fn pop(&mut self) -> Option<SearchNode> {
        self.heap.pop().map(|q| q.node)
    }

    /// Best relaxed objective across open nodes (None when empty).
    pub fn best_bound(&self) -> Option<f64> {
        let sign = -self.sense.min_sign();
        self.heap
            .iter()
            .map(|q| q.node.relaxed_obj)
            .max_by(|a, b| (sign * a).total_cmp(&(sign * b)))
    }

    /// Remove nodes that cannot beat the incumbent.
    ///
    /// Returns the pruned nodes in priority order.
    pub fn prune_by_bound(&mut self, incumbent: &IncumbentTracker) -> Vec<SearchNode> {
        let (pruned, kept): (Vec<QueuedNode>, Vec<QueuedNode>) = self
            .heap
            .drain()
            .partition(|q| q.node.can_prune(incumbent));

        self.heap = kept.into_iter().collect();

        let mut pruned = pruned;
        pruned.sort_by(|a, b| b.cmp(a));
        pruned.into_iter().map(|q| q.node).collect()
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Get the number of nodes in the queue.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Get the total number of nodes added.
    pub fn total_added(&self) -> u64 {
        self.nodes_added
    }

    /// Compute priority for a node based on selection strategy.
    fn compute_priority(&self, node: &SearchNode) -> f64 {
        match self.strategy {
            NodeSelection::BestFirst => {
                // Highest objective first when maximizing, lowest when minimizing
                -self.sense.min_sign() * node.relaxed_obj
            }
            NodeSelection::DepthFirst => {
                // Deepest first; siblings in creation order (down before up)
                node.depth as f64
            }
        }
    }
}
