//! 0/1 knapsack by depth-first branch-and-bound.
//!
//! Items are sorted by density. The search walks include/exclude decisions
//! level by level using an explicit stack of frames, so depth is bounded
//! by the heap rather than the call stack. When maximizing, a node is
//! fathomed when its value plus the fractional bound cannot beat the best
//! complete selection; when minimizing, when its accumulated value is
//! already no better than the best.

mod item;

pub use item::{fractional_bound, sort_by_density, Item};

use std::time::Instant;

use milp_core::ObjectiveSense;
use serde::Serialize;

use crate::error::{MipError, MipResult};
use crate::trace::{SolveTrace, TraceEvent};

/// Validated knapsack instance.
#[derive(Debug, Clone, PartialEq)]
pub struct KnapsackProblem {
    /// Item values.
    pub values: Vec<f64>,

    /// Item weights.
    pub weights: Vec<f64>,

    /// Capacity.
    pub capacity: f64,

    /// Objective direction.
    pub sense: ObjectiveSense,
}

impl KnapsackProblem {
    /// Build and validate an instance.
    pub fn new(
        values: Vec<f64>,
        weights: Vec<f64>,
        capacity: f64,
        sense: ObjectiveSense,
    ) -> MipResult<Self> {
        if values.len() != weights.len() {
            return Err(MipError::InvalidKnapsack(format!(
                "{} values but {} weights",
                values.len(),
                weights.len()
            )));
        }
        if let Some(i) = weights.iter().position(|w| !w.is_finite() || *w <= 0.0) {
            return Err(MipError::InvalidKnapsack(format!(
                "weight of item {} must be positive and finite, got {}",
                i, weights[i]
            )));
        }
        if let Some(i) = values.iter().position(|v| !v.is_finite() || *v < 0.0) {
            return Err(MipError::InvalidKnapsack(format!(
                "value of item {} must be non-negative and finite, got {}",
                i, values[i]
            )));
        }
        if !capacity.is_finite() || capacity < 0.0 {
            return Err(MipError::InvalidKnapsack(format!(
                "capacity must be non-negative and finite, got {}",
                capacity
            )));
        }
        Ok(Self {
            values,
            weights,
            capacity,
            sense,
        })
    }

    /// Number of items.
    pub fn num_items(&self) -> usize {
        self.values.len()
    }
}

/// Result of a knapsack solve.
#[derive(Debug, Clone, Serialize)]
pub struct KnapsackSolution {
    /// Best total value.
    pub best_value: f64,

    /// Included items, original 0-based indices in ascending order.
    pub included: Vec<usize>,

    /// Total weight of the included items.
    pub total_weight: f64,

    /// Search nodes visited.
    pub nodes_explored: u64,

    /// Search nodes fathomed.
    pub nodes_fathomed: u64,

    /// Total solve time in milliseconds.
    pub solve_time_ms: u64,

    /// Audit log.
    pub trace: SolveTrace,
}

/// Pending search state: decisions for `items[..level]` are fixed.
struct Frame {
    level: usize,
    value: f64,
    weight: f64,
    taken: Vec<bool>,
}

/// Depth-first knapsack branch-and-bound.
pub struct KnapsackSolver {
    problem: KnapsackProblem,
    items: Vec<Item>,
    best_value: f64,
    best_taken: Vec<bool>,
    nodes_explored: u64,
    nodes_fathomed: u64,
    trace: SolveTrace,
}

impl KnapsackSolver {
    /// Prepare a solver (sorts items by density).
    pub fn new(problem: KnapsackProblem) -> Self {
        let items = sort_by_density(&problem.values, &problem.weights);
        let n = problem.num_items();
        Self {
            best_value: problem.sense.worst_value(),
            best_taken: vec![false; n],
            items,
            problem,
            nodes_explored: 0,
            nodes_fathomed: 0,
            trace: SolveTrace::new(),
        }
    }

    /// Run the search.
    pub fn solve(mut self) -> KnapsackSolution {
        let start = Instant::now();
        let n = self.items.len();
        self.trace.note(format!(
            "Knapsack: {} items, capacity {}, {}",
            n, self.problem.capacity, self.problem.sense
        ));

        let mut stack = vec![Frame {
            level: 0,
            value: 0.0,
            weight: 0.0,
            taken: vec![false; n],
        }];

        while let Some(frame) = stack.pop() {
            self.nodes_explored += 1;

            if self.should_fathom(&frame) {
                continue;
            }

            if frame.level == n {
                if self.problem.sense.is_better(frame.value, self.best_value, 0.0) {
                    self.best_value = frame.value;
                    self.best_taken = frame.taken;
                    self.trace.push(TraceEvent::KnapsackImproved {
                        level: n,
                        value: self.best_value,
                    });
                }
                continue;
            }

            let item = self.items[frame.level];

            let include = (frame.weight + item.weight <= self.problem.capacity).then(|| {
                let mut taken = frame.taken.clone();
                taken[frame.level] = true;
                Frame {
                    level: frame.level + 1,
                    value: frame.value + item.value,
                    weight: frame.weight + item.weight,
                    taken,
                }
            });
            let exclude = Frame {
                level: frame.level + 1,
                value: frame.value,
                weight: frame.weight,
                taken: frame.taken,
            };

            // Popped next: include when maximizing, exclude when minimizing
            match self.problem.sense {
                ObjectiveSense::Maximize => {
                    stack.push(exclude);
                    stack.extend(include);
                }
                ObjectiveSense::Minimize => {
                    stack.extend(include);
                    stack.push(exclude);
                }
            }
        }

        let mut included: Vec<usize> = self
            .items
            .iter()
            .zip(self.best_taken.iter())
            .filter(|(_, &t)| t)
            .map(|(item, _)| item.index)
            .collect();
        included.sort_unstable();
        let total_weight = included.iter().map(|&i| self.problem.weights[i]).sum();

        let best_value = if self.best_value.is_finite() {
            self.best_value
        } else {
            0.0
        };

        log::debug!(
            "knapsack: best={} items={:?} nodes={} fathomed={}",
            best_value,
            included,
            self.nodes_explored,
            self.nodes_fathomed
        );

        KnapsackSolution {
            best_value,
            included,
            total_weight,
            nodes_explored: self.nodes_explored,
            nodes_fathomed: self.nodes_fathomed,
            solve_time_ms: start.elapsed().as_millis() as u64,
            trace: self.trace,
        }
    }

    fn should_fathom(&mut self, frame: &Frame) -> bool {
        let bound = match self.problem.sense {
            ObjectiveSense::Maximize => {
                let remaining = self.problem.capacity - frame.weight;
                let bound = frame.value + fractional_bound(&self.items, frame.level, remaining);
                if bound > self.best_value {
                    return false;
                }
                bound
            }
            ObjectiveSense::Minimize => {
                if frame.value < self.best_value {
                    return false;
                }
                frame.value
            }
        };

        self.nodes_fathomed += 1;
        self.trace.push(TraceEvent::KnapsackFathomed {
            level: frame.level,
            value: frame.value,
            bound,
            best: self.best_value,
        });
        true
    }
}
