//! Knobs shared by the branch-and-bound and cutting-plane solvers.

use milp_core::SimplexSettings;

/// How the variable to branch on is chosen among the fractional ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BranchingRule {
    /// Largest distance to the nearest integer; lowest index on ties.
    #[default]
    MostFractional,

    /// Lowest-index fractional variable.
    FirstFractional,
}

/// Order in which open nodes are processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeSelection {
    /// Best cached relaxation objective first.
    #[default]
    BestFirst,

    /// Deepest node first, down child before up child.
    DepthFirst,
}

/// MIP solver settings.
///
/// `Default` reads `MILP_MAX_NODES` and `MILP_MAX_CUT_ROUNDS` from the
/// environment; the nested simplex settings read their own variables.
#[derive(Debug, Clone)]
pub struct MipSettings {
    /// Node budget for branch-and-bound.
    pub max_nodes: u64,

    /// Wall-clock budget in milliseconds.
    pub time_limit_ms: Option<u64>,

    /// Round budget for the cutting-plane loop.
    pub max_cut_rounds: usize,

    /// Branch-and-bound integrality tolerance: `|x - round(x)| <= int_feas_tol`.
    pub int_feas_tol: f64,

    /// Cutting-plane integrality tolerance, also the degenerate-cut threshold.
    pub cut_int_tol: f64,

    /// Margin by which a node's relaxation must beat the incumbent.
    pub bound_tol: f64,

    /// Branching variable choice.
    pub branching_rule: BranchingRule,

    /// Open-node ordering.
    pub node_selection: NodeSelection,

    /// Used for every LP relaxation.
    pub simplex: SimplexSettings,

    /// Emit `log::info!` progress lines.
    pub verbose: bool,

    /// Progress line every `log_freq` nodes (or cut rounds).
    pub log_freq: u64,
}

fn env_or<T: std::str::FromStr>(key: &str, fallback: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(fallback)
}

impl Default for MipSettings {
    fn default() -> Self {
        let simplex = SimplexSettings::default();
        Self {
            max_nodes: env_or("MILP_MAX_NODES", 100_000),
            time_limit_ms: None,
            max_cut_rounds: env_or("MILP_MAX_CUT_ROUNDS", 200),
            int_feas_tol: 1e-3,
            cut_int_tol: 1e-4,
            bound_tol: 1e-9,
            branching_rule: BranchingRule::MostFractional,
            node_selection: NodeSelection::BestFirst,
            verbose: simplex.verbose,
            simplex,
            log_freq: 100,
        }
    }
}

impl MipSettings {
    /// Defaults with a progress line for every node.
    pub fn verbose() -> Self {
        Self {
            verbose: true,
            log_freq: 1,
            ..Self::default()
        }
    }

    /// Stop after `seconds` of wall-clock time.
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit_ms = Some((seconds * 1000.0) as u64);
        self
    }

    /// Set the node budget.
    pub fn with_max_nodes(mut self, nodes: u64) -> Self {
        self.max_nodes = nodes;
        self
    }

    /// Set the cut round budget.
    pub fn with_max_cut_rounds(mut self, rounds: usize) -> Self {
        self.max_cut_rounds = rounds;
        self
    }

    /// Set the node ordering.
    pub fn with_node_selection(mut self, selection: NodeSelection) -> Self {
        self.node_selection = selection;
        self
    }

    /// Set the branching rule.
    pub fn with_branching_rule(mut self, rule: BranchingRule) -> Self {
        self.branching_rule = rule;
        self
    }

    /// Replace the simplex settings used for relaxations.
    pub fn with_simplex(mut self, simplex: SimplexSettings) -> Self {
        self.simplex = simplex;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = MipSettings::default();
        assert_eq!(s.int_feas_tol, 1e-3);
        assert_eq!(s.cut_int_tol, 1e-4);
        assert_eq!(s.node_selection, NodeSelection::BestFirst);
        assert_eq!(s.branching_rule, BranchingRule::MostFractional);
        assert!(s.time_limit_ms.is_none());
    }

    #[test]
    fn test_builders() {
        let s = MipSettings::verbose()
            .with_time_limit(1.5)
            .with_max_nodes(7)
            .with_node_selection(NodeSelection::DepthFirst)
            .with_simplex(SimplexSettings::default().with_max_iter(5));
        assert!(s.verbose);
        assert_eq!(s.simplex.max_iter, 5);
        assert_eq!(s.log_freq, 1);
        assert_eq!(s.time_limit_ms, Some(1500));
        assert_eq!(s.max_nodes, 7);
        assert_eq!(s.node_selection, NodeSelection::DepthFirst);
    }
}
