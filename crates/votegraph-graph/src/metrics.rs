//! Per-agent structural metrics over a frozen [`VotingGraph`].
//!
//! Both metrics look only at the deduplicated `given`/`received` sets, so an
//! ordered pair that voted once weighs the same as one that voted on every
//! post.

use crate::VotingGraph;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentMetrics {
    pub clustering_coefficient: f64,
    pub external_diversity_ratio: f64,
}

/// Fraction of unordered pairs among `agent`'s upvoters that are linked by
/// an upvote in either direction.
///
/// Returns 0.0 for unknown agents and agents with fewer than two upvoters.
/// Cost is O(k²) in the number of upvoters k, so a single hub with a very
/// large fan-in dominates a full report.
pub fn clustering_coefficient(graph: &VotingGraph, agent: &str) -> f64 {
    let Some(node) = graph.node(agent) else {
        return 0.0;
    };

    let upvoters: Vec<&str> = node.received.iter().map(String::as_str).collect();
    let k = upvoters.len();
    if k < 2 {
        return 0.0;
    }

    let mut connected = 0usize;
    for (i, &u1) in upvoters.iter().enumerate() {
        let n1 = graph.node(u1);
        for &u2 in &upvoters[i + 1..] {
            let linked = n1.is_some_and(|n| n.has_given_to(u2))
                || graph.node(u2).is_some_and(|n| n.has_given_to(u1));
            if linked {
                connected += 1;
            }
        }
    }

    let total_pairs = k * (k - 1) / 2;
    connected as f64 / total_pairs as f64
}

/// Share of the upvoters' own votes that land outside `agent`'s circle
/// (neither `agent` itself nor another of its upvoters).
///
/// Returns 1.0 for unknown agents, agents without upvoters, and upvoters
/// that never voted.
pub fn external_diversity_ratio(graph: &VotingGraph, agent: &str) -> f64 {
    let Some(node) = graph.node(agent) else {
        return 1.0;
    };
    if node.received.is_empty() {
        return 1.0;
    }

    let mut total_given = 0usize;
    let mut external = 0usize;
    for upvoter in &node.received {
        let Some(upvoter_node) = graph.node(upvoter) else {
            continue;
        };
        total_given += upvoter_node.given.len();
        external += upvoter_node
            .given
            .iter()
            .filter(|target| target.as_str() != agent && !node.received.contains(target.as_str()))
            .count();
    }

    if total_given == 0 {
        return 1.0;
    }
    external as f64 / total_given as f64
}

pub fn agent_metrics(graph: &VotingGraph, agent: &str) -> AgentMetrics {
    AgentMetrics {
        clustering_coefficient: clustering_coefficient(graph, agent),
        external_diversity_ratio: external_diversity_ratio(graph, agent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn graph_from(pairs: &[(&str, &str)]) -> VotingGraph {
        let mut graph = VotingGraph::new();
        for (i, (from, to)) in pairs.iter().enumerate() {
            graph
                .record_vote(from, to, &format!("post_{}_{}", to, i), 0)
                .unwrap();
        }
        graph
    }

    #[test]
    fn clustering_needs_two_upvoters() {
        let graph = graph_from(&[("a", "target")]);
        assert_eq!(clustering_coefficient(&graph, "target"), 0.0);
        assert_eq!(clustering_coefficient(&graph, "a"), 0.0);
    }

    #[test]
    fn clustering_counts_either_direction() {
        // Upvoters a, b, c of target; only a->b links them.
        let graph = graph_from(&[("a", "target"), ("b", "target"), ("c", "target"), ("a", "b")]);
        assert_relative_eq!(clustering_coefficient(&graph, "target"), 1.0 / 3.0);

        // b->a adds nothing new for the {a, b} pair.
        let graph = graph_from(&[
            ("a", "target"),
            ("b", "target"),
            ("c", "target"),
            ("a", "b"),
            ("b", "a"),
            ("c", "a"),
        ]);
        assert_relative_eq!(clustering_coefficient(&graph, "target"), 2.0 / 3.0);
    }

    #[test]
    fn unknown_agent_gets_degenerate_defaults() {
        let graph = graph_from(&[("a", "b")]);
        let metrics = agent_metrics(&graph, "nobody");
        assert_eq!(metrics.clustering_coefficient, 0.0);
        assert_eq!(metrics.external_diversity_ratio, 1.0);
    }

    #[test]
    fn diversity_defaults_to_one_without_upvoters() {
        let graph = graph_from(&[("a", "b")]);
        assert_eq!(external_diversity_ratio(&graph, "a"), 1.0);
    }

    #[test]
    fn diversity_excludes_target_and_circle() {
        // Upvoters of t: a, b. a votes {t, b, x}; b votes {t, y}.
        // total_given = 5, external = x, y = 2.
        let graph = graph_from(&[("a", "t"), ("b", "t"), ("a", "b"), ("a", "x"), ("b", "y")]);
        assert_relative_eq!(external_diversity_ratio(&graph, "t"), 2.0 / 5.0);
    }

    #[test]
    fn diversity_of_closed_pair_is_zero() {
        let graph = graph_from(&[("a", "b"), ("b", "a")]);
        assert_eq!(external_diversity_ratio(&graph, "a"), 0.0);
        assert_eq!(external_diversity_ratio(&graph, "b"), 0.0);
    }

    #[test]
    fn metrics_stay_in_unit_interval() {
        let graph = graph_from(&[
            ("a", "t"),
            ("b", "t"),
            ("c", "t"),
            ("a", "b"),
            ("b", "c"),
            ("c", "a"),
            ("a", "z"),
        ]);
        for agent in graph.agents() {
            let m = agent_metrics(&graph, agent);
            assert!((0.0..=1.0).contains(&m.clustering_coefficient));
            assert!((0.0..=1.0).contains(&m.external_diversity_ratio));
        }
    }
}
