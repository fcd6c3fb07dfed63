use crate::scoring::score_agent;
use crate::VotingGraph;
use votegraph_core::ReportRecord;

/// One record per graph agent, highest coordination score first.
///
/// Ties keep graph insertion order (the sort is stable).
pub fn build_report(graph: &VotingGraph) -> Vec<ReportRecord> {
    let mut report: Vec<ReportRecord> = graph
        .iter()
        .map(|(agent, node)| {
            let scored = score_agent(graph, agent);
            ReportRecord {
                agent_id: agent.clone(),
                upvoters: node.received.len(),
                upvotes_given: node.given.len(),
                clustering_coefficient: scored.metrics.clustering_coefficient,
                external_diversity_ratio: scored.metrics.external_diversity_ratio,
                coordination_score: scored.coordination_score,
                flagged: scored.flagged,
            }
        })
        .collect();

    report.sort_by(|a, b| b.coordination_score.total_cmp(&a.coordination_score));
    report
}

pub fn flagged_agents(report: &[ReportRecord]) -> impl Iterator<Item = &ReportRecord> + '_ {
    report.iter().filter(|r| r.flagged)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_covers_every_agent_with_raw_counts() {
        let mut graph = VotingGraph::new();
        graph.record_vote("a", "b", "p1", 0).unwrap();
        graph.record_vote("a", "b", "p2", 1).unwrap();
        graph.record_vote("c", "b", "p1", 0).unwrap();

        let report = build_report(&graph);
        assert_eq!(report.len(), 3);

        let b = report.iter().find(|r| r.agent_id == "b").unwrap();
        assert_eq!(b.upvoters, 2);
        assert_eq!(b.upvotes_given, 0);
        let a = report.iter().find(|r| r.agent_id == "a").unwrap();
        assert_eq!(a.upvotes_given, 1);
    }

    #[test]
    fn sorted_descending_with_stable_ties() {
        let mut graph = VotingGraph::new();
        // Isolated pair scores 0 for everyone.
        graph.record_vote("first", "second", "p0", 0).unwrap();
        // Closed triangle: each member has clustering 1.0 and diversity 0.0.
        for (from, to) in [("x", "y"), ("y", "x"), ("y", "z"), ("z", "y"), ("x", "z"), ("z", "x")] {
            graph.record_vote(from, to, &format!("post_{}", to), 1).unwrap();
        }

        let report = build_report(&graph);
        let order: Vec<_> = report.iter().map(|r| r.agent_id.as_str()).collect();
        assert_eq!(order, vec!["x", "y", "z", "first", "second"]);
        assert_eq!(flagged_agents(&report).count(), 3);
        assert!(report
            .windows(2)
            .all(|w| w[0].coordination_score >= w[1].coordination_score));
    }

    #[test]
    fn empty_graph_yields_empty_report() {
        assert!(build_report(&VotingGraph::new()).is_empty());
    }
}
