use crate::community::{detect_communities, CommunityMap};
use crate::evaluation::{community_composition, evaluate, population_summary};
use crate::report::build_report;
use crate::VotingGraph;
use serde::Serialize;
use tracing::info;
use votegraph_core::{
    CommunitySummary, EvaluationStats, LabelSet, PopulationSummary, ReportRecord, Result,
};

/// Everything one analysis run produces from a frozen graph.
#[derive(Debug, Clone, Serialize)]
pub struct CoordinationAnalysis {
    pub report: Vec<ReportRecord>,
    pub communities: CommunityMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<EvaluationStats>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub populations: Vec<PopulationSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub compositions: Vec<CommunitySummary>,
}

impl CoordinationAnalysis {
    pub fn flagged_count(&self) -> usize {
        self.report.iter().filter(|r| r.flagged).count()
    }
}

/// Run report building and community partitioning, plus evaluation when
/// ground-truth labels are supplied. Labels never influence scores.
pub fn analyze_coordination(
    graph: &VotingGraph,
    labels: Option<&LabelSet>,
) -> Result<CoordinationAnalysis> {
    let report = build_report(graph);
    let communities = detect_communities(graph);

    let (stats, populations, compositions) = match labels {
        Some(labels) => (
            Some(evaluate(&report, labels)?),
            population_summary(&report, labels),
            community_composition(&communities, labels),
        ),
        None => (None, Vec::new(), Vec::new()),
    };

    let analysis = CoordinationAnalysis {
        report,
        communities,
        stats,
        populations,
        compositions,
    };

    info!(
        agents = graph.agent_count(),
        edges = graph.edge_count(),
        flagged = analysis.flagged_count(),
        communities = analysis.communities.community_count(),
        "Coordination analysis complete"
    );
    if let Some(ref stats) = analysis.stats {
        info!(
            precision = stats.precision,
            recall = stats.recall,
            f1 = stats.f1_score,
            "Detection effectiveness"
        );
    }

    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use votegraph_core::AgentLabel;

    fn ring_graph() -> VotingGraph {
        let members = ["r0", "r1", "r2", "r3"];
        let mut graph = VotingGraph::new();
        for author in members {
            for voter in members.iter().filter(|m| **m != author) {
                graph
                    .record_vote(voter, author, &format!("post_{}_1", author), 1)
                    .unwrap();
            }
        }
        graph.record_vote("h0", "h1", "post_h1_1", 1).unwrap();
        graph
    }

    #[test]
    fn without_labels_only_report_and_communities() {
        let analysis = analyze_coordination(&ring_graph(), None).unwrap();
        assert_eq!(analysis.report.len(), 6);
        assert_eq!(analysis.communities.len(), 6);
        assert!(analysis.stats.is_none());
        assert!(analysis.populations.is_empty());
        assert_eq!(analysis.flagged_count(), 4);

        let json = serde_json::to_value(&analysis).unwrap();
        assert!(json.get("stats").is_none());
    }

    #[test]
    fn with_labels_evaluates() {
        let labels: LabelSet = [
            ("r0", AgentLabel::Colluding),
            ("r1", AgentLabel::Colluding),
            ("r2", AgentLabel::Colluding),
            ("r3", AgentLabel::Colluding),
            ("h0", AgentLabel::Honest),
            ("h1", AgentLabel::Honest),
        ]
        .into_iter()
        .map(|(a, l)| (a.to_string(), l))
        .collect();

        let analysis = analyze_coordination(&ring_graph(), Some(&labels)).unwrap();
        let stats = analysis.stats.clone().unwrap();
        assert_eq!(stats.precision, 1.0);
        assert_eq!(stats.recall, 1.0);
        assert_eq!(stats.f1_score, 1.0);
        assert_eq!(analysis.compositions.len(), 3);
        assert_eq!(analysis.compositions[0].colluding, 4);
    }

    #[test]
    fn missing_label_propagates() {
        let labels: LabelSet = [("r0".to_string(), AgentLabel::Colluding)].into_iter().collect();
        assert!(analyze_coordination(&ring_graph(), Some(&labels)).is_err());
    }
}
