use crate::metrics::{agent_metrics, AgentMetrics};
use crate::VotingGraph;

/// Clustering at or below this contributes nothing.
pub const CLUSTERING_THRESHOLD: f64 = 0.8;
/// Diversity at or above this contributes nothing.
pub const DIVERSITY_THRESHOLD: f64 = 0.3;
/// Maximum contribution of the clustering term (reached at clustering 1.0).
pub const CLUSTERING_WEIGHT: f64 = 0.6;
/// Maximum contribution of the diversity term (reached at diversity 0.0).
pub const DIVERSITY_WEIGHT: f64 = 0.4;
/// Scores strictly above this are flagged.
pub const FLAG_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentScore {
    pub metrics: AgentMetrics,
    pub coordination_score: f64,
    pub flagged: bool,
}

/// Combine clustering and diversity into a score in `[0, 1]`.
///
/// Clustering alone tops out at 0.6, below the flag threshold, so only an
/// agent that is both tightly clustered and insular gets flagged.
pub fn coordination_score(clustering: f64, diversity: f64) -> f64 {
    let c_term = if clustering > CLUSTERING_THRESHOLD {
        CLUSTERING_WEIGHT * (clustering - CLUSTERING_THRESHOLD) / (1.0 - CLUSTERING_THRESHOLD)
    } else {
        0.0
    };
    let d_term = if diversity < DIVERSITY_THRESHOLD {
        DIVERSITY_WEIGHT * (DIVERSITY_THRESHOLD - diversity) / DIVERSITY_THRESHOLD
    } else {
        0.0
    };
    (c_term + d_term).clamp(0.0, 1.0)
}

pub fn is_flagged(score: f64) -> bool {
    score > FLAG_THRESHOLD
}

pub fn score_metrics(metrics: AgentMetrics) -> AgentScore {
    let score = coordination_score(
        metrics.clustering_coefficient,
        metrics.external_diversity_ratio,
    );
    AgentScore {
        metrics,
        coordination_score: score,
        flagged: is_flagged(score),
    }
}

pub fn score_agent(graph: &VotingGraph, agent: &str) -> AgentScore {
    score_metrics(agent_metrics(graph, agent))
}
