//! Detection quality against externally supplied ground truth.
//!
//! Purely diagnostic: nothing here feeds back into scoring.

use crate::community::CommunityMap;
use std::collections::BTreeMap;
use votegraph_core::{
    AgentLabel, CommunityId, CommunitySummary, EvaluationStats, LabelSet, PopulationSummary,
    ReportRecord, Result, VoteGraphError,
};

/// Confusion counts of `report` flags against `labels`.
///
/// Every agent in the report must carry a label.
pub fn evaluate(report: &[ReportRecord], labels: &LabelSet) -> Result<EvaluationStats> {
    let (mut tp, mut fp, mut fneg, mut tn) = (0usize, 0usize, 0usize, 0usize);

    for record in report {
        let label = labels
            .get(&record.agent_id)
            .ok_or_else(|| VoteGraphError::MissingLabel(record.agent_id.clone()))?;
        match (record.flagged, label.is_positive()) {
            (true, true) => tp += 1,
            (true, false) => fp += 1,
            (false, true) => fneg += 1,
            (false, false) => tn += 1,
        }
    }

    Ok(stats_from_counts(tp, fp, fneg, tn))
}

/// Precision, recall and F1, each 0 when its denominator is 0.
pub fn stats_from_counts(
    true_positives: usize,
    false_positives: usize,
    false_negatives: usize,
    true_negatives: usize,
) -> EvaluationStats {
    let precision = ratio(true_positives, true_positives + false_positives);
    let recall = ratio(true_positives, true_positives + false_negatives);
    let f1_score = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    EvaluationStats {
        precision,
        recall,
        f1_score,
        true_positives,
        false_positives,
        false_negatives,
        true_negatives,
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Mean metrics and flag counts per label group, in [`AgentLabel::ALL`]
/// order. Report agents without a label are skipped.
pub fn population_summary(report: &[ReportRecord], labels: &LabelSet) -> Vec<PopulationSummary> {
    AgentLabel::ALL
        .iter()
        .map(|&label| {
            let members: Vec<&ReportRecord> = report
                .iter()
                .filter(|r| labels.get(&r.agent_id) == Some(&label))
                .collect();
            let mean = |f: fn(&ReportRecord) -> f64| {
                if members.is_empty() {
                    0.0
                } else {
                    members.iter().map(|r| f(r)).sum::<f64>() / members.len() as f64
                }
            };

            PopulationSummary {
                label,
                members: members.len(),
                mean_clustering: mean(|r| r.clustering_coefficient),
                mean_diversity: mean(|r| r.external_diversity_ratio),
                mean_score: mean(|r| r.coordination_score),
                flagged: members.iter().filter(|r| r.flagged).count(),
            }
        })
        .collect()
}

/// Label breakdown of every community, ordered by community id.
pub fn community_composition(
    communities: &CommunityMap,
    labels: &LabelSet,
) -> Vec<CommunitySummary> {
    let mut by_id: BTreeMap<CommunityId, CommunitySummary> = BTreeMap::new();

    for assignment in communities.iter() {
        let summary = by_id
            .entry(assignment.community_id)
            .or_insert_with(|| CommunitySummary {
                community_id: assignment.community_id,
                members: 0,
                honest: 0,
                colluding: 0,
                spammer: 0,
                unlabeled: 0,
            });
        summary.members += 1;
        match labels.get(&assignment.agent_id) {
            Some(AgentLabel::Honest) => summary.honest += 1,
            Some(AgentLabel::Colluding) => summary.colluding += 1,
            Some(AgentLabel::Spammer) => summary.spammer += 1,
            None => summary.unlabeled += 1,
        }
    }

    by_id.into_values().collect()
}
