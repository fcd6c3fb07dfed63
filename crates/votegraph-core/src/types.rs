use crate::{Result, VoteGraphError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub type AgentId = String;
pub type PostId = String;
/// Logical simulation day, not wall-clock time.
pub type Day = u32;
pub type CommunityId = usize;

/// Ground-truth labels keyed by agent. Only used for evaluation.
pub type LabelSet = HashMap<AgentId, AgentLabel>;

/// One upvote: `from_agent_id` endorsed a post authored by `to_agent_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoteEvent {
    pub from_agent_id: AgentId,
    pub to_agent_id: AgentId,
    pub post_id: PostId,
    pub day: Day,
}

impl VoteEvent {
    pub fn new(
        from: impl Into<AgentId>,
        to: impl Into<AgentId>,
        post_id: impl Into<PostId>,
        day: Day,
    ) -> Self {
        Self {
            from_agent_id: from.into(),
            to_agent_id: to.into(),
            post_id: post_id.into(),
            day,
        }
    }

    /// Rejects events whose identifiers are empty or whitespace-only.
    pub fn validate(&self) -> Result<()> {
        if self.from_agent_id.trim().is_empty() {
            return Err(VoteGraphError::Validation(format!(
                "vote on post '{}' has an empty from_agent_id",
                self.post_id
            )));
        }
        if self.to_agent_id.trim().is_empty() {
            return Err(VoteGraphError::Validation(format!(
                "vote by '{}' on post '{}' has an empty to_agent_id",
                self.from_agent_id, self.post_id
            )));
        }
        if self.post_id.trim().is_empty() {
            return Err(VoteGraphError::Validation(format!(
                "vote {} -> {} has an empty post_id",
                self.from_agent_id, self.to_agent_id
            )));
        }
        Ok(())
    }

    pub fn is_self_vote(&self) -> bool {
        self.from_agent_id == self.to_agent_id
    }
}

/// A finalized post as handed over by the economic simulation: its author
/// and the agents that upvoted it that day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostBatch {
    pub post_id: PostId,
    pub author_id: AgentId,
    pub day: Day,
    #[serde(default)]
    pub upvotes: Vec<AgentId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentLabel {
    Honest,
    #[serde(alias = "vote-ring")]
    Colluding,
    Spammer,
}

impl AgentLabel {
    pub const ALL: [AgentLabel; 3] = [AgentLabel::Honest, AgentLabel::Colluding, AgentLabel::Spammer];

    /// Whether the agent belongs to the population the detector should flag.
    pub fn is_positive(self) -> bool {
        matches!(self, AgentLabel::Colluding)
    }
}

impl fmt::Display for AgentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AgentLabel::Honest => "honest",
            AgentLabel::Colluding => "colluding",
            AgentLabel::Spammer => "spammer",
        };
        write!(f, "{}", s)
    }
}

/// Per-agent detection result. Built once per analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub agent_id: AgentId,
    pub upvoters: usize,
    pub upvotes_given: usize,
    pub clustering_coefficient: f64,
    pub external_diversity_ratio: f64,
    pub coordination_score: f64,
    pub flagged: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationStats {
    pub precision: f64,
    pub recall: f64,
    #[serde(rename = "f1Score")]
    pub f1_score: f64,
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub true_negatives: usize,
}

/// Aggregate metrics for one ground-truth population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationSummary {
    pub label: AgentLabel,
    pub members: usize,
    pub mean_clustering: f64,
    pub mean_diversity: f64,
    pub mean_score: f64,
    pub flagged: usize,
}

/// Label breakdown of one detected community.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunitySummary {
    pub community_id: CommunityId,
    pub members: usize,
    pub honest: usize,
    pub colluding: usize,
    pub spammer: usize,
    pub unlabeled: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_identifiers_fail_validation() {
        assert!(VoteEvent::new("a", "b", "p1", 0).validate().is_ok());
        assert!(matches!(
            VoteEvent::new("", "b", "p1", 0).validate(),
            Err(VoteGraphError::Validation(_))
        ));
        assert!(VoteEvent::new("a", "  ", "p1", 0).validate().is_err());
        assert!(VoteEvent::new("a", "b", "", 0).validate().is_err());
    }

    #[test]
    fn negative_day_is_rejected_on_decode() {
        let raw = r#"{"from_agent_id":"a","to_agent_id":"b","post_id":"p","day":-1}"#;
        assert!(serde_json::from_str::<VoteEvent>(raw).is_err());
    }

    #[test]
    fn label_parsing_accepts_vote_ring_alias() {
        let label: AgentLabel = serde_json::from_str("\"vote-ring\"").unwrap();
        assert_eq!(label, AgentLabel::Colluding);
        assert!(AgentLabel::Colluding.is_positive());
        assert!(!AgentLabel::Spammer.is_positive());
        assert!(serde_json::from_str::<AgentLabel>("\"bot\"").is_err());
        assert_eq!(AgentLabel::Colluding.to_string(), "colluding");
    }

    #[test]
    fn f1_field_uses_camel_case_name() {
        let json = serde_json::to_value(EvaluationStats::default()).unwrap();
        assert!(json.get("f1Score").is_some());
        assert!(json.get("f1_score").is_none());
    }
}
