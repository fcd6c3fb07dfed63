//! Adapters from the simulation's outputs to vote events and labels.

use crate::VotingGraph;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;
use votegraph_core::{AgentId, AgentLabel, LabelSet, PostBatch, Result, VoteEvent};

/// One `(upvoter, author, post, day)` event per upvote entry, in post order.
///
/// Entries naming the post's own author are dropped: authors never count as
/// upvoters of their own posts.
pub fn events_from_posts(posts: &[PostBatch]) -> Vec<VoteEvent> {
    posts
        .iter()
        .flat_map(|post| {
            post.upvotes
                .iter()
                .filter(move |upvoter| **upvoter != post.author_id)
                .map(move |upvoter| {
                    VoteEvent::new(
                        upvoter.clone(),
                        post.author_id.clone(),
                        post.post_id.clone(),
                        post.day,
                    )
                })
        })
        .collect()
}

impl VotingGraph {
    pub fn from_posts(posts: &[PostBatch]) -> Result<Self> {
        Self::from_events(events_from_posts(posts))
    }
}

pub fn load_events(path: &Path) -> Result<Vec<VoteEvent>> {
    let events: Vec<VoteEvent> = read_records(path)?;
    debug!(path = %path.display(), events = events.len(), "Loaded vote events");
    Ok(events)
}

pub fn load_posts(path: &Path) -> Result<Vec<PostBatch>> {
    let posts: Vec<PostBatch> = read_records(path)?;
    debug!(path = %path.display(), posts = posts.len(), "Loaded post batches");
    Ok(posts)
}

#[derive(Deserialize)]
struct LabelRecord {
    agent_id: AgentId,
    label: AgentLabel,
}

/// Labels from a JSON object (`{"agent": "honest", ...}`) or, for `.jsonl`
/// files, one `{"agent_id": .., "label": ..}` record per line.
pub fn load_labels(path: &Path) -> Result<LabelSet> {
    let labels: LabelSet = if is_json_lines(path) {
        read_json_lines::<LabelRecord>(path)?
            .into_iter()
            .map(|r| (r.agent_id, r.label))
            .collect()
    } else {
        let file = std::fs::File::open(path)?;
        serde_json::from_reader(BufReader::new(file))?
    };
    debug!(path = %path.display(), labels = labels.len(), "Loaded ground-truth labels");
    Ok(labels)
}

fn is_json_lines(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("jsonl")
}

/// A JSON array, or JSON lines when the extension is `.jsonl`.
fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if is_json_lines(path) {
        return read_json_lines(path);
    }
    let file = std::fs::File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

fn read_json_lines<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = std::fs::File::open(path)?;
    let mut records = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }
    Ok(records)
}
