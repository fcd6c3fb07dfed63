use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, warn};
use votegraph_core::{AgentId, Day, Result, VoteEvent, VoteGraphError};

/// Deduplicated voting relations of a single agent.
#[derive(Debug, Clone, Default)]
pub struct AgentNode {
    /// Agents this one has upvoted, across all posts.
    pub given: FxHashSet<AgentId>,
    /// Agents who have upvoted this one, across all posts.
    pub received: FxHashSet<AgentId>,
}

impl AgentNode {
    pub fn has_given_to(&self, agent: &str) -> bool {
        self.given.contains(agent)
    }

    pub fn has_received_from(&self, agent: &str) -> bool {
        self.received.contains(agent)
    }
}

/// Directed upvote graph built once from a finite event log.
///
/// Nodes are created lazily the first time an identifier shows up in an
/// event and are never removed. Node order is insertion order, which the
/// report builder uses to break score ties.
#[derive(Debug, Clone, Default)]
pub struct VotingGraph {
    index: FxHashMap<AgentId, usize>,
    agents: Vec<AgentId>,
    nodes: Vec<AgentNode>,
    edges: Vec<VoteEvent>,
}

impl VotingGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Batch-build a graph. Stops at the first malformed event.
    pub fn from_events<I>(events: I) -> Result<Self>
    where
        I: IntoIterator<Item = VoteEvent>,
    {
        let mut graph = Self::new();
        for (position, event) in events.into_iter().enumerate() {
            graph.record_event(event).map_err(|e| match e {
                VoteGraphError::Validation(msg) => {
                    VoteGraphError::Validation(format!("event #{}: {}", position, msg))
                }
                other => other,
            })?;
        }
        debug!(
            agents = graph.agent_count(),
            edges = graph.edge_count(),
            "Built voting graph"
        );
        Ok(graph)
    }

    pub fn record_vote(&mut self, from: &str, to: &str, post_id: &str, day: Day) -> Result<()> {
        self.record_event(VoteEvent::new(from, to, post_id, day))
    }

    /// Append one event and update the two involved nodes.
    ///
    /// Repeating an ordered pair only grows the edge log; set membership is
    /// unchanged.
    pub fn record_event(&mut self, event: VoteEvent) -> Result<()> {
        event.validate()?;
        if event.is_self_vote() {
            warn!(
                agent = %event.from_agent_id,
                post = %event.post_id,
                "Self-vote reached the voting graph"
            );
        }

        let from = self.node_index_or_insert(&event.from_agent_id);
        let to = self.node_index_or_insert(&event.to_agent_id);

        self.nodes[from].given.insert(event.to_agent_id.clone());
        self.nodes[to].received.insert(event.from_agent_id.clone());
        self.edges.push(event);
        Ok(())
    }

    fn node_index_or_insert(&mut self, agent: &str) -> usize {
        if let Some(&idx) = self.index.get(agent) {
            return idx;
        }
        let idx = self.nodes.len();
        self.index.insert(agent.to_string(), idx);
        self.agents.push(agent.to_string());
        self.nodes.push(AgentNode::default());
        idx
    }

    pub fn node(&self, agent: &str) -> Option<&AgentNode> {
        self.index.get(agent).map(|&idx| &self.nodes[idx])
    }

    pub fn contains(&self, agent: &str) -> bool {
        self.index.contains_key(agent)
    }

    pub(crate) fn index_of(&self, agent: &str) -> Option<usize> {
        self.index.get(agent).copied()
    }

    pub(crate) fn node_at(&self, idx: usize) -> &AgentNode {
        &self.nodes[idx]
    }

    /// Agents in insertion order.
    pub fn agents(&self) -> impl ExactSizeIterator<Item = &AgentId> + '_ {
        self.agents.iter()
    }

    /// `(agent, node)` pairs in insertion order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&AgentId, &AgentNode)> + '_ {
        self.agents.iter().zip(self.nodes.iter())
    }

    pub fn agent_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of raw vote events, duplicates included.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of distinct ordered `(from, to)` pairs.
    pub fn distinct_edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.given.len()).sum()
    }

    pub fn edge_log(&self) -> &[VoteEvent] {
        &self.edges
    }

    /// Every raw event for one ordered pair, in ingestion order.
    pub fn edges_between<'a>(
        &'a self,
        from: &'a str,
        to: &'a str,
    ) -> impl Iterator<Item = &'a VoteEvent> + 'a {
        self.edges
            .iter()
            .filter(move |e| e.from_agent_id == from && e.to_agent_id == to)
    }

    /// Both agents have upvoted each other at least once.
    pub fn is_mutual(&self, a: &str, b: &str) -> bool {
        match (self.node(a), self.node(b)) {
            (Some(na), Some(nb)) => na.has_given_to(b) && nb.has_given_to(a),
            _ => false,
        }
    }
}
