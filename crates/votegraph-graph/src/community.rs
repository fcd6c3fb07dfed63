//! Community partitioning over the mutual-upvote relation.

use crate::VotingGraph;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;
use votegraph_core::{AgentId, CommunityId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityAssignment {
    pub agent_id: AgentId,
    pub community_id: CommunityId,
}

/// Total assignment of every graph agent to exactly one community.
///
/// Ids are dense (`0..community_count`) and follow the graph's insertion
/// order; only membership is meaningful across runs.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommunityMap {
    assignments: Vec<CommunityAssignment>,
    #[serde(skip)]
    lookup: FxHashMap<AgentId, usize>,
    community_count: usize,
}

impl CommunityMap {
    pub fn community_of(&self, agent: &str) -> Option<CommunityId> {
        self.lookup
            .get(agent)
            .map(|&idx| self.assignments[idx].community_id)
    }

    pub fn same_community(&self, a: &str, b: &str) -> bool {
        match (self.community_of(a), self.community_of(b)) {
            (Some(ca), Some(cb)) => ca == cb,
            _ => false,
        }
    }

    /// Members of one community in graph insertion order.
    pub fn members(&self, community: CommunityId) -> Vec<&AgentId> {
        self.assignments
            .iter()
            .filter(|a| a.community_id == community)
            .map(|a| &a.agent_id)
            .collect()
    }

    /// Member count per community id.
    pub fn sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0usize; self.community_count];
        for a in &self.assignments {
            sizes[a.community_id] += 1;
        }
        sizes
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommunityAssignment> + '_ {
        self.assignments.iter()
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn community_count(&self) -> usize {
        self.community_count
    }

    fn assign(&mut self, agent: &AgentId, community_id: CommunityId) {
        self.lookup.insert(agent.clone(), self.assignments.len());
        self.assignments.push(CommunityAssignment {
            agent_id: agent.clone(),
            community_id,
        });
    }
}

/// Connected components of the graph where an edge exists only between
/// agents that upvoted each other. One-directional upvotes never join
/// communities; agents without mutual partners end up as singletons.
///
/// O(V + E) with an explicit FIFO queue and visited set.
pub fn detect_communities(graph: &VotingGraph) -> CommunityMap {
    let n = graph.agent_count();
    let agents: Vec<&AgentId> = graph.agents().collect();
    let mut visited = vec![false; n];
    let mut component_of = vec![0 as CommunityId; n];
    let mut next_id: CommunityId = 0;
    let mut queue = VecDeque::new();

    for start in 0..n {
        if visited[start] {
            continue;
        }

        visited[start] = true;
        queue.push_back(start);
        while let Some(current) = queue.pop_front() {
            component_of[current] = next_id;
            let current_id = agents[current];
            let current_node = graph.node_at(current);

            for neighbor in &current_node.given {
                let Some(j) = graph.index_of(neighbor) else {
                    continue;
                };
                if !visited[j] && graph.node_at(j).has_given_to(current_id) {
                    visited[j] = true;
                    queue.push_back(j);
                }
            }
        }
        next_id += 1;
    }

    let mut map = CommunityMap {
        community_count: next_id,
        ..Default::default()
    };
    for (idx, agent) in agents.iter().enumerate() {
        map.assign(agent, component_of[idx]);
    }

    debug!(
        agents = n,
        communities = next_id,
        "Partitioned voting graph into mutual-vote communities"
    );
    map
}
