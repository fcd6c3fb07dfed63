//! Coordination (vote-ring) detection over a directed upvote graph.
//!
//! The graph is built once from a finite event log and then only read:
//! metrics, scoring, community partitioning and evaluation are pure
//! functions of that snapshot, so a fixed input always yields the same
//! output.

pub mod analysis;
pub mod community;
pub mod evaluation;
pub mod graph;
pub mod ingest;
pub mod metrics;
pub mod report;
pub mod scoring;

pub use analysis::*;
pub use community::*;
pub use evaluation::*;
pub use graph::*;
pub use ingest::*;
pub use metrics::*;
pub use report::*;
pub use scoring::*;
