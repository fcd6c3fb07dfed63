use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use std::time::Duration;
use votegraph_core::VoteEvent;
use votegraph_graph::{build_report, clustering_coefficient, detect_communities, VotingGraph};

/// One hub upvoted by `fan_in` agents who also vote among themselves with
/// the given density. Clustering on the hub is O(fan_in²).
fn create_hub_graph(fan_in: usize, density: f64) -> VotingGraph {
    let mut graph = VotingGraph::new();
    for i in 0..fan_in {
        graph
            .record_vote(&format!("voter_{}", i), "hub", "post_hub_0", 0)
            .unwrap();
    }
    let cross_votes = (fan_in as f64 * fan_in as f64 * density) as usize;
    for _ in 0..cross_votes {
        let from = fastrand::usize(..fan_in);
        let to = fastrand::usize(..fan_in);
        if from != to {
            graph
                .record_vote(
                    &format!("voter_{}", from),
                    &format!("voter_{}", to),
                    &format!("post_voter_{}_0", to),
                    0,
                )
                .unwrap();
        }
    }
    graph
}

/// Random sparse population for whole-report and partition timings.
fn create_population_graph(agents: usize, votes_per_agent: usize) -> VotingGraph {
    let mut events = Vec::with_capacity(agents * votes_per_agent);
    for from in 0..agents {
        for _ in 0..votes_per_agent {
            let to = fastrand::usize(..agents);
            if to != from {
                events.push(VoteEvent::new(
                    format!("agent_{}", from),
                    format!("agent_{}", to),
                    format!("post_{}", to),
                    0,
                ));
            }
        }
    }
    VotingGraph::from_events(events).unwrap()
}

fn bench_hub_clustering(c: &mut Criterion) {
    let mut group = c.benchmark_group("hub_clustering");
    group.measurement_time(Duration::from_secs(5));

    for fan_in in [100, 500, 1000].iter() {
        let graph = create_hub_graph(*fan_in, 0.05);
        group.bench_with_input(BenchmarkId::from_parameter(fan_in), fan_in, |b, _| {
            b.iter(|| black_box(clustering_coefficient(&graph, "hub")))
        });
    }
    group.finish();
}

fn bench_full_report(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_report");
    group.measurement_time(Duration::from_secs(5));

    for size in [100, 500, 1000].iter() {
        let graph = create_population_graph(*size, 10);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(build_report(&graph)))
        });
    }
    group.finish();
}

fn bench_communities(c: &mut Criterion) {
    let mut group = c.benchmark_group("communities");

    for size in [1000, 5000].iter() {
        let graph = create_population_graph(*size, 10);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(detect_communities(&graph)))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_hub_clustering,
    bench_full_report,
    bench_communities
);
criterion_main!(benches);
