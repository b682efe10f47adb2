//! Benchmarks for the cascade graph
//!
//! Measures performance of:
//! - Graph construction from a token set
//! - Downstream closure per core token
//! - Planning a full activation

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tokenscope_cascade::{CascadeGraph, CascadeScheduler, SchedulerConfig, TokenSet};

/// Benchmark building the reference graph
fn bench_build(c: &mut Criterion) {
    let tokens = TokenSet::default();
    c.bench_function("graph_build", |b| b.iter(|| CascadeGraph::build(black_box(&tokens))));
}

/// Benchmark closure computation from each core node
fn bench_closure(c: &mut Criterion) {
    let mut group = c.benchmark_group("downstream_closure");
    let graph = CascadeGraph::build(&TokenSet::default());
    let cores: Vec<String> = graph.core_nodes().map(|n| n.id.0.clone()).collect();

    for core in &cores {
        group.bench_with_input(BenchmarkId::from_parameter(core), core, |b, id| {
            b.iter(|| graph.downstream_closure(black_box(id)))
        });
    }
    group.finish();
}

/// Benchmark planning an activation
fn bench_activate(c: &mut Criterion) {
    let graph = Arc::new(CascadeGraph::build(&TokenSet::default()));
    let mut scheduler = CascadeScheduler::new(graph, SchedulerConfig::default());
    c.bench_function("scheduler_activate", |b| {
        b.iter(|| scheduler.activate(black_box("neutral-900")))
    });
}

criterion_group!(benches, bench_build, bench_closure, bench_activate);
criterion_main!(benches);
