//! Sorter benchmarks
//!
//! Critical paths for transaction planning: plain linearization of an
//! acyclic chain, and linearization that has to find and break loops.

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};

use ordo::sorter::RelationGraph;

fn linear_chain(len: u32) -> RelationGraph<u32> {
    let mut graph = RelationGraph::new();
    for node in 0..len.saturating_sub(1) {
        graph.add_relation(&node, &(node + 1), 0);
    }
    graph
}

/// A chain with a weak back edge every `stride` nodes, giving disjoint
/// fifty-element loops to break.
fn chain_with_loops(len: u32, stride: u32) -> RelationGraph<u32> {
    let mut graph = linear_chain(len);
    let mut start = 0;
    while start + 49 < len {
        graph.add_relation(&(start + 49), &start, 1);
        start += stride;
    }
    graph
}

fn bench_linearize(c: &mut Criterion) {
    let mut group = c.benchmark_group("linearize");

    group.bench_function("chain_1000", |b| {
        b.iter_batched(
            || linear_chain(1000),
            |mut graph| graph.linearize().expect("chain is acyclic"),
            BatchSize::SmallInput,
        );
    });

    group.bench_function("chain_1000_with_loops", |b| {
        b.iter_batched(
            || chain_with_loops(1000, 100),
            |mut graph| graph.linearize().expect("loops are breakable"),
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_linearize);
criterion_main!(benches);
