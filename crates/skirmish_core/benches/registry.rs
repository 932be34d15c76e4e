//! Update-pass benchmarks for skirmish_core.
//!
//! Run with: `cargo bench -p skirmish_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use skirmish_core::prelude::*;
use skirmish_test_utils::fixtures::{aggressors, arena_session, pos, Session};

/// A crowded field: `per_team` fighters on each side, out of range of each other.
fn crowd(per_team: i32) -> Session {
    let mut registry = EntityRegistry::default();
    for i in 0..per_team {
        registry.create_fighter(pos(-2_000, i * 20), Team::Blue);
        registry.create_fighter(pos(2_000, i * 20), Team::Red);
    }
    Session::new(registry, aggressors())
}

/// Runs update-pass benchmarks.
pub fn registry_benchmark(c: &mut Criterion) {
    c.bench_function("arena_100_ticks", |b| {
        b.iter_batched(
            || arena_session(42),
            |mut session| {
                session.run(100).unwrap();
                black_box(session.state_hash())
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("crowd_200_single_pass", |b| {
        b.iter_batched(
            || crowd(100),
            |mut session| black_box(session.step().unwrap()),
            BatchSize::SmallInput,
        )
    });

    c.bench_function("idle_pass_1000_nodes", |b| {
        let mut registry = EntityRegistry::default();
        for i in 0..1_000 {
            registry.create_resource_node(pos(i, 0));
        }
        let mut controllers = TeamControllers::idle();
        let mut tick = 0;
        b.iter(|| {
            tick += 1;
            black_box(registry.update(tick, &mut controllers).unwrap())
        })
    });
}

criterion_group!(benches, registry_benchmark);
criterion_main!(benches);
