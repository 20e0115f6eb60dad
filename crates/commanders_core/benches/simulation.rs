//! Simulation benchmarks for commanders_core.
//!
//! Run with: `cargo bench -p commanders_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use commanders_core::config::{MapConfig, MatchConfig};
use commanders_core::map_generation::generate_map_seeded;
use commanders_core::math::TilePos;
use commanders_core::pathfinding::find_path;
use commanders_core::simulation::Match;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

fn map_generation_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_generation");
    for (name, config) in [("small", MapConfig::small()), ("large", MapConfig::large())] {
        group.bench_function(name, |b| {
            b.iter(|| generate_map_seeded(black_box(&config), black_box(17)));
        });
    }
    group.finish();
}

fn pathfinding_benchmark(c: &mut Criterion) {
    let grid = generate_map_seeded(&MapConfig::large(), 3);
    let start = grid.nearest_walkable(TilePos::new(8, 8), 20).unwrap_or_default();
    let goal = grid
        .nearest_walkable(TilePos::new(119, 119), 20)
        .unwrap_or_default();
    c.bench_function("find_path_corner_to_corner", |b| {
        b.iter(|| find_path(black_box(&grid), black_box(start), black_box(goal)));
    });
}

fn match_tick_benchmark(c: &mut Criterion) {
    let config = MatchConfig::default().with_seed(11);
    let mut warmed = Match::new(config).expect("match setup");
    for _ in 0..(60 * 60) {
        warmed.update(1.0 / 60.0);
    }

    c.bench_function("match_tick_after_one_minute", |b| {
        b.iter_batched(
            || warmed.clone(),
            |mut m| {
                for _ in 0..60 {
                    m.update(1.0 / 60.0);
                }
                m
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    map_generation_benchmark,
    pathfinding_benchmark,
    match_tick_benchmark
);
criterion_main!(benches);
