//! Pathfinding and chunk generation benchmarks
//!
//! Run with: cargo bench --bench pathfinding

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use skulk::core::config::{PathfindingConfig, SimulationConfig};
use skulk::core::types::{BuildingId, ChunkCoord, FloorPoint};
use skulk::pathfinding::Pathfinder;
use skulk::spatial::Rect;
use skulk::structures::Building;
use skulk::world::generate_chunk_content;
use skulk::world::obstacles::Obstacle;

/// Staggered walls with a gap at alternating ends
fn maze(extent: f32) -> Vec<Obstacle> {
    let mut walls = Vec::new();
    let mut y = 128.0;
    let mut left = true;
    while y < extent - 128.0 {
        let (min_x, max_x) = if left { (0.0, extent - 160.0) } else { (160.0, extent) };
        walls.push(Obstacle::wall(Rect::from_min_max(Vec2::new(min_x, y), Vec2::new(max_x, y + 24.0))));
        y += 192.0;
        left = !left;
    }
    walls
}

fn bench_find_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_path");
    let pathfinder = Pathfinder::new(PathfindingConfig::default());

    for extent in [512.0f32, 1024.0, 2048.0] {
        let walls = maze(extent);
        let bounds = Rect::from_min_max(Vec2::ZERO, Vec2::splat(extent));
        let (start, end) = (Vec2::splat(48.0), Vec2::splat(extent - 48.0));

        group.bench_with_input(BenchmarkId::from_parameter(extent as u32), &extent, |b, _| {
            b.iter(|| {
                let path = pathfinder.find_path(black_box(start), black_box(end), walls.iter(), &bounds, 32.0);
                black_box(path)
            });
        });
    }

    group.finish();
}

fn bench_multi_floor(c: &mut Criterion) {
    let pathfinder = Pathfinder::new(PathfindingConfig::default());
    let building = (0..50)
        .map(|seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            Building::generate(BuildingId(0), Vec2::splat(512.0), Vec2::new(440.0, 300.0), 3, &mut rng)
        })
        .find(|b| b.floors.iter().filter(|f| f.obstacles.stairs().next().is_some()).count() == 3);
    let Some(building) = building else {
        return;
    };

    let bounds = building.bounds.expanded(64.0);
    let lookup = |level: usize| building.obstacles_on(level);
    let start = FloorPoint::new(building.floors[0].corridor.center, 0);
    let end = FloorPoint::new(building.floors[2].corridor.center, 2);

    c.bench_function("find_path_multi_floor", |b| {
        b.iter(|| {
            let path = pathfinder.find_path_multi_floor(black_box(start), black_box(end), &lookup, &bounds, 16.0);
            black_box(path)
        });
    });
}

fn bench_chunk_generation(c: &mut Criterion) {
    let config = Arc::new(SimulationConfig::default());
    let mut x = 0;

    c.bench_function("generate_chunk_content", |b| {
        b.iter(|| {
            x += 1;
            black_box(generate_chunk_content(ChunkCoord::new(x, 7), 42, &config))
        });
    });
}

criterion_group!(benches, bench_find_path, bench_multi_floor, bench_chunk_generation);
criterion_main!(benches);
