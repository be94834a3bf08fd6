//! Visibility update benchmarks
//!
//! A capped radius of 2000 should cost the same as 60, and extra floors
//! should add little on top of the sweep.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use fowcast::data::DataManager;
use fowcast::world::{Layer, LevelGrid, TileRef};
use fowcast::VisionEngine;

const MAP_SIZE: i32 = 200;

/// Open ground with roughly one wall in eight cells, plus a second floor
fn scattered_walls() -> LevelGrid {
    let mut rng = StdRng::seed_from_u64(0x5EED);
    let mut levels = LevelGrid::new(MAP_SIZE, MAP_SIZE);
    levels.insert_filled_level(0, &TileRef::new("floor"));
    levels.insert_filled_level(1, &TileRef::new("floor"));

    let wall = TileRef::new("wall");
    let stairs = TileRef::new("stairs_up");
    for y in 0..MAP_SIZE {
        for x in 0..MAP_SIZE {
            let roll: u8 = rng.gen_range(0..64);
            if roll < 8 {
                levels.set_tile(0, x, y, Layer::Overlay, Some(wall.clone()));
            } else if roll == 8 {
                levels.set_tile(0, x, y, Layer::Overlay, Some(stairs.clone()));
            }
        }
    }
    levels
}

fn bench_update_visibility(c: &mut Criterion) {
    let mut engine = VisionEngine::new(DataManager::default().classifier());
    engine.install_levels(scattered_walls());

    let mut open = VisionEngine::new(DataManager::default().classifier());
    let mut levels = LevelGrid::new(MAP_SIZE, MAP_SIZE);
    levels.insert_filled_level(0, &TileRef::new("floor"));
    open.install_levels(levels);

    // Open sky above the middle floor, so every visible cell looks up
    let mut stacked = VisionEngine::new(DataManager::default().classifier());
    let mut levels = LevelGrid::new(MAP_SIZE, MAP_SIZE);
    levels.insert_filled_level(-1, &TileRef::new("floor"));
    levels.insert_filled_level(0, &TileRef::new("floor"));
    levels.insert_level(1);
    stacked.install_levels(levels);

    let center = MAP_SIZE / 2;
    let mut group = c.benchmark_group("update_visibility");
    for radius in [10, 60, 2000] {
        group.bench_with_input(BenchmarkId::new("scattered", radius), &radius, |b, &r| {
            b.iter(|| engine.update_visibility(center, center, 0, black_box(r)))
        });
        group.bench_with_input(BenchmarkId::new("open", radius), &radius, |b, &r| {
            b.iter(|| open.update_visibility(center, center, 0, black_box(r)))
        });
        group.bench_with_input(BenchmarkId::new("stacked", radius), &radius, |b, &r| {
            b.iter(|| stacked.update_visibility(center, center, 0, black_box(r)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_update_visibility);
criterion_main!(benches);
