use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use derby_core::prelude::*;
use derby_core::{Arena, CollisionDetector, PairingMode, Vehicle};
use glam::Vec2;

/// Arena of `n` tanks on a grid, spaced so that no pair overlaps.
fn spread_out(n: usize) -> (Arena, Vec<(EntityId, Rect)>) {
    let mut arena = Arena::new(800.0, 600.0);
    let mut snapshot = Vec::with_capacity(n);
    for i in 0..n {
        let id = arena.next_id();
        arena.insert(Vehicle::new(id, VehicleKind::Tank));
        let x = (i % 10) as f32 * 80.0;
        let y = (i / 10) as f32 * 80.0;
        snapshot.push((id, Rect::new(Vec2::new(x, y), Vec2::new(50.0, 50.0))));
    }
    (arena, snapshot)
}

fn bench_sweep_disjoint(c: &mut Criterion) {
    let (mut arena, snapshot) = spread_out(100);
    let ordered = CollisionDetector::new(PairingMode::Ordered);
    let unordered = CollisionDetector::new(PairingMode::Unordered);

    c.bench_function("sweep_100_ordered", |b| {
        b.iter(|| black_box(ordered.sweep(&mut arena, black_box(&snapshot))))
    });
    c.bench_function("sweep_100_unordered", |b| {
        b.iter(|| black_box(unordered.sweep(&mut arena, black_box(&snapshot))))
    });
}

fn bench_derby_minute(c: &mut Criterion) {
    // Fresh derby per iteration; vehicles get destroyed as it runs.
    c.bench_function("derby_40_vehicles_60s", |b| {
        b.iter_batched(
            || {
                let mut derby = Derby::new(DerbyConfig::default().with_seed(1)).unwrap();
                for kind in VehicleKind::ALL.into_iter().cycle().take(40) {
                    derby.spawn(kind).unwrap();
                }
                derby
            },
            |mut derby| {
                derby.advance(black_box(60_000));
                derby
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_sweep_disjoint, bench_derby_minute);
criterion_main!(benches);
