//! Benchmarks for the force density solvers

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fd_solver::prelude::*;

/// Square grid net with a fixed, saddle shaped boundary
fn create_grid(size: usize, with_faces: bool) -> Network {
    let mut net = Network::new();
    let step = 1.0 / (size - 1) as f64;
    let mut ids = vec![vec![0; size]; size];

    for (i, row) in ids.iter_mut().enumerate() {
        for (j, id) in row.iter_mut().enumerate() {
            let (x, y) = (i as f64 * step, j as f64 * step);
            *id = if i == 0 || j == 0 || i == size - 1 || j == size - 1 {
                net.add_anchor([x, y, (x - 0.5) * (y - 0.5)])
            } else {
                net.add_node([x, y, 0.0])
            };
        }
    }

    for i in 0..size {
        for j in 0..size {
            if i + 1 < size {
                net.add_edge(ids[i][j], ids[i + 1][j], Some(EdgeGoal::ForceDensity(1.0)))
                    .unwrap();
            }
            if j + 1 < size {
                net.add_edge(ids[i][j], ids[i][j + 1], Some(EdgeGoal::ForceDensity(1.0)))
                    .unwrap();
            }
            if with_faces && i + 1 < size && j + 1 < size {
                let quad = [ids[i][j], ids[i + 1][j], ids[i + 1][j + 1], ids[i][j + 1]];
                net.add_face(&quad, StressGoal::isotropic(1.0)).unwrap();
            }
        }
    }
    net
}

fn bench_linear(c: &mut Criterion) {
    let mut group = c.benchmark_group("linear_fd");
    for size in [10, 20, 40] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let mut net = create_grid(size, false);
                black_box(net.solve_linear().unwrap())
            })
        });
    }
    group.finish();
}

fn bench_nfd(c: &mut Criterion) {
    let mut group = c.benchmark_group("nfd");
    group.sample_size(20);
    for size in [8, 16] {
        let options = NfdOptions::default()
            .with_max_iter(5)
            .with_stress_mode(StressMode::None);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let mut net = create_grid(size, true);
                black_box(net.solve_nfd(options.clone()).unwrap())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_linear, bench_nfd);
criterion_main!(benches);
