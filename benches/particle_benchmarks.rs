//! 粒子系统性能基准测试
//!
//! 测试粒子池逐帧更新与 Headless 提交在不同容量下的开销

use std::hint::black_box;
use std::num::NonZeroUsize;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use kinetic_core::config::{PopulationMode, RainConfig, SimulationConfig, SpawnConfig};
use kinetic_core::particles::ParticlePool;
use kinetic_core::render::{HeadlessBackend, HeadlessShader, ObserverContext, RenderSubmitter};

const CAPACITIES: [usize; 3] = [1_000, 10_000, 100_000];

fn prefilled_pool(capacity: usize) -> ParticlePool<StdRng> {
    let simulation = SimulationConfig {
        population: PopulationMode::Prefilled,
        ..Default::default()
    };
    ParticlePool::new(
        NonZeroUsize::new(capacity).unwrap(),
        &simulation,
        &SpawnConfig::default(),
        StdRng::seed_from_u64(42),
    )
}

fn bench_pool_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_update");

    for capacity in CAPACITIES {
        group.throughput(Throughput::Elements(capacity as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(capacity),
            &capacity,
            |b, &capacity| {
                let mut pool = prefilled_pool(capacity);
                let mut anchor = Vec2::ZERO;
                b.iter(|| {
                    anchor.x += 0.01;
                    pool.update(black_box(1.0 / 60.0), black_box(40), anchor);
                    black_box(pool.stats())
                });
            },
        );
    }

    group.finish();
}

fn bench_progressive_spawn(c: &mut Criterion) {
    let mut group = c.benchmark_group("progressive_spawn");

    for spawn_count in [10u32, 100, 1_000] {
        group.bench_with_input(
            BenchmarkId::from_parameter(spawn_count),
            &spawn_count,
            |b, &spawn_count| {
                let mut pool = ParticlePool::new(
                    NonZeroUsize::new(10_000).unwrap(),
                    &SimulationConfig::default(),
                    &SpawnConfig::default(),
                    StdRng::seed_from_u64(7),
                );
                b.iter(|| {
                    pool.update(0.0, black_box(spawn_count), Vec2::ZERO);
                    black_box(pool.last_spawned())
                });
            },
        );
    }

    group.finish();
}

fn bench_headless_submit(c: &mut Criterion) {
    let mut group = c.benchmark_group("headless_submit");
    let config = RainConfig::default();

    for capacity in CAPACITIES {
        group.throughput(Throughput::Bytes(capacity as u64 * 16));
        group.bench_with_input(
            BenchmarkId::from_parameter(capacity),
            &capacity,
            |b, &capacity| {
                let pool = prefilled_pool(capacity);
                let mut submitter =
                    RenderSubmitter::new(HeadlessBackend::new(), capacity, &config.render)
                        .unwrap();
                let mut shader = HeadlessShader::new();
                let observer = ObserverContext::default();
                b.iter(|| {
                    submitter
                        .draw(pool.render_data(), &observer, &mut shader, &mut ())
                        .unwrap();
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_pool_update,
    bench_progressive_spawn,
    bench_headless_submit
);
criterion_main!(benches);
