//! Basic benchmarks for the `dense_pool` crate.
#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;
use std::time::Instant;

use alloc_tracker::Allocator;
use criterion::{Criterion, criterion_group, criterion_main};
use dense_pool::{
    DensePool, FreeSlotPool, GrowableDensePool, GrowableFreeSlotPool, Poolable, RemovalOrder,
    ResizableDensePool, ValuePool,
};

criterion_group!(benches, entrypoint);
criterion_main!(benches);

#[global_allocator]
static ALLOCATOR: Allocator<std::alloc::System> = Allocator::system();

const CAPACITY: usize = 10_000;

#[derive(Clone, Copy, Default)]
struct Particle {
    pool_index: usize,
    position: [f32; 3],
    velocity: [f32; 3],
}

impl Poolable for Particle {
    fn pool_index(&self) -> usize {
        self.pool_index
    }

    fn set_pool_index(&mut self, index: usize) {
        self.pool_index = index;
    }
}

fn particle_pool() -> DensePool<Particle> {
    DensePool::builder()
        .capacity(CAPACITY)
        .factory(Particle::default)
        .on_return(|particle: &mut Particle| *particle = Particle::default())
        .build()
        .unwrap()
}

fn ordered_pool() -> ResizableDensePool<Particle> {
    ResizableDensePool::builder()
        .capacity(CAPACITY)
        .max_capacity(CAPACITY)
        .factory(Particle::default)
        .removal_order(RemovalOrder::Ordered)
        .build()
        .unwrap()
}

fn value_pool() -> ValuePool<Particle> {
    ValuePool::builder()
        .capacity(CAPACITY)
        .max_capacity(CAPACITY)
        .on_clear(|particle: &mut Particle| *particle = Particle::default())
        .on_move(|from: &Particle, to: &mut Particle| *to = *from)
        .build()
        .unwrap()
}

fn growable_pool() -> GrowableDensePool<Particle> {
    GrowableDensePool::builder()
        .factory(Particle::default)
        .on_return(|particle: &mut Particle| *particle = Particle::default())
        .build()
        .unwrap()
}

fn growable_free_slot_pool() -> GrowableFreeSlotPool<Particle> {
    GrowableFreeSlotPool::builder()
        .factory(Particle::default)
        .build()
        .unwrap()
}

fn free_slot_pool() -> FreeSlotPool<Particle> {
    FreeSlotPool::builder()
        .capacity(CAPACITY)
        .factory(Particle::default)
        .build()
        .unwrap()
}

fn entrypoint(c: &mut Criterion) {
    let allocs = alloc_tracker::Session::new();

    let mut group = c.benchmark_group("dense_basic");

    let allocs_op = allocs.operation("build_10k");
    group.bench_function("build_10k", |b| {
        b.iter_custom(|iters| {
            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                drop(black_box(particle_pool()));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("request_return_one");
    group.bench_function("request_return_one", |b| {
        b.iter_custom(|iters| {
            let mut pool = particle_pool();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                let id = black_box(pool.request_id()).unwrap();
                pool.return_id(black_box(id));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("read_one");
    group.bench_function("read_one", |b| {
        b.iter_custom(|iters| {
            let mut pool = particle_pool();
            let id = pool.request_id().unwrap();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                _ = black_box(pool.get(black_box(id)));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("iterate_10k_live");
    group.bench_function("iterate_10k_live", |b| {
        b.iter_custom(|iters| {
            let mut pool = particle_pool();
            while pool.request_id().is_some() {}

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                for particle in pool.live_mut() {
                    particle.position[0] += particle.velocity[0];
                }
                _ = black_box(&pool);
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("churn_half_unordered");
    group.bench_function("churn_half_unordered", |b| {
        b.iter_custom(|iters| {
            let mut pool = particle_pool();
            let ids: Vec<_> = (0..CAPACITY).map(|_| pool.request_id().unwrap()).collect();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                for &id in ids.iter().step_by(2) {
                    pool.return_id(id);
                }
                for _ in ids.iter().step_by(2) {
                    _ = black_box(pool.request_id());
                }
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("return_first_ordered");
    group.bench_function("return_first_ordered", |b| {
        b.iter_custom(|iters| {
            let mut pool = ordered_pool();
            while pool.request_id().is_some() {}

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                pool.return_index(black_box(0));
                _ = black_box(pool.request_id());
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("return_first_value");
    group.bench_function("return_first_value", |b| {
        b.iter_custom(|iters| {
            let mut pool = value_pool();
            while pool.request_id().is_some() {}

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                pool.return_index(black_box(0));
                _ = black_box(pool.request_id());
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("free_slot_request_return");
    group.bench_function("free_slot_request_return", |b| {
        b.iter_custom(|iters| {
            let mut pool = free_slot_pool();

            // Leave a single free slot so that every request has to scan.
            for _ in 1..CAPACITY {
                _ = pool.request();
            }

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                let slot = black_box(pool.request()).unwrap().pool_index();
                pool.return_slot(black_box(slot));
            }

            start.elapsed()
        });
    });

    group.finish();

    let mut group = c.benchmark_group("dense_steady_state");

    // After warming up, none of these should allocate per request or return.
    let allocs_op = allocs.operation("growable_request_return_warm");
    group.bench_function("growable_request_return_warm", |b| {
        b.iter_custom(|iters| {
            let mut pool = growable_pool();
            let warm: Vec<_> = (0..CAPACITY).map(|_| pool.request_id()).collect();
            for id in warm {
                pool.return_id(id);
            }

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                let id = black_box(pool.request_id());
                pool.return_id(black_box(id));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("resizable_request_return_warm");
    group.bench_function("resizable_request_return_warm", |b| {
        b.iter_custom(|iters| {
            let mut pool = ordered_pool();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                let id = black_box(pool.request_id()).unwrap();
                pool.return_id(black_box(id));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("value_request_return_warm");
    group.bench_function("value_request_return_warm", |b| {
        b.iter_custom(|iters| {
            let mut pool = value_pool();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                let id = black_box(pool.request_id()).unwrap();
                pool.return_id(black_box(id));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("growable_free_slot_request_return_warm");
    group.bench_function("growable_free_slot_request_return_warm", |b| {
        b.iter_custom(|iters| {
            let mut pool = growable_free_slot_pool();
            for _ in 0..CAPACITY {
                _ = pool.request();
            }
            pool.clear();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                let slot = black_box(pool.request()).pool_index();
                pool.return_slot(black_box(slot));
            }

            start.elapsed()
        });
    });

    group.finish();

    allocs.print_to_stdout();
}
