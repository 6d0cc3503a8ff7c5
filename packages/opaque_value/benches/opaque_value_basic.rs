//! Basic benchmarks for the `opaque_value` package.
#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;
use std::iter;
use std::time::Instant;

use alloc_tracker::Allocator;
use criterion::{Criterion, criterion_group, criterion_main};
use opaque_value::{OpaqueValue, cast};

criterion_group!(benches, entrypoint);
criterion_main!(benches);

#[global_allocator]
static ALLOCATOR: Allocator<std::alloc::System> = Allocator::system();

type SmallItem = usize;
const SMALL_VALUE: SmallItem = 1024;

type LargeItem = [u64; 8];
const LARGE_VALUE: LargeItem = [1024; 8];

fn entrypoint(c: &mut Criterion) {
    let allocs = alloc_tracker::Session::new();

    let mut group = c.benchmark_group("opaque_value_basic");

    let allocs_op = allocs.operation("from_value_inline");
    group.bench_function("from_value_inline", |b| {
        b.iter_custom(|iters| {
            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                drop(black_box(OpaqueValue::from_value(black_box(SMALL_VALUE))));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("from_value_boxed");
    group.bench_function("from_value_boxed", |b| {
        b.iter_custom(|iters| {
            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                drop(black_box(OpaqueValue::from_value(black_box(LARGE_VALUE))));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("clone_boxed");
    group.bench_function("clone_boxed", |b| {
        b.iter_custom(|iters| {
            let value = OpaqueValue::from_value(LARGE_VALUE);

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                drop(black_box(black_box(&value).clone()));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("take_boxed");
    group.bench_function("take_boxed", |b| {
        b.iter_custom(|iters| {
            let mut values = iter::repeat_with(|| OpaqueValue::from_value(LARGE_VALUE))
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for value in &mut values {
                _ = black_box(value.take());
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("swap_mixed");
    group.bench_function("swap_mixed", |b| {
        b.iter_custom(|iters| {
            let mut a = OpaqueValue::from_value(SMALL_VALUE);
            let mut b = OpaqueValue::from_value(LARGE_VALUE);

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                black_box(&mut a).swap(black_box(&mut b));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("cast_hit");
    group.bench_function("cast_hit", |b| {
        b.iter_custom(|iters| {
            let value = OpaqueValue::from_value(SMALL_VALUE);

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                _ = black_box(cast::<SmallItem>(black_box(&value)));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("cast_miss");
    group.bench_function("cast_miss", |b| {
        b.iter_custom(|iters| {
            let value = OpaqueValue::from_value(SMALL_VALUE);

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                _ = black_box(cast::<u32>(black_box(&value)));
            }

            start.elapsed()
        });
    });

    group.finish();

    allocs.print_to_stdout();
}
