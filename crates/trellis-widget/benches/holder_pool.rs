use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use trellis_core::{LayoutContext, RenderSlot, SizeSpec};
use trellis_runtime_std::InlineExecutor;
use trellis_testing::{TestComponent, TestTreeFactory};
use trellis_widget::{HolderConfig, HolderPool};

fn row_slot() -> RenderSlot {
    RenderSlot::new(Arc::new(TestComponent::new("row").with_intrinsic_size(60.0, 40.0)))
}

fn bench_acquire_release(c: &mut Criterion) {
    let pool = HolderPool::new();
    let executor = Arc::new(InlineExecutor);
    let slot = row_slot();

    c.bench_function("pool_acquire_release", |b| {
        b.iter(|| {
            let holder = pool.acquire(slot.clone(), executor.clone(), HolderConfig::default());
            pool.release(black_box(holder));
        })
    });
}

fn bench_compute_layout_sync(c: &mut Criterion) {
    let factory = Arc::new(TestTreeFactory::new());
    let context = LayoutContext::new(factory.clone());
    let pool = HolderPool::new();
    let executor = Arc::new(InlineExecutor);
    let holder = pool.acquire(row_slot(), executor, HolderConfig::default());

    c.bench_function("compute_layout_sync", |b| {
        b.iter(|| {
            holder.invalidate_tree();
            black_box(
                holder
                    .compute_layout_sync(&context, SizeSpec::AtMost(100.0), SizeSpec::AtMost(100.0))
                    .unwrap(),
            )
        })
    });
}

criterion_group!(benches, bench_acquire_release, bench_compute_layout_sync);
criterion_main!(benches);
