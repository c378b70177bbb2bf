// Run this benchmark with:
// cargo bench --bench append_throughput

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use std::sync::Arc;
use std::thread;
use vmaf_feature_collector::Collector;

fn single_threaded_append(c: &mut Criterion) {
    c.bench_function("append_single_threaded", |b| {
        b.iter_batched(
            Collector::new,
            |collector| {
                for i in 0..1000u32 {
                    collector.append("vif", i, i as f64).unwrap();
                }
            },
            BatchSize::SmallInput,
        );
    });
}

fn multi_producer_append(c: &mut Criterion) {
    c.bench_function("append_four_producers", |b| {
        b.iter_batched(
            || Arc::new(Collector::new()),
            |collector| {
                let handles: Vec<_> = (0..4u32)
                    .map(|producer| {
                        let collector = Arc::clone(&collector);
                        thread::spawn(move || {
                            for i in 0..250u32 {
                                let index = producer * 250 + i;
                                collector.append("vif", index, index as f64).unwrap();
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    handle.join().unwrap();
                }
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, single_threaded_append, multi_producer_append);
criterion_main!(benches);
