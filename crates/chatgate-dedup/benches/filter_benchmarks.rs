//! Throughput of the per-message duplicate check.
//!
//! The check runs before any other handling of an inbound message, so its
//! cost with a full history is what matters: every admitted message is
//! compared against up to `max_history_per_actor` retained ones.

use std::time::Duration;

use criterion::{criterion_group, criterion_main, Criterion};
use chatgate_core::config::FilterConfig;
use chatgate_dedup::{similarity, DuplicateFilter};

/// A support-chat style message, unique per index.
fn generate_message(index: usize) -> String {
    format!(
        "Здравствуйте! Нужен расчет доставки для заказа номер {} \
         на склад в Казани, примерно {} коробок, вес около {} кг.",
        index,
        index % 40 + 1,
        index % 300 + 10
    )
}

fn bench_is_duplicate(c: &mut Criterion) {
    let messages: Vec<String> = (0..10_000).map(generate_message).collect();

    let mut group = c.benchmark_group("duplicate_filter");
    group.sample_size(100);
    group.measurement_time(Duration::from_secs(5));

    // Fresh messages from many actors: exercises admission + capacity eviction.
    group.bench_function("admit_many_actors", |b| {
        let mut filter = DuplicateFilter::new(FilterConfig::default());
        let mut idx = 0usize;
        b.iter(|| {
            let message = &messages[idx % messages.len()];
            let duplicate = filter.is_duplicate(idx % 500, message);
            idx += 1;
            duplicate
        });
    });

    // One actor with a full history, repeated text: fingerprint short-circuit.
    group.bench_function("exact_repeat_full_history", |b| {
        let mut filter = DuplicateFilter::new(FilterConfig::default());
        for message in messages.iter().take(10) {
            filter.is_duplicate(1, message);
        }
        b.iter(|| filter.is_duplicate(1, &messages[5]));
    });

    group.finish();
}

fn bench_similarity(c: &mut Criterion) {
    let a = generate_message(1);
    let b = generate_message(2);
    c.bench_function("jaccard_similarity", |bench| bench.iter(|| similarity(&a, &b)));
}

criterion_group!(benches, bench_is_duplicate, bench_similarity);
criterion_main!(benches);
