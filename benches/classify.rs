use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use framefit::classify::classify;
use framefit::policy::PolicyResolver;
use framefit::prober::IntrinsicSize;

/// Benchmark the pure classification path
fn bench_classify(c: &mut Criterion) {
    let shapes = [
        ("full_hd", 1920u32, 1080u32),
        ("portrait", 1000, 2000),
        ("ultrawide", 5120, 1440),
        ("thumbnail", 160, 120),
    ];

    let mut group = c.benchmark_group("classify");
    for (name, width, height) in shapes {
        group.bench_with_input(BenchmarkId::from_parameter(name), &(width, height), |b, &(w, h)| {
            b.iter(|| classify(black_box(IntrinsicSize { width: w, height: h })))
        });
    }
    group.finish();
}

/// Benchmark classification plus policy resolution
fn bench_classify_and_resolve(c: &mut Criterion) {
    let resolver = PolicyResolver::default();

    c.bench_function("classify_and_resolve", |b| {
        b.iter(|| {
            let classification = classify(black_box(IntrinsicSize {
                width: 1000,
                height: 2000,
            }));
            resolver.resolve(Some(&classification))
        })
    });
}

criterion_group!(benches, bench_classify, bench_classify_and_resolve);
criterion_main!(benches);
