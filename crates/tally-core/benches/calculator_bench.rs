use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;
use tally_core::{Calculator, CallOptions, RateType};

fn sum_benchmark(c: &mut Criterion) {
    let data = json!([12.5, 3.335, 0.1, 0.2, 99.99, 1.0, 42.0, 7.25]);

    c.bench_function("sum cache miss", |b| {
        b.iter(|| {
            let mut calc = Calculator::new();
            black_box(calc.sum(black_box(&data), CallOptions::from(2)))
        })
    });

    let mut warm = Calculator::new();
    warm.sum(&data, CallOptions::from(2));
    c.bench_function("sum cache hit", |b| {
        b.iter(|| black_box(warm.sum(black_box(&data), CallOptions::from(2))))
    });
}

fn tax_benchmark(c: &mut Criterion) {
    let incl = CallOptions::new()
        .with_tax_rate(0.1)
        .with_rate_type(RateType::Inclusive)
        .with_decimal_places(2);

    c.bench_function("inclusive tax cache miss", |b| {
        b.iter(|| {
            let mut calc = Calculator::new();
            black_box(calc.tax_rate(black_box(Some(109.99)), incl))
        })
    });

    let mut warm = Calculator::new();
    warm.tax_rate(Some(109.99), incl);
    c.bench_function("inclusive tax cache hit", |b| {
        b.iter(|| black_box(warm.tax_rate(black_box(Some(109.99)), incl)))
    });
}

criterion_group!(benches, sum_benchmark, tax_benchmark);
criterion_main!(benches);
