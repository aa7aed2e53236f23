//! Duplicate detection and profiling benchmarks

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use dupsift_core::analysis::{detect, profile_all};
use dupsift_core::{
    AnalysisConfig, CellValue, Dataset, DetectionMode, DuplicateAnalyzer, Normalizer,
};

/// Builds a customer table where roughly one row in five repeats an
/// earlier email with different casing and padding.
fn generate_customers(count: usize) -> Dataset {
    let rows = (0..count)
        .map(|i| {
            let email = if i % 5 == 4 {
                format!(" Customer{}@Example.com ", i / 2)
            } else {
                format!("customer{i}@example.com")
            };
            vec![
                CellValue::text(format!("Customer {i}")),
                CellValue::text(email),
                CellValue::Number((i % 100) as f64),
                CellValue::text(format!("2024-01-{:02}", i % 28 + 1)),
            ]
        })
        .collect();

    Dataset::new(
        vec![
            "name".to_string(),
            "email".to_string(),
            "score".to_string(),
            "joined".to_string(),
        ],
        rows,
    )
    .unwrap_or_else(|e| panic!("Failed to build dataset: {e}"))
}

fn bench_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect");
    let columns = vec!["email".to_string(), "joined".to_string()];
    let normalizer = Normalizer::default();

    for size in [1_000, 10_000, 50_000] {
        let dataset = generate_customers(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &dataset, |b, dataset| {
            b.iter(|| {
                detect(
                    black_box(dataset),
                    black_box(&columns),
                    DetectionMode::KeepFirst,
                    &normalizer,
                )
            });
        });
    }

    group.finish();
}

fn bench_profiling(c: &mut Criterion) {
    let dataset = generate_customers(10_000);
    let normalizer = Normalizer::default();

    c.bench_function("profile_all_10k", |b| {
        b.iter(|| profile_all(black_box(&dataset), &normalizer, 5));
    });
}

fn bench_full_analysis(c: &mut Criterion) {
    let dataset = generate_customers(10_000);
    let analyzer = DuplicateAnalyzer::new(
        AnalysisConfig::new()
            .with_columns(["email"])
            .with_mode(DetectionMode::All),
    );

    c.bench_function("analyze_10k", |b| {
        b.iter(|| analyzer.analyze(black_box(&dataset)));
    });
}

criterion_group!(benches, bench_detection, bench_profiling, bench_full_analysis);
criterion_main!(benches);
