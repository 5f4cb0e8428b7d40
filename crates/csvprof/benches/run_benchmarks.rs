//! Whole-run benchmarks.
//!
//! Measures row throughput through the field pipeline with and without
//! profiling, on synthetic data held in memory.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use csvprof::config::{ColumnConfig, ProfileMode, UserItems};
use csvprof::external::ExternalFiles;
use csvprof::registry::TestSources;
use csvprof::{LookupProviders, OutputConfig, Run, RunContext, TestRegistry, TestSpec};

fn column(number: usize, test: &str, profile: ProfileMode) -> ColumnConfig {
    let mut config = ColumnConfig::new(number, format!("col{number}"), TestSpec::parse(test).unwrap());
    config.profile = profile;
    config.strip = true;
    config
}

fn context(profile: ProfileMode) -> RunContext {
    let files = ExternalFiles::new(std::env::temp_dir(), encoding_rs::UTF_8);
    let user = UserItems::default();
    let providers = LookupProviders::new();
    let sources = TestSources {
        user: &user,
        providers: &providers,
        files: &files,
    };
    let columns = vec![
        column(1, "int", profile),
        column(2, "float", profile),
        column(3, "Alpha", profile),
        column(4, "range(0:1000)", profile),
        column(5, "zipcode+", ProfileMode::None),
    ];
    RunContext::build(columns, TestRegistry::new(), &sources).unwrap()
}

/// Generate `count` rows, roughly one in ten with an error.
fn generate_rows(count: usize) -> Vec<Vec<String>> {
    (0..count)
        .map(|i| {
            vec![
                i.to_string(),
                format!("{}.{}", i % 997, i % 10),
                if i % 10 == 0 { format!("bad{i}") } else { "Value".to_string() },
                (i % 1200).to_string(),
                format!("{:05}", i % 100_000),
            ]
        })
        .collect()
}

/// Benchmark row processing at several sizes.
fn bench_process_rows(c: &mut Criterion) {
    let mut group = c.benchmark_group("process_rows");

    for size in [1_000usize, 10_000, 50_000] {
        let rows = generate_rows(size);
        group.throughput(Throughput::Elements(size as u64));

        for (label, profile) in [
            ("plain", ProfileMode::None),
            ("occurrence", ProfileMode::Occurrence),
            ("statistical", ProfileMode::Statistical),
        ] {
            group.bench_with_input(BenchmarkId::new(label, size), &rows, |b, rows| {
                b.iter(|| {
                    let mut run = Run::new(context(profile), &OutputConfig::default()).unwrap();
                    for row in rows {
                        run.process_row(row).unwrap();
                    }
                    black_box(run.finish(None).unwrap())
                })
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_process_rows);
criterion_main!(benches);
