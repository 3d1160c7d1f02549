//! Benchmarks for the chart engine
//!
//! Run with: cargo bench

use chrono::{Duration, NaiveDate};
use covid_dashboard::config::DEFAULT_COUNTRIES;
use covid_dashboard::dataset::{DatasetLoader, Metric};
use covid_dashboard::query::{compute, AggregationMode, ChartRequest};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

/// Synthetic CSV with every whitelisted country over `days` days
fn create_test_csv(days: i64) -> String {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let mut header = vec!["country".to_string(), "date".to_string()];
    header.extend(Metric::ALL.iter().map(|m| m.column().to_string()));

    let mut lines = vec![header.join(",")];
    for country in DEFAULT_COUNTRIES {
        for day in 0..days {
            let date = start + Duration::days(day);
            let mut cells = vec![country.to_string(), date.to_string()];
            for (i, _) in Metric::ALL.iter().enumerate() {
                // Leave gaps so forward-fill has work to do
                if (day + i as i64) % 5 == 0 {
                    cells.push(String::new());
                } else {
                    cells.push(format!("{}", day * (i as i64 + 1)));
                }
            }
            lines.push(cells.join(","));
        }
    }
    lines.join("\n")
}

fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("load");
    let loader = DatasetLoader::new(DEFAULT_COUNTRIES.iter().map(|c| c.to_string()).collect());

    for days in [100, 1000] {
        let csv = create_test_csv(days);
        group.throughput(Throughput::Elements(days as u64 * DEFAULT_COUNTRIES.len() as u64));

        group.bench_function(format!("normalize_{}_days", days), |b| {
            b.iter(|| loader.load_bytes(black_box(csv.as_bytes())).unwrap())
        });
    }

    group.finish();
}

fn bench_compute(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute");
    let loader = DatasetLoader::new(DEFAULT_COUNTRIES.iter().map(|c| c.to_string()).collect());
    let dataset = loader.load_bytes(create_test_csv(1000).as_bytes()).unwrap();

    let start = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2022, 3, 1).unwrap();

    let daily = ChartRequest::new(&["India", "United States"], start, end);
    group.bench_function("daily_two_countries", |b| {
        b.iter(|| compute(black_box(&dataset), black_box(&daily)))
    });

    let cumulative = ChartRequest::new(&DEFAULT_COUNTRIES, start, end)
        .mode(AggregationMode::Cumulative);
    group.bench_function("cumulative_all_countries", |b| {
        b.iter(|| compute(black_box(&dataset), black_box(&cumulative)))
    });

    group.finish();
}

criterion_group!(benches, bench_load, bench_compute);
criterion_main!(benches);
