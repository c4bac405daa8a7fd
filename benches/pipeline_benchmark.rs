use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use weather_etl::models::{BatchKey, MonthlyAggregate, ObservationRecord, RawBatch};
use weather_etl::processors::{MonthlyAggregator, Normalizer, QualityAuditor, YoyCalculator};
use weather_etl::utils::coordinates::dms_to_decimal;

// Hourly observations for `station_count` stations over `days` days
fn create_observations(station_count: usize, days: usize) -> Vec<ObservationRecord> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
    let mut records = Vec::with_capacity(station_count * days * 24);

    for station in 0..station_count {
        for hour in 0..days * 24 {
            let timestamp = start + Duration::hours(hour as i64);
            let temp = (hour as f64 / 24.0).sin() * 10.0 + station as f64 * 0.5;
            // every 17th reading missing
            let temperature = (hour % 17 != 0).then_some(temp);
            records.push(ObservationRecord::new(station.to_string(), 2023, timestamp, temperature));
        }
    }

    records
}

fn create_raw_batch(days: usize) -> RawBatch {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let rows = (0..days)
        .filter(|d| d % 11 != 5)
        .map(|d| {
            let date = start + Duration::days(d as i64);
            let temp = if d % 97 == 0 { 60.0 } else { (d as f64 / 30.0).cos() * 12.0 };
            vec![Some(date.format("%Y-%m-%d").to_string()), Some(format!("{:.1}", temp))]
        })
        .collect();

    RawBatch::new(
        BatchKey::new("26953", 2023),
        vec!["Date/Time".to_string(), "Mean Temp (°C)".to_string()],
        rows,
    )
}

fn create_aggregates(station_count: usize, years: i32) -> Vec<MonthlyAggregate> {
    let mut aggregates = Vec::new();
    for station in 0..station_count {
        for year in 2000..2000 + years {
            for month in 1..=12u32 {
                let base = month as f64 + (year - 2000) as f64 * 0.03;
                if let Some(agg) = MonthlyAggregate::from_temperatures(
                    &station.to_string(),
                    year,
                    month,
                    format!("{}-{:02}", year, month),
                    &[base - 3.0, base, base + 3.0],
                ) {
                    aggregates.push(agg);
                }
            }
        }
    }
    aggregates
}

fn benchmark_quality_audit(c: &mut Criterion) {
    let batch = create_raw_batch(365);
    let auditor = QualityAuditor::new();

    c.bench_function("quality_audit_one_year", |b| {
        b.iter(|| {
            let record = auditor.audit_batch(black_box(&batch)).unwrap();
            black_box(record.temperature_outliers)
        })
    });
}

fn benchmark_normalizer(c: &mut Criterion) {
    let batch = create_raw_batch(365);

    c.bench_function("normalize_one_year", |b| {
        b.iter(|| black_box(Normalizer::new().normalize_batch(&batch).unwrap().len()))
    });
}

fn benchmark_monthly_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("monthly_aggregation_by_stations");

    for &stations in &[1, 10, 50] {
        let records = create_observations(stations, 90);
        group.bench_with_input(BenchmarkId::new("stations", stations), &records, |b, records| {
            b.iter(|| black_box(MonthlyAggregator::new().aggregate(records).unwrap().len()))
        });
    }

    group.finish();
}

fn benchmark_yoy(c: &mut Criterion) {
    let aggregates = create_aggregates(20, 25);

    c.bench_function("yoy_20_stations_25_years", |b| {
        b.iter(|| black_box(YoyCalculator::new().calculate(aggregates.clone()).len()))
    });
}

fn benchmark_coordinate_conversion(c: &mut Criterion) {
    let dms_coordinates = ["49:11:42", "-123:10:55", "43:40:36", "-79:24:00", "53:18:45"];

    c.bench_function("coordinate_conversion", |b| {
        b.iter(|| {
            let decimals: Vec<f64> = dms_coordinates
                .iter()
                .filter_map(|dms| dms_to_decimal(dms).ok())
                .collect();
            black_box(decimals.len())
        })
    });
}

criterion_group!(
    benches,
    benchmark_quality_audit,
    benchmark_normalizer,
    benchmark_monthly_aggregation,
    benchmark_yoy,
    benchmark_coordinate_conversion
);
criterion_main!(benches);
