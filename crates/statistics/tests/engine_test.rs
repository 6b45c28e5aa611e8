//! Tests for folding row groups into a statistics report.

use chrono::NaiveDate;
use configuration::{BucketPolicy, DistinctCount};
use core_types::frame::days_from_date;
use core_types::{Bucket, DataType, Metric, MetricValue, Schema, TimeInterval};
use polars::df;
use polars::prelude::{DataFrame, DataType as PolarsType, NamedFrom, Series};
use statistics::{compute_statistics, StatisticsEngine, StatisticsReport};

fn day(d: u32) -> Bucket {
    Bucket(
        NaiveDate::from_ymd_opt(2024, 3, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap(),
    )
}

fn schema() -> Schema {
    Schema::from_pairs([
        ("price", DataType::Float),
        ("city", DataType::Text),
        ("seen", DataType::Date),
    ])
    .unwrap()
}

fn table(rows: Vec<(Option<f64>, &str, u32)>) -> DataFrame {
    let seen: Vec<i32> = rows
        .iter()
        .map(|r| days_from_date(NaiveDate::from_ymd_opt(2024, 3, r.2).unwrap()))
        .collect();
    DataFrame::new(vec![
        Series::new("price", rows.iter().map(|r| r.0).collect::<Vec<_>>()),
        Series::new("city", rows.iter().map(|r| r.1).collect::<Vec<_>>()),
        Series::new("seen", seen).cast(&PolarsType::Date).unwrap(),
    ])
    .unwrap()
}

fn run(groups: &[(Bucket, DataFrame)], distinct: DistinctCount) -> StatisticsReport {
    compute_statistics(
        groups,
        &schema(),
        None,
        distinct,
        BucketPolicy::Sparse,
        TimeInterval::default(),
    )
    .unwrap()
}

fn numbers(report: &StatisticsReport, column: &str, metric: Metric) -> Vec<Option<f64>> {
    report
        .column(column)
        .unwrap()
        .metric(metric)
        .unwrap()
        .as_f64()
}

#[test]
fn metric_series_follow_canonical_order() {
    let report = run(
        &[(day(1), table(vec![(Some(1.0), "oslo", 1)]))],
        DistinctCount::Exact,
    );
    let price: Vec<Metric> = report.columns[0].metrics.iter().map(|s| s.metric).collect();
    assert_eq!(
        price,
        vec![
            Metric::Count,
            Metric::NullCount,
            Metric::NullRatio,
            Metric::UniqueCount,
            Metric::Mean,
            Metric::Std,
            Metric::Min,
            Metric::Max,
            Metric::P25,
            Metric::Median,
            Metric::P75,
        ]
    );
    let names: Vec<&str> = report.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["price", "city", "seen"]);
}

#[test]
fn per_bucket_metrics() {
    let report = run(
        &[
            (
                day(1),
                table(vec![(Some(2.0), "oslo", 1), (None, "oslo", 1), (Some(4.0), "rome", 1)]),
            ),
            (day(2), table(vec![(Some(10.0), "rome", 2)])),
        ],
        DistinctCount::Exact,
    );

    assert_eq!(report.row_counts, vec![3, 1]);
    assert_eq!(numbers(&report, "price", Metric::Count), vec![Some(2.0), Some(1.0)]);
    assert_eq!(
        numbers(&report, "price", Metric::NullRatio),
        vec![Some(1.0 / 3.0), Some(0.0)]
    );
    assert_eq!(numbers(&report, "price", Metric::Mean), vec![Some(3.0), Some(10.0)]);
    assert_eq!(numbers(&report, "price", Metric::Std), vec![Some(1.0), Some(0.0)]);
    assert_eq!(numbers(&report, "city", Metric::UniqueCount), vec![Some(2.0), Some(1.0)]);
    assert_eq!(numbers(&report, "city", Metric::ModeFrequency), vec![Some(2.0), Some(1.0)]);

    let seen = report.column("seen").unwrap().metric(Metric::Max).unwrap();
    assert_eq!(
        seen.values[1],
        Some(MetricValue::Timestamp(day(2).start()))
    );
}

#[test]
fn chunking_does_not_change_the_result() {
    let rows: Vec<(Option<f64>, &str, u32)> = (0..30)
        .map(|i| {
            let price = if i % 7 == 0 { None } else { Some(f64::from(i) * 0.37) };
            (price, ["a", "b", "c"][i as usize % 3], 1 + (i % 3))
        })
        .collect();
    let whole = table(rows.clone());
    let whole_report = run(&[(day(1), whole.clone())], DistinctCount::Approximate);

    let mut engine = StatisticsEngine::new(&schema(), None, DistinctCount::Approximate);
    for offset in (0..30).step_by(4) {
        let len = 4.min(30 - offset);
        engine.fold(&[(day(1), whole.slice(offset as i64, len))]).unwrap();
    }
    let chunked_report = engine
        .finish(BucketPolicy::Sparse, TimeInterval::default())
        .unwrap();

    assert_eq!(chunked_report, whole_report);
}

#[test]
fn mixed_values_keep_only_count_metrics_for_the_whole_run() {
    let schema = Schema::from_pairs([("amount", DataType::Integer)]).unwrap();
    let clean = df!("amount" => &[5i64]).unwrap();
    // A chunk whose cells did not all parse arrives as text.
    let dirty = df!("amount" => &["1", "n/a"]).unwrap();

    let mut engine = StatisticsEngine::new(&schema, None, DistinctCount::Exact);
    engine.fold(&[(day(1), clean), (day(2), dirty)]).unwrap();
    let report = engine
        .finish(BucketPolicy::Sparse, TimeInterval::default())
        .unwrap();

    let amount = report.column("amount").unwrap();
    assert!(amount.mixed);
    let metrics: Vec<Metric> = amount.metrics.iter().map(|s| s.metric).collect();
    assert_eq!(metrics, vec![Metric::Count, Metric::NullCount, Metric::NullRatio]);
    assert_eq!(numbers(&report, "amount", Metric::Count), vec![Some(1.0), Some(2.0)]);
}

#[test]
fn missing_column_is_an_error() {
    let mut engine = StatisticsEngine::new(&schema(), None, DistinctCount::Exact);
    let frame = df!("price" => &[1.0f64]).unwrap();
    assert!(engine.fold(&[(day(1), frame)]).is_err());
}
