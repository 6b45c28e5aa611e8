//! Tests for filter/transform/bucket behaviour over in-memory sources.

use chrono::{NaiveDate, NaiveDateTime};
use configuration::Transformation;
use core_types::frame::{column_values, polars_type};
use core_types::{Bucket, DataType, Value};
use expressions::SqlEvaluator;
use polars::df;
use polars::prelude::{DataFrame, NamedFrom, Series};
use preprocessor::{preprocess, PreprocessError, PreprocessOptions, PreprocessPlan};
use source::{MemorySource, SourceHandle};

fn ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

fn events() -> DataFrame {
    let at = |s: &str| Some(ts(s).and_utc().timestamp_micros());
    let happened_at = Series::new(
        "happened_at",
        vec![
            at("2024-01-01 08:00:00"),
            at("2024-01-03 09:30:00"),
            at("2024-01-02 23:59:59"),
            at("2024-01-01 17:00:00"),
            None,
        ],
    )
    .cast(&polars_type(DataType::DateTime))
    .unwrap();
    DataFrame::new(vec![
        happened_at,
        Series::new("user", &["ann", "bob", "ann", "cid", "dan"]),
        Series::new("amount", &[10i64, -5, 20, 30, 1]),
        Series::new("rate", &[2.0f64; 5]),
    ])
    .unwrap()
}

fn source() -> MemorySource {
    MemorySource::new(events()).unwrap()
}

fn options() -> PreprocessOptions {
    PreprocessOptions {
        date_column: Some("happened_at".to_string()),
        ..PreprocessOptions::default()
    }
}

fn transformation(name: &str, expression: &str) -> Transformation {
    Transformation {
        name: name.to_string(),
        expression: expression.to_string(),
    }
}

#[test]
fn one_day_buckets_over_three_days_are_ascending() {
    let source = source();
    let groups = preprocess(&source, &options(), &SqlEvaluator).unwrap();

    let buckets: Vec<Bucket> = groups.iter().map(|(b, _)| *b).collect();
    assert_eq!(
        buckets,
        vec![
            Bucket(ts("2024-01-01 00:00:00")),
            Bucket(ts("2024-01-02 00:00:00")),
            Bucket(ts("2024-01-03 00:00:00")),
        ]
    );
    let sizes: Vec<usize> = groups.iter().map(|(_, frame)| frame.height()).collect();
    // The row without a date is dropped.
    assert_eq!(sizes, vec![2, 1, 1]);
}

#[test]
fn filter_runs_before_transformations() {
    let mut options = options();
    options.filter = Some("SELECT amount, happened_at, rate FROM self WHERE amount > 0".to_string());
    options.transformations = vec![
        transformation("amount", "amount * rate"),
        transformation("big", "amount >= 40"),
    ];
    let source = source();
    let plan = PreprocessPlan::compile(&options, source.schema(), &SqlEvaluator).unwrap();

    // Replaced columns keep their position; new ones are appended.
    let layout: Vec<(String, DataType)> = plan
        .schema()
        .fields()
        .iter()
        .map(|f| (f.name.clone(), f.data_type))
        .collect();
    assert_eq!(
        layout,
        vec![
            ("amount".to_string(), DataType::Float),
            ("happened_at".to_string(), DataType::DateTime),
            ("rate".to_string(), DataType::Float),
            ("big".to_string(), DataType::Boolean),
        ]
    );

    let chunk = plan.apply(events()).unwrap();
    assert_eq!(chunk.num_rows(), 3);
    assert_eq!(chunk.dropped_null_dates, 1);
    let first_day = &chunk.groups[0].1;
    assert_eq!(
        column_values(first_day, "big").unwrap(),
        vec![Value::Bool(false), Value::Bool(true)]
    );
}

#[test]
fn transformations_see_earlier_transformations() {
    let mut options = options();
    options.transformations = vec![
        transformation("double", "amount * 2"),
        transformation("quad", "double * 2"),
    ];
    let source = source();
    let groups = preprocess(&source, &options, &SqlEvaluator).unwrap();
    assert_eq!(column_values(&groups[1].1, "quad").unwrap(), vec![Value::Int(80)]);
}

#[test]
fn excluded_columns_stay_visible_to_expressions() {
    let mut options = options();
    options.columns_to_exclude = vec!["rate".to_string()];
    options.transformations = vec![transformation("scaled", "amount * rate")];
    let source = source();
    let plan = PreprocessPlan::compile(&options, source.schema(), &SqlEvaluator).unwrap();

    let statistics: Vec<&str> = plan.statistics_schema().names().collect();
    assert_eq!(statistics, ["user", "amount", "scaled"]);
    assert_eq!(plan.date_column(), "happened_at");
}

#[test]
fn sql_functions_are_available_to_transformations() {
    let mut options = options();
    options.transformations = vec![transformation(
        "tier",
        "CASE WHEN amount > 15 THEN 'high' ELSE 'low' END",
    )];
    let plan = PreprocessPlan::compile(&options, source().schema(), &SqlEvaluator).unwrap();
    assert_eq!(plan.schema().get("tier"), Some(DataType::Text));

    let chunk = plan.apply(events()).unwrap();
    let first_day = &chunk.groups[0].1;
    assert_eq!(
        column_values(first_day, "tier").unwrap(),
        vec![Value::Text("low".into()), Value::Text("high".into())]
    );
}

#[test]
fn text_dates_are_parsed_strictly() {
    let good = df!("date_column" => &["2024-05-01", "2024-05-01T10:00:00"]).unwrap();
    let groups = preprocess(
        &MemorySource::new(good).unwrap(),
        &PreprocessOptions::default(),
        &SqlEvaluator,
    )
    .unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(
        groups[0].0.start().date(),
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    );

    let bad = df!("date_column" => &["01/05/2024"]).unwrap();
    let err = preprocess(
        &MemorySource::new(bad).unwrap(),
        &PreprocessOptions::default(),
        &SqlEvaluator,
    )
    .unwrap_err();
    assert!(matches!(err, PreprocessError::UnparseableDate { ref value, .. } if value == "01/05/2024"));
}

#[test]
fn missing_date_column_reports_the_schema() {
    let mut options = options();
    options.date_column = Some("timestamp".to_string());
    let source = source();
    let err = PreprocessPlan::compile(&options, source.schema(), &SqlEvaluator).unwrap_err();
    match err {
        PreprocessError::MissingDateColumn { schema, .. } => {
            assert_eq!(&schema, source.schema());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn expression_errors_surface_before_any_data_is_read() {
    let mut options = options();
    options.transformations = vec![transformation("x", "missing + 1")];
    let source = source();
    match PreprocessPlan::compile(&options, source.schema(), &SqlEvaluator) {
        Err(PreprocessError::Expression(e)) => assert!(e.is_schema_error()),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn six_hour_buckets() {
    let mut options = options();
    options.time_interval = "6h".parse().unwrap();
    let source = source();
    let groups = preprocess(&source, &options, &SqlEvaluator).unwrap();
    let starts: Vec<NaiveDateTime> = groups.iter().map(|(b, _)| b.start()).collect();
    assert_eq!(
        starts,
        vec![
            ts("2024-01-01 06:00:00"),
            ts("2024-01-01 12:00:00"),
            ts("2024-01-02 18:00:00"),
            ts("2024-01-03 06:00:00"),
        ]
    );
}
