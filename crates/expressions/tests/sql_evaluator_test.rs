//! End-to-end tests for the SQL evaluator: compile, add to a lazy plan, run.

use core_types::frame::{column_values, empty_frame, frame_schema};
use core_types::{DataType, Value};
use expressions::{check_plan, ExpressionError, ExpressionEvaluator, SqlEvaluator};
use polars::df;
use polars::prelude::{DataFrame, IntoLazy, NamedFrom};

fn orders() -> DataFrame {
    df!(
        "id" => &[1i64, 2, 3, 4],
        "amount" => &[Some(10.0), None, Some(250.5), Some(-3.0)],
        "status" => &[Some("paid"), Some("open"), Some("paid"), None],
    )
    .unwrap()
}

fn ids(frame: &DataFrame) -> Vec<Value> {
    column_values(frame, "id").unwrap()
}

fn filtered(expression: &str) -> DataFrame {
    let filter = SqlEvaluator.compile_filter(expression).unwrap();
    filter.apply(orders().lazy()).unwrap().collect().unwrap()
}

#[test]
fn filter_keeps_only_true_rows() {
    // The NULL amount compares as NULL and is dropped.
    assert_eq!(ids(&filtered("amount > 0")), vec![Value::Int(1), Value::Int(3)]);
}

#[test]
fn null_aware_predicates() {
    assert_eq!(
        ids(&filtered("status IS NULL OR status = 'paid'")),
        vec![Value::Int(1), Value::Int(3), Value::Int(4)]
    );
}

#[test]
fn select_projects_and_filters() {
    let out = filtered("SELECT id, amount FROM self WHERE id >= 3");
    let schema = frame_schema(&out).unwrap();
    let names: Vec<&str> = schema.names().collect();
    assert_eq!(names, ["id", "amount"]);
    assert_eq!(ids(&out), vec![Value::Int(3), Value::Int(4)]);
}

#[test]
fn derivations_become_plan_columns() {
    let derived = SqlEvaluator.compile_derivation("amount * 2").unwrap();
    assert_eq!(derived.source(), "amount * 2");
    let out = orders()
        .lazy()
        .with_column(derived.expr().alias("doubled"))
        .collect()
        .unwrap();
    assert_eq!(
        column_values(&out, "doubled").unwrap(),
        vec![
            Value::Float(20.0),
            Value::Null,
            Value::Float(501.0),
            Value::Float(-6.0)
        ]
    );
}

#[test]
fn case_expressions_produce_text() {
    let derived = SqlEvaluator
        .compile_derivation("CASE WHEN id >= 3 THEN 'late' ELSE 'early' END")
        .unwrap();
    let template = empty_frame(&frame_schema(&orders()).unwrap()).unwrap();
    let plan = template.lazy().with_column(derived.expr().alias("phase"));
    let schema = check_plan(derived.source(), &plan).unwrap();
    assert_eq!(schema.get("phase"), Some(DataType::Text));
}

#[test]
fn unknown_columns_are_schema_errors() {
    let template = empty_frame(&frame_schema(&orders()).unwrap()).unwrap();

    let filter = SqlEvaluator.compile_filter("price > 1").unwrap();
    let err = filter
        .apply(template.clone().lazy())
        .and_then(|plan| check_plan(filter.source(), &plan))
        .unwrap_err();
    assert!(err.is_schema_error(), "{err}");

    let derived = SqlEvaluator.compile_derivation("price * 2").unwrap();
    let plan = template.lazy().with_column(derived.expr().alias("p"));
    match check_plan(derived.source(), &plan) {
        Err(ExpressionError::UnknownColumn { column, .. }) => assert!(column.contains("price")),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn bad_syntax_and_non_boolean_filters_are_rejected() {
    assert!(matches!(
        SqlEvaluator.compile_derivation("amount +"),
        Err(ExpressionError::Invalid { .. })
    ));

    let template = empty_frame(&frame_schema(&orders()).unwrap()).unwrap();
    let broken = SqlEvaluator.compile_filter("amount >").unwrap();
    assert!(broken.apply(template.clone().lazy()).is_err());

    let numeric = SqlEvaluator.compile_filter("amount + 1").unwrap();
    let err = numeric
        .apply(template.lazy())
        .and_then(|plan| check_plan(numeric.source(), &plan))
        .unwrap_err();
    assert!(!err.is_schema_error());
}
