//! Conversions between polars frames and the chronoscope data model.

use crate::enums::DataType;
use crate::error::CoreError;
use crate::structs::{Field, Schema, Value};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use polars::prelude as pl;
use polars::prelude::{DataFrame, Series};

/// Day number of 1970-01-01 counted from 0001-01-01 (day 1).
const UNIX_EPOCH_DAY: i32 = 719_163;

/// The polars type a column of `data_type` is stored as.
pub fn polars_type(data_type: DataType) -> pl::DataType {
    match data_type {
        DataType::Integer => pl::DataType::Int64,
        DataType::Float => pl::DataType::Float64,
        DataType::Boolean => pl::DataType::Boolean,
        DataType::Text => pl::DataType::String,
        DataType::Date => pl::DataType::Date,
        DataType::DateTime => pl::DataType::Datetime(pl::TimeUnit::Microseconds, None),
    }
}

/// Every integer width is `Integer` and every float width is `Float`.
/// Polars types with no counterpart here (durations, lists, categoricals)
/// are described as text.
pub fn data_type_of(dtype: &pl::DataType) -> DataType {
    match dtype {
        pl::DataType::Boolean => DataType::Boolean,
        pl::DataType::Date => DataType::Date,
        pl::DataType::Datetime(_, _) => DataType::DateTime,
        dt if dt.is_integer() => DataType::Integer,
        dt if dt.is_float() => DataType::Float,
        _ => DataType::Text,
    }
}

pub fn schema_of(schema: &pl::Schema) -> Result<Schema, CoreError> {
    Schema::new(
        schema
            .iter()
            .map(|(name, dtype)| Field::new(name.as_str(), data_type_of(dtype)))
            .collect(),
    )
}

pub fn frame_schema(frame: &DataFrame) -> Result<Schema, CoreError> {
    schema_of(&frame.schema())
}

/// A zero-row frame whose columns have the polars types of `schema`.
pub fn empty_frame(schema: &Schema) -> Result<DataFrame, CoreError> {
    let columns: Vec<Series> = schema
        .fields()
        .iter()
        .map(|f| Series::new_empty(&f.name, &polars_type(f.data_type)))
        .collect();
    Ok(DataFrame::new(columns)?)
}

/// The values of one column of `frame`.
pub fn column_values(frame: &DataFrame, name: &str) -> Result<Vec<Value>, CoreError> {
    let series = frame
        .column(name)
        .map_err(|_| CoreError::ColumnNotFound(name.to_string()))?;
    series_values(series)
}

/// Converts a series cell by cell. Nulls become `Value::Null`.
pub fn series_values(series: &Series) -> Result<Vec<Value>, CoreError> {
    let values = match series.dtype() {
        pl::DataType::Boolean => series
            .bool()?
            .into_iter()
            .map(|v| v.map_or(Value::Null, Value::Bool))
            .collect(),
        pl::DataType::String => series
            .str()?
            .into_iter()
            .map(|v| v.map_or(Value::Null, |s| Value::Text(s.to_string())))
            .collect(),
        pl::DataType::Date => {
            let days = series.to_physical_repr();
            days.i32()?
                .into_iter()
                .map(|v| v.and_then(date_from_days).map_or(Value::Null, Value::Date))
                .collect()
        }
        pl::DataType::Datetime(unit, _) => {
            let unit = *unit;
            let ticks = series.to_physical_repr();
            ticks
                .i64()?
                .into_iter()
                .map(|v| {
                    v.and_then(|v| timestamp_from_ticks(v, unit))
                        .map_or(Value::Null, Value::DateTime)
                })
                .collect()
        }
        pl::DataType::Null => vec![Value::Null; series.len()],
        dt if dt.is_integer() => series
            .cast(&pl::DataType::Int64)?
            .i64()?
            .into_iter()
            .map(|v| v.map_or(Value::Null, Value::Int))
            .collect(),
        dt if dt.is_float() => series
            .cast(&pl::DataType::Float64)?
            .f64()?
            .into_iter()
            .map(|v| v.map_or(Value::Null, Value::Float))
            .collect(),
        _ => series
            .cast(&pl::DataType::String)?
            .str()?
            .into_iter()
            .map(|v| v.map_or(Value::Null, |s| Value::Text(s.to_string())))
            .collect(),
    };
    Ok(values)
}

pub fn date_from_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_DAY)?)
}

pub fn days_from_date(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAY
}

pub fn timestamp_from_ticks(ticks: i64, unit: pl::TimeUnit) -> Option<NaiveDateTime> {
    let (per_second, nanos_per_tick) = match unit {
        pl::TimeUnit::Nanoseconds => (1_000_000_000, 1),
        pl::TimeUnit::Microseconds => (1_000_000, 1_000),
        pl::TimeUnit::Milliseconds => (1_000, 1_000_000),
    };
    let nanos = u32::try_from(ticks.rem_euclid(per_second) * nanos_per_tick).ok()?;
    DateTime::from_timestamp(ticks.div_euclid(per_second), nanos).map(|dt| dt.naive_utc())
}
