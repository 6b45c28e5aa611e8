use core_types::{CoreError, DataType, Schema};
use expressions::ExpressionError;
use polars::prelude::PolarsError;
use source::SourceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PreprocessError {
    /// Carries the full schema so callers can show the user what is available.
    #[error("No date column `{requested}` in the data; available columns:\n{schema}")]
    MissingDateColumn { requested: String, schema: Schema },

    #[error("Date column `{column}` has type {data_type}; expected Date, DateTime or Text")]
    InvalidDateType { column: String, data_type: DataType },

    #[error("Cannot parse `{value}` in date column `{column}` as a date or timestamp")]
    UnparseableDate { column: String, value: String },

    #[error(transparent)]
    Expression(#[from] ExpressionError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Preprocessing failed: {0}")]
    Core(#[from] CoreError),

    #[error("Failed to group rows by bucket: {0}")]
    Frame(#[from] PolarsError),
}
