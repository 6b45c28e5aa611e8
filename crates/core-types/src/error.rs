use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid time interval '{0}': {1}")]
    InvalidInterval(String, String),

    #[error("Unknown data type '{0}'")]
    UnknownDataType(String),

    #[error("Column '{0}' appears more than once")]
    DuplicateColumn(String),

    #[error("Column '{0}' not found")]
    ColumnNotFound(String),

    #[error("Timestamp out of range: {0}")]
    OutOfRange(String),

    /// Polars errors are not `Clone`, so only their message is kept.
    #[error("Data frame operation failed: {0}")]
    Frame(String),
}

impl From<PolarsError> for CoreError {
    fn from(err: PolarsError) -> Self {
        CoreError::Frame(err.to_string())
    }
}
