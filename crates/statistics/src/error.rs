use thiserror::Error;

/// Errors raised while folding row groups into statistics.
#[derive(Error, Debug)]
pub enum StatisticsError {
    #[error("Column `{0}` is missing from a row group")]
    MissingColumn(String),

    #[error("Continuous bucketing would produce more than {limit} buckets")]
    TooManyBuckets { limit: usize },

    #[error(transparent)]
    Core(#[from] core_types::CoreError),
}
