use configuration::error::ConfigError;
use core_types::Schema;
use preprocessor::PreprocessError;
use source::SourceError;
use statistics::StatisticsError;
use thiserror::Error;

/// The category of a fatal error, independent of the stage that raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Schema,
    Expression,
    Source,
    Compute,
}

#[derive(Error, Debug)]
pub enum EvaluationError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Preprocess(#[from] PreprocessError),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Statistics error: {0}")]
    Statistics(#[from] StatisticsError),

    #[error("Inconsistent result: {0}")]
    Inconsistent(String),
}

impl EvaluationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvaluationError::Config(_) => ErrorKind::Configuration,
            EvaluationError::Preprocess(e) => match e {
                PreprocessError::MissingDateColumn { .. }
                | PreprocessError::InvalidDateType { .. }
                | PreprocessError::UnparseableDate { .. } => ErrorKind::Configuration,
                PreprocessError::Expression(e) if e.is_schema_error() => ErrorKind::Schema,
                PreprocessError::Expression(_) => ErrorKind::Expression,
                PreprocessError::Source(_) => ErrorKind::Source,
                PreprocessError::Core(_) | PreprocessError::Frame(_) => ErrorKind::Compute,
            },
            EvaluationError::Source(_) => ErrorKind::Source,
            // A bucket range too long to fill comes from the interval and policy settings.
            EvaluationError::Statistics(StatisticsError::TooManyBuckets { .. }) => {
                ErrorKind::Configuration
            }
            EvaluationError::Statistics(_) | EvaluationError::Inconsistent(_) => ErrorKind::Compute,
        }
    }

    /// The columns the data does have, when the date column could not be found.
    pub fn available_schema(&self) -> Option<&Schema> {
        match self {
            EvaluationError::Preprocess(PreprocessError::MissingDateColumn { schema, .. }) => {
                Some(schema)
            }
            _ => None,
        }
    }
}
