use core_types::CoreError;
use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to open `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read data: {0}")]
    Polars(#[from] PolarsError),

    #[error("The {0} connector is not supported")]
    UnsupportedConnector(String),

    #[error("Unable to determine the file format of `{0}`; supported formats: csv, tsv, parquet")]
    UnknownFormat(String),

    #[error("Source descriptor must contain `path` or both `query` and `uri`")]
    MissingLocation,

    #[error("Invalid schema override for column `{column}`: {message}")]
    InvalidOverride { column: String, message: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}
