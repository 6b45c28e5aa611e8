//! # Chronoscope Source
//!
//! Connectors that turn a source descriptor from the evaluation config into a
//! `SourceHandle`: a schema plus a chunked scan of polars `DataFrame`s.
//!
//! ## Public API
//!
//! - `open_source`: picks a connector from the descriptor.
//! - `SourceHandle`: the read-only contract the pipeline consumes.
//! - `CsvSource`, `ParquetSource`, `MemorySource`: the shipped connectors.
//! - `SourceError`: the specific error types that can be returned from this crate.

pub mod csv;
pub mod env;
pub mod error;
pub mod handle;
pub mod memory;
pub mod parquet;

pub use crate::csv::CsvSource;
pub use error::SourceError;
pub use handle::{ChunkIter, SourceHandle};
pub use memory::MemorySource;
pub use parquet::ParquetSource;

use configuration::SourceConfig;
use std::path::Path;

/// Formats the descriptor can name. Iceberg tables and spreadsheets are
/// recognised but have no connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Tsv,
    Parquet,
    Iceberg,
    Xlsx,
}

impl SourceFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "csv" => Some(SourceFormat::Csv),
            "tsv" => Some(SourceFormat::Tsv),
            "parquet" => Some(SourceFormat::Parquet),
            "iceberg" => Some(SourceFormat::Iceberg),
            "xlsx" | "xls" => Some(SourceFormat::Xlsx),
            _ => None,
        }
    }

    /// Derives the format from the file extension.
    pub fn from_path(path: &str) -> Option<Self> {
        Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            SourceFormat::Csv => "csv",
            SourceFormat::Tsv => "tsv",
            SourceFormat::Parquet => "parquet",
            SourceFormat::Iceberg => "iceberg",
            SourceFormat::Xlsx => "xlsx",
        }
    }
}

/// Opens the dataset a source descriptor points at.
///
/// `$VAR` placeholders in `path`, `uri` and `storage_options` are resolved
/// from the environment first.
pub fn open_source(config: &SourceConfig) -> Result<Box<dyn SourceHandle>, SourceError> {
    if let (Some(_query), Some(uri)) = (&config.query, &config.uri) {
        let uri = env::resolve(uri);
        let scheme = uri.split("://").next().unwrap_or("database");
        tracing::error!(scheme, "Database sources are not available");
        return Err(SourceError::UnsupportedConnector(format!("database ({scheme})")));
    }

    let Some(raw_path) = config.path.as_deref() else {
        return Err(SourceError::MissingLocation);
    };
    let path = env::resolve(raw_path);
    let storage_options = env::resolve_map(&config.storage_options);

    let format = match config.format.as_deref() {
        Some(name) => SourceFormat::from_name(name)
            .ok_or_else(|| SourceError::UnknownFormat(format!("{path} (format `{name}`)")))?,
        None => {
            let format =
                SourceFormat::from_path(&path).ok_or_else(|| SourceError::UnknownFormat(path.clone()))?;
            tracing::info!(format = format.name(), "Identified file format");
            format
        }
    };

    if let Some((scheme, _)) = path.split_once("://") {
        return Err(SourceError::UnsupportedConnector(format!(
            "remote storage ({scheme})"
        )));
    }
    if !storage_options.is_empty() {
        tracing::debug!(
            options = storage_options.len(),
            "Storage options are ignored for local files"
        );
    }

    match format {
        SourceFormat::Csv => Ok(Box::new(CsvSource::open(&path, b',', &config.schema_overrides)?)),
        SourceFormat::Tsv => Ok(Box::new(CsvSource::open(&path, b'\t', &config.schema_overrides)?)),
        SourceFormat::Parquet => {
            if !config.schema_overrides.is_empty() {
                tracing::warn!("Schema overrides are ignored for Parquet files");
            }
            Ok(Box::new(ParquetSource::open(&path)?))
        }
        other => Err(SourceError::UnsupportedConnector(other.name().to_string())),
    }
}
