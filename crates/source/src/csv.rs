use crate::error::SourceError;
use crate::handle::{sliced, ChunkIter, SourceHandle};
use configuration::SchemaOverride;
use core_types::frame::{days_from_date, polars_type, schema_of};
use core_types::temporal::{parse_date, parse_timestamp};
use core_types::{DataType, Schema};
use polars::prelude as pl;
use polars::prelude::{DataFrame, LazyCsvReader, LazyFileListReader, LazyFrame, NamedFrom, Series};
use std::path::{Path, PathBuf};

/// Number of data rows sampled to infer a CSV schema.
pub const INFER_SCHEMA_ROWS: usize = 100;

/// A delimited text file with a header row.
///
/// The schema is inferred from the first `INFER_SCHEMA_ROWS` rows when the
/// source is opened. Scans read every cell as text and convert each chunk to
/// the declared types; a column whose cells do not all convert is passed on
/// as text for that chunk so the statistics can treat it as mixed data.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    delimiter: u8,
    schema: Schema,
}

impl CsvSource {
    pub fn open(
        path: impl AsRef<Path>,
        delimiter: u8,
        overrides: &[SchemaOverride],
    ) -> Result<Self, SourceError> {
        let path = path.as_ref().to_path_buf();
        std::fs::metadata(&path).map_err(|source| SourceError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let inferred = LazyCsvReader::new(&path)
            .has_header(true)
            .with_separator(delimiter)
            .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
            .with_try_parse_dates(true)
            .finish()?
            .schema()?;
        let mut schema = schema_of(&inferred)?;

        for o in overrides {
            let data_type: DataType =
                o.data_type
                    .parse()
                    .map_err(|e: core_types::CoreError| SourceError::InvalidOverride {
                        column: o.column.clone(),
                        message: e.to_string(),
                    })?;
            if schema.contains(&o.column) {
                schema = schema.with_column(&o.column, data_type);
            } else {
                tracing::warn!(
                    column = %o.column,
                    "Schema override names a column the file does not have"
                );
            }
        }

        tracing::info!(
            path = %path.display(),
            columns = schema.len(),
            sampled_rows = INFER_SCHEMA_ROWS,
            "Opened CSV source"
        );
        Ok(Self {
            path,
            delimiter,
            schema,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The file with every column read as text.
    fn raw_frame(&self) -> Result<LazyFrame, SourceError> {
        let text: pl::Schema = self
            .schema
            .names()
            .map(|name| pl::Field::new(name, pl::DataType::String))
            .collect();
        Ok(LazyCsvReader::new(&self.path)
            .has_header(true)
            .with_separator(self.delimiter)
            .with_dtype_overwrite(Some(&text))
            .finish()?)
    }
}

impl SourceHandle for CsvSource {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn scan(&self, chunk_size: Option<usize>) -> Result<ChunkIter<'_>, SourceError> {
        let raw = sliced(self.raw_frame()?, chunk_size);
        Ok(Box::new(raw.map(|chunk| conform(&chunk?, &self.schema))))
    }
}

/// Converts a chunk of text columns to the declared types.
fn conform(chunk: &DataFrame, schema: &Schema) -> Result<DataFrame, SourceError> {
    let columns = schema
        .fields()
        .iter()
        .map(|field| {
            let raw = chunk.column(&field.name)?;
            Ok(convert(raw, field.data_type)?.unwrap_or_else(|| raw.clone()))
        })
        .collect::<Result<Vec<Series>, SourceError>>()?;
    Ok(DataFrame::new(columns)?)
}

/// The column under `data_type`, or `None` when some cell does not convert.
/// Integer columns fall back to floats before giving up, so a decimal that
/// first appears after the sampled rows keeps the column numeric.
fn convert(raw: &Series, data_type: DataType) -> Result<Option<Series>, SourceError> {
    let name = raw.name();
    let cells = raw.str()?;
    let converted = match data_type {
        DataType::Text => Some(raw.clone()),
        DataType::Integer => raw
            .strict_cast(&pl::DataType::Int64)
            .or_else(|_| raw.strict_cast(&pl::DataType::Float64))
            .ok(),
        DataType::Float => raw.strict_cast(&pl::DataType::Float64).ok(),
        DataType::Boolean => {
            parse_cells(cells, parse_bool).map(|values| Series::new(name, values))
        }
        DataType::Date => match parse_cells(cells, |s| parse_date(s).map(days_from_date)) {
            Some(days) => Some(Series::new(name, days).cast(&pl::DataType::Date)?),
            None => None,
        },
        DataType::DateTime => {
            match parse_cells(cells, |s| parse_timestamp(s).map(|ts| ts.and_utc().timestamp_micros())) {
                Some(micros) => Some(Series::new(name, micros).cast(&polars_type(DataType::DateTime))?),
                None => None,
            }
        }
    };
    Ok(converted)
}

fn parse_cells<T>(cells: &pl::StringChunked, parse: impl Fn(&str) -> Option<T>) -> Option<Vec<Option<T>>> {
    cells
        .into_iter()
        .map(|cell| match cell {
            None => Some(None),
            Some(text) => parse(text).map(Some),
        })
        .collect()
}

fn parse_bool(raw: &str) -> Option<bool> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}
