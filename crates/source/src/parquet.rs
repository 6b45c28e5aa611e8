use crate::error::SourceError;
use crate::handle::{sliced, ChunkIter, SourceHandle};
use core_types::frame::schema_of;
use core_types::Schema;
use polars::prelude::{LazyFrame, ScanArgsParquet};
use std::path::{Path, PathBuf};

/// A Parquet file. Column types come from the file's own schema.
#[derive(Clone)]
pub struct ParquetSource {
    path: PathBuf,
    frame: LazyFrame,
    schema: Schema,
}

impl ParquetSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref().to_path_buf();
        std::fs::metadata(&path).map_err(|source| SourceError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let frame = LazyFrame::scan_parquet(&path, ScanArgsParquet::default())?;
        let schema = schema_of(&*frame.schema()?)?;
        tracing::info!(path = %path.display(), columns = schema.len(), "Opened Parquet source");
        Ok(Self {
            path,
            frame,
            schema,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SourceHandle for ParquetSource {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn scan(&self, chunk_size: Option<usize>) -> Result<ChunkIter<'_>, SourceError> {
        Ok(sliced(self.frame.clone(), chunk_size))
    }
}
