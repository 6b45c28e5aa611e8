use crate::error::SourceError;
use crate::handle::{ChunkIter, SourceHandle};
use core_types::frame::frame_schema;
use core_types::Schema;
use polars::prelude::DataFrame;

/// A source backed by a frame already in memory.
#[derive(Debug, Clone)]
pub struct MemorySource {
    frame: DataFrame,
    schema: Schema,
}

impl MemorySource {
    pub fn new(frame: DataFrame) -> Result<Self, SourceError> {
        let schema = frame_schema(&frame)?;
        Ok(Self { frame, schema })
    }
}

impl SourceHandle for MemorySource {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn scan(&self, chunk_size: Option<usize>) -> Result<ChunkIter<'_>, SourceError> {
        match chunk_size {
            None => Ok(Box::new(std::iter::once(Ok(self.frame.clone())))),
            Some(size) => {
                let size = size.max(1);
                Ok(Box::new(
                    (0..self.frame.height())
                        .step_by(size)
                        .map(move |offset| Ok(self.frame.slice(offset as i64, size))),
                ))
            }
        }
    }
}
