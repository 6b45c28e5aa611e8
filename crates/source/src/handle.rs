use crate::error::SourceError;
use core_types::Schema;
use polars::prelude::{DataFrame, IdxSize, LazyFrame};

/// A lazily evaluated stream of frame chunks.
pub type ChunkIter<'a> = Box<dyn Iterator<Item = Result<DataFrame, SourceError>> + 'a>;

/// An opened, read-only dataset.
///
/// Every chunk a scan yields has the columns of `schema()`, in order. A
/// column whose cells do not all parse as its declared type may arrive as
/// text for that chunk.
pub trait SourceHandle {
    fn schema(&self) -> &Schema;

    /// Iterates the dataset in chunks of at most `chunk_size` rows. With
    /// `None` the whole dataset arrives as a single (possibly empty) frame.
    fn scan(&self, chunk_size: Option<usize>) -> Result<ChunkIter<'_>, SourceError>;
}

/// Collects `frame` in one piece, or slice by slice.
///
/// Each slice is its own query, so only one chunk is held at a time.
pub(crate) fn sliced(frame: LazyFrame, chunk_size: Option<usize>) -> ChunkIter<'static> {
    let Some(size) = chunk_size else {
        return Box::new(std::iter::once(frame.collect().map_err(SourceError::from)));
    };
    let size = IdxSize::try_from(size.max(1)).unwrap_or(IdxSize::MAX);
    let mut offset = 0i64;
    let mut finished = false;
    Box::new(std::iter::from_fn(move || {
        if finished {
            return None;
        }
        let chunk = match frame.clone().slice(offset, size).collect() {
            Ok(chunk) => chunk,
            Err(e) => {
                finished = true;
                return Some(Err(e.into()));
            }
        };
        let rows = chunk.height();
        finished = rows < size as usize;
        offset += rows as i64;
        (rows > 0).then_some(Ok(chunk))
    }))
}
