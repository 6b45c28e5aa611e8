use crate::error::PreprocessError;
use crate::plan::{PreprocessOptions, PreprocessPlan};
use core_types::Bucket;
use expressions::ExpressionEvaluator;
use polars::prelude::{DataFrame, DataType};
use source::SourceHandle;
use std::collections::BTreeMap;

/// Reads the whole source and returns its rows grouped by ascending bucket.
///
/// The source itself is never modified.
pub fn preprocess(
    source: &dyn SourceHandle,
    options: &PreprocessOptions,
    evaluator: &dyn ExpressionEvaluator,
) -> Result<Vec<(Bucket, DataFrame)>, PreprocessError> {
    let plan = PreprocessPlan::compile(options, source.schema(), evaluator)?;

    let mut groups: BTreeMap<Bucket, Vec<DataFrame>> = BTreeMap::new();
    let mut dropped = 0usize;
    for chunk in source.scan(None)? {
        let bucketed = plan.apply(chunk?)?;
        dropped += bucketed.dropped_null_dates;
        for (bucket, rows) in bucketed.groups {
            groups.entry(bucket).or_default().push(rows);
        }
    }
    if dropped > 0 {
        tracing::warn!(rows = dropped, "Dropped rows without a date");
    }

    groups
        .into_iter()
        .map(|(bucket, parts)| Ok((bucket, stack(parts)?)))
        .collect()
}

/// Concatenates the parts of one bucket.
///
/// Chunks may disagree on a column's type (an integer column that turned
/// out to hold decimals, or a chunk that fell back to text); such columns
/// are widened to `Float64` when every part is numeric and to text otherwise.
fn stack(parts: Vec<DataFrame>) -> Result<DataFrame, PreprocessError> {
    let mut parts = parts.into_iter();
    let Some(mut stacked) = parts.next() else {
        return Ok(DataFrame::default());
    };
    for mut part in parts {
        for name in stacked.get_column_names_owned() {
            let (mine, theirs) = (stacked.column(&name)?, part.column(&name)?);
            if mine.dtype() == theirs.dtype() {
                continue;
            }
            let common = if mine.dtype().is_numeric() && theirs.dtype().is_numeric() {
                DataType::Float64
            } else {
                DataType::String
            };
            let (mine, theirs) = (mine.cast(&common)?, theirs.cast(&common)?);
            stacked.with_column(mine)?;
            part.with_column(theirs)?;
        }
        stacked.vstack_mut(&part)?;
    }
    stacked.align_chunks();
    Ok(stacked)
}
