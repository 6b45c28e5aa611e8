//! # Chronoscope Preprocessor
//!
//! Turns raw source chunks into rows grouped by time bucket. Filter and
//! transformations run as a polars lazy plan over each chunk.
//!
//! ## Architectural Principles
//!
//! - **Compile, then apply:** `PreprocessPlan::compile` checks the filter,
//!   the transformations and the date column against the source schema before
//!   any row is read. `PreprocessPlan::apply` then runs on each chunk
//!   independently, which is what makes streaming possible.
//! - **Order:** filter, then transformations in their listed order, then date
//!   resolution and truncation. Excluded columns stay visible to expressions
//!   and are only dropped from the statistics schema.
//!
//! ## Public API
//!
//! - `PreprocessPlan` / `PreprocessOptions` / `BucketedChunk`
//! - `preprocess`: the materialising convenience wrapper.
//! - `PreprocessError`

pub mod error;
pub mod materialize;
pub mod plan;

pub use error::PreprocessError;
pub use materialize::preprocess;
pub use plan::{BucketedChunk, PreprocessOptions, PreprocessPlan};
