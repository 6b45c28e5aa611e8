//! # Chronoscope Statistics
//!
//! Folds bucketed row groups into per-bucket, per-column metric series.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** This crate knows nothing about sources or expressions. It
//!   consumes `(Bucket, DataFrame)` groups and produces a `StatisticsReport`.
//! - **Mergeable state:** Every metric is backed by an accumulator with an
//!   associative merge, so a run over one frame and a run over many chunks
//!   agree exactly. Integer and boolean targets are averaged from an exact
//!   `i128` sum.
//!
//! ## Public API
//!
//! - `StatisticsEngine`: folds row groups and finishes them into a report.
//! - `compute_statistics`: the same for groups that are already in memory.
//! - `resolve_target`: picks the column averaged per bucket.
//! - `StatisticsReport`: buckets, row counts, column series and target average.
//! - `HyperLogLog`: the sketch behind approximate distinct counts.
//! - `StatisticsError`: the specific error types that can be returned from this crate.

pub mod accumulator;
pub mod descriptive;
pub mod engine;
pub mod error;
pub mod report;
pub mod sketch;
pub mod target;

pub use accumulator::{ColumnAccumulator, DistinctValues};
pub use engine::{compute_statistics, resolve_target, StatisticsEngine, MAX_BUCKETS};
pub use error::StatisticsError;
pub use report::{ColumnStatistics, MetricSeries, StatisticsReport, TargetAverage};
pub use sketch::HyperLogLog;
pub use target::TargetAccumulator;
