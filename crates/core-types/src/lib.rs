//! # Chronoscope Core Types
//!
//! The foundational data model shared by every other crate: typed schemas,
//! cell values, time buckets and the metric vocabulary, plus the conversions
//! between polars frames and that model.
//!
//! This crate has no knowledge of configuration, sources or statistics.

pub mod enums;
pub mod error;
pub mod frame;
pub mod interval;
pub mod structs;
pub mod temporal;

// Re-export the core types to provide a clean public API.
pub use enums::{ColumnCategory, DataType, Metric};
pub use error::CoreError;
pub use interval::{Bucket, TimeInterval};
pub use structs::{Field, MetricValue, Schema, Value};
