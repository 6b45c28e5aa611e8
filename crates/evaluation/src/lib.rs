//! # Chronoscope Evaluation
//!
//! The end-to-end pipeline: source → preprocess → statistics → outliers →
//! `EvaluationResult`.
//!
//! ## Architectural Principles
//!
//! - **Fail early:** the preprocessing plan is compiled against the source
//!   schema before any data is read.
//! - **Chunk size is a memory knob:** in streaming mode chunks are folded one
//!   after another into mergeable accumulators; the result equals the one of a
//!   materialized run.
//! - **Immutable output:** the `EvaluationResult` is built once and only
//!   exposes getters.
//!
//! ## Public API
//!
//! - `evaluate` / `run`: execute a configured evaluation.
//! - `assemble`: turns a statistics report into a flagged `EvaluationResult`.
//! - `EvaluationError` and its `ErrorKind`.

pub mod assembler;
pub mod error;
pub mod pipeline;
pub mod result;

pub use assembler::{assemble, RunContext};
pub use error::{ErrorKind, EvaluationError};
pub use pipeline::{evaluate, run};
pub use result::{ColumnResult, EvaluationResult, FlaggedSeries, MetricResult, TargetResult};
