//! # Chronoscope Outliers
//!
//! Classifies the points of a bucket-aligned metric series as outliers and
//! summarizes the series.
//!
//! - **IQR**: outside `[Q1 - m*IQR, Q3 + m*IQR]`.
//! - **Z-score**: `|x - mean| / std` above the threshold, with the population
//!   standard deviation.
//!
//! Both criteria only look at non-null points and need at least
//! `MIN_POINTS` of them. Detection never fails.
//!
//! ## Public API
//!
//! - `detect_outliers`: flags plus the bounds used to decide them.
//! - `summarize`: mean, spread, quartiles and flagged share under both criteria.

pub mod detector;
pub mod summary;

pub use detector::{detect_outliers, OutlierBounds, OutlierFlags, MIN_POINTS};
pub use summary::{summarize, SeriesSummary};
