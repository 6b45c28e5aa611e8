use configuration::OutlierCriterion;
use core_types::{Bucket, DataType, Metric, MetricValue, TimeInterval};
use outliers::{OutlierFlags, SeriesSummary};
use serde::Serialize;

/// A bucket-aligned series with its outlier flags and summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlaggedSeries<T> {
    values: Vec<T>,
    outliers: OutlierFlags,
    summary: SeriesSummary,
}

impl<T> FlaggedSeries<T> {
    pub(crate) fn new(values: Vec<T>, outliers: OutlierFlags, summary: SeriesSummary) -> Self {
        Self {
            values,
            outliers,
            summary,
        }
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn outliers(&self) -> &OutlierFlags {
        &self.outliers
    }

    pub fn summary(&self) -> &SeriesSummary {
        &self.summary
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricResult {
    metric: Metric,
    series: FlaggedSeries<Option<MetricValue>>,
}

impl MetricResult {
    pub(crate) fn new(metric: Metric, series: FlaggedSeries<Option<MetricValue>>) -> Self {
        Self { metric, series }
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn series(&self) -> &FlaggedSeries<Option<MetricValue>> {
        &self.series
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnResult {
    name: String,
    data_type: DataType,
    metrics: Vec<MetricResult>,
}

impl ColumnResult {
    pub(crate) fn new(name: String, data_type: DataType, metrics: Vec<MetricResult>) -> Self {
        Self {
            name,
            data_type,
            metrics,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// In canonical metric order.
    pub fn metrics(&self) -> &[MetricResult] {
        &self.metrics
    }

    pub fn metric(&self, metric: Metric) -> Option<&MetricResult> {
        self.metrics.iter().find(|m| m.metric == metric)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetResult {
    column: String,
    series: FlaggedSeries<Option<f64>>,
    overall: Option<f64>,
}

impl TargetResult {
    pub(crate) fn new(column: String, series: FlaggedSeries<Option<f64>>, overall: Option<f64>) -> Self {
        Self {
            column,
            series,
            overall,
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn series(&self) -> &FlaggedSeries<Option<f64>> {
        &self.series
    }

    /// Mean over all rows, not the mean of the bucket averages.
    pub fn overall(&self) -> Option<f64> {
        self.overall
    }
}

/// Everything one evaluation run produced. Built once by the assembler and
/// read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    date_column: String,
    interval: TimeInterval,
    criterion: OutlierCriterion,
    buckets: Vec<Bucket>,
    row_counts: FlaggedSeries<u64>,
    columns: Vec<ColumnResult>,
    target: Option<TargetResult>,
    dropped_null_dates: u64,
}

impl EvaluationResult {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        date_column: String,
        interval: TimeInterval,
        criterion: OutlierCriterion,
        buckets: Vec<Bucket>,
        row_counts: FlaggedSeries<u64>,
        columns: Vec<ColumnResult>,
        target: Option<TargetResult>,
        dropped_null_dates: u64,
    ) -> Self {
        Self {
            date_column,
            interval,
            criterion,
            buckets,
            row_counts,
            columns,
            target,
            dropped_null_dates,
        }
    }

    pub fn date_column(&self) -> &str {
        &self.date_column
    }

    pub fn interval(&self) -> TimeInterval {
        self.interval
    }

    pub fn criterion(&self) -> OutlierCriterion {
        self.criterion
    }

    /// Strictly ascending bucket starts.
    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn row_counts(&self) -> &FlaggedSeries<u64> {
        &self.row_counts
    }

    pub fn total_rows(&self) -> u64 {
        self.row_counts.values().iter().sum()
    }

    /// In schema order, without excluded columns and the date column.
    pub fn columns(&self) -> &[ColumnResult] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnResult> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn target(&self) -> Option<&TargetResult> {
        self.target.as_ref()
    }

    /// Rows that passed the filter but had no date.
    pub fn dropped_null_dates(&self) -> u64 {
        self.dropped_null_dates
    }
}
