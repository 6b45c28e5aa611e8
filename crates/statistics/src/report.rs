use core_types::{Bucket, ColumnCategory, DataType, Metric, MetricValue};
use serde::Serialize;

/// One metric of one column across all buckets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSeries {
    pub metric: Metric,
    /// Aligned with `StatisticsReport::buckets`; `None` where undefined.
    pub values: Vec<Option<MetricValue>>,
}

impl MetricSeries {
    /// Numeric view of the series, timestamps as epoch seconds.
    pub fn as_f64(&self) -> Vec<Option<f64>> {
        self.values
            .iter()
            .map(|v| v.as_ref().map(MetricValue::as_f64))
            .collect()
    }
}

/// All metric series of one column, in canonical metric order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStatistics {
    pub name: String,
    pub data_type: DataType,
    pub category: ColumnCategory,
    /// Set when values contradicted the declared type; only the count
    /// metrics are reported then.
    pub mixed: bool,
    pub metrics: Vec<MetricSeries>,
}

impl ColumnStatistics {
    pub fn metric(&self, metric: Metric) -> Option<&MetricSeries> {
        self.metrics.iter().find(|s| s.metric == metric)
    }
}

/// The mean of the target column per bucket and over all rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetAverage {
    pub column: String,
    pub values: Vec<Option<f64>>,
    pub overall: Option<f64>,
}

/// The output of `StatisticsEngine::finish`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsReport {
    /// Ascending bucket starts.
    pub buckets: Vec<Bucket>,
    /// Rows per bucket.
    pub row_counts: Vec<u64>,
    /// In schema order.
    pub columns: Vec<ColumnStatistics>,
    pub target: Option<TargetAverage>,
}

impl StatisticsReport {
    pub fn column(&self, name: &str) -> Option<&ColumnStatistics> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn total_rows(&self) -> u64 {
        self.row_counts.iter().sum()
    }
}
