use crate::accumulator::ColumnAccumulator;
use crate::error::StatisticsError;
use crate::report::{ColumnStatistics, MetricSeries, StatisticsReport, TargetAverage};
use crate::target::TargetAccumulator;
use configuration::{BucketPolicy, DistinctCount, DEFAULT_TARGET_COLUMN};
use core_types::frame::series_values;
use core_types::{Bucket, ColumnCategory, DataType, Metric, Schema, TimeInterval, Value};
use polars::prelude::DataFrame;
use std::collections::BTreeMap;

/// Upper bound on buckets produced by continuous gap filling.
pub const MAX_BUCKETS: usize = 1_000_000;

#[derive(Debug, Clone)]
struct TrackedColumn {
    name: String,
    data_type: DataType,
    mixed: bool,
}

#[derive(Debug, Clone)]
struct BucketState {
    rows: u64,
    columns: Vec<ColumnAccumulator>,
    target: TargetAccumulator,
}

impl BucketState {
    fn merge(&mut self, other: BucketState) {
        self.rows += other.rows;
        for (mine, theirs) in self.columns.iter_mut().zip(other.columns) {
            mine.merge(theirs);
        }
        self.target.merge(other.target);
    }
}

/// Folds bucketed row groups into per-bucket, per-column statistics.
///
/// Every call to `fold` builds partial accumulators for its row groups and
/// merges them into the running state, so feeding the data as one frame or
/// as many chunks gives identical results.
#[derive(Debug)]
pub struct StatisticsEngine {
    columns: Vec<TrackedColumn>,
    target: Option<String>,
    distinct: DistinctCount,
    buckets: BTreeMap<Bucket, BucketState>,
}

impl StatisticsEngine {
    /// `schema` lists the columns to describe; `target` must already be
    /// resolved (see `resolve_target`).
    pub fn new(schema: &Schema, target: Option<String>, distinct: DistinctCount) -> Self {
        let columns = schema
            .fields()
            .iter()
            .map(|f| TrackedColumn {
                name: f.name.clone(),
                data_type: f.data_type,
                mixed: false,
            })
            .collect();
        Self {
            columns,
            target,
            distinct,
            buckets: BTreeMap::new(),
        }
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Merges the row groups of one chunk into the running state.
    pub fn fold(&mut self, groups: &[(Bucket, DataFrame)]) -> Result<(), StatisticsError> {
        for (bucket, frame) in groups {
            let partial = self.partial(frame)?;

            for (column, acc) in self.columns.iter_mut().zip(&partial.columns) {
                if acc.is_mixed() && !column.mixed {
                    column.mixed = true;
                    tracing::warn!(
                        column = %column.name,
                        data_type = %column.data_type,
                        "Column holds values of another type; only count metrics are reported"
                    );
                }
            }

            match self.buckets.get_mut(bucket) {
                Some(state) => state.merge(partial),
                None => {
                    self.buckets.insert(*bucket, partial);
                }
            }
        }
        Ok(())
    }

    fn partial(&self, frame: &DataFrame) -> Result<BucketState, StatisticsError> {
        let mut columns = Vec::with_capacity(self.columns.len());
        for tracked in &self.columns {
            let values = column_values(frame, &tracked.name)?;
            let mut acc = ColumnAccumulator::new(tracked.data_type, self.distinct);
            if tracked.mixed {
                acc.mark_mixed();
            }
            acc.update(&values);
            columns.push(acc);
        }

        let mut target = TargetAccumulator::default();
        if let Some(name) = &self.target {
            target.update(&column_values(frame, name)?);
        }

        Ok(BucketState {
            rows: frame.height() as u64,
            columns,
            target,
        })
    }

    /// The metrics reported for a column, after the run-wide policies.
    fn reported_metrics(&self, column: &TrackedColumn) -> Vec<Metric> {
        let category = column.data_type.category();
        category
            .metrics()
            .iter()
            .copied()
            .filter(|m| {
                if column.mixed {
                    return matches!(m, Metric::Count | Metric::NullCount | Metric::NullRatio);
                }
                !(category == ColumnCategory::Text
                    && self.distinct == DistinctCount::Approximate
                    && *m == Metric::ModeFrequency)
            })
            .collect()
    }

    /// Finalizes every bucket into metric series.
    ///
    /// With `BucketPolicy::Continuous`, intervals between the first and last
    /// observed bucket that saw no rows are reported with a row count of zero
    /// and null metrics.
    pub fn finish(
        self,
        policy: BucketPolicy,
        interval: TimeInterval,
    ) -> Result<StatisticsReport, StatisticsError> {
        let buckets = bucket_range(&self.buckets, policy, interval)?;

        let metric_sets: Vec<Vec<Metric>> = self
            .columns
            .iter()
            .map(|c| self.reported_metrics(c))
            .collect();
        let mut columns: Vec<ColumnStatistics> = self
            .columns
            .iter()
            .zip(&metric_sets)
            .map(|(c, metrics)| ColumnStatistics {
                name: c.name.clone(),
                data_type: c.data_type,
                category: c.data_type.category(),
                mixed: c.mixed,
                metrics: metrics
                    .iter()
                    .map(|m| MetricSeries {
                        metric: *m,
                        values: Vec::with_capacity(buckets.len()),
                    })
                    .collect(),
            })
            .collect();

        let mut row_counts = Vec::with_capacity(buckets.len());
        let mut target_values = Vec::with_capacity(buckets.len());
        let mut all_target = TargetAccumulator::default();

        let mut states = self.buckets;
        for bucket in &buckets {
            let state = match states.remove(bucket) {
                Some(state) => state,
                None => BucketState {
                    rows: 0,
                    columns: self
                        .columns
                        .iter()
                        .map(|c| ColumnAccumulator::new(c.data_type, self.distinct))
                        .collect(),
                    target: TargetAccumulator::default(),
                },
            };
            row_counts.push(state.rows);

            for ((column, acc), metrics) in columns.iter_mut().zip(state.columns).zip(&metric_sets) {
                for (series, value) in column.metrics.iter_mut().zip(acc.finish(metrics)) {
                    series.values.push(value);
                }
            }

            let mut target = state.target;
            target_values.push(target.mean());
            all_target.merge(target);
        }

        let target = self.target.map(|column| TargetAverage {
            column,
            values: target_values,
            overall: all_target.mean(),
        });

        tracing::info!(
            buckets = buckets.len(),
            columns = columns.len(),
            rows = row_counts.iter().sum::<u64>(),
            "Statistics computed"
        );

        Ok(StatisticsReport {
            buckets,
            row_counts,
            columns,
            target,
        })
    }
}

/// Describes already bucketed row groups in a single fold.
pub fn compute_statistics(
    groups: &[(Bucket, DataFrame)],
    schema: &Schema,
    target: Option<String>,
    distinct: DistinctCount,
    policy: BucketPolicy,
    interval: TimeInterval,
) -> Result<StatisticsReport, StatisticsError> {
    let mut engine = StatisticsEngine::new(schema, target, distinct);
    engine.fold(groups)?;
    engine.finish(policy, interval)
}

fn bucket_range(
    observed: &BTreeMap<Bucket, BucketState>,
    policy: BucketPolicy,
    interval: TimeInterval,
) -> Result<Vec<Bucket>, StatisticsError> {
    let (Some(first), Some(last)) = (observed.keys().next(), observed.keys().next_back()) else {
        return Ok(Vec::new());
    };
    if policy == BucketPolicy::Sparse {
        return Ok(observed.keys().copied().collect());
    }

    let mut buckets = vec![*first];
    let mut current = *first;
    while current < *last {
        current = interval.next(current)?;
        buckets.push(current);
        if buckets.len() > MAX_BUCKETS {
            return Err(StatisticsError::TooManyBuckets { limit: MAX_BUCKETS });
        }
    }
    Ok(buckets)
}

fn column_values(frame: &DataFrame, name: &str) -> Result<Vec<Value>, StatisticsError> {
    let series = frame
        .column(name)
        .map_err(|_| StatisticsError::MissingColumn(name.to_string()))?;
    Ok(series_values(series)?)
}

/// Picks the target column: the configured one if present, otherwise the
/// reserved default name. Columns that are neither numeric nor boolean are
/// not averaged.
pub fn resolve_target(requested: Option<&str>, schema: &Schema) -> Option<String> {
    let name = requested
        .into_iter()
        .chain(std::iter::once(DEFAULT_TARGET_COLUMN))
        .find(|name| schema.contains(name));

    let Some(name) = name else {
        if let Some(requested) = requested {
            tracing::warn!(column = requested, "Target column not found, no target average");
        }
        return None;
    };
    if requested.is_some_and(|r| r != name) {
        tracing::warn!(
            requested = requested.unwrap_or_default(),
            fallback = name,
            "Configured target column not found, using the default name"
        );
    }

    match schema.get(name) {
        Some(data_type) if data_type.is_numeric() || data_type == DataType::Boolean => {
            Some(name.to_string())
        }
        Some(data_type) => {
            tracing::warn!(
                column = name,
                data_type = %data_type,
                "Target column is neither numeric nor boolean, no target average"
            );
            None
        }
        None => None,
    }
}
