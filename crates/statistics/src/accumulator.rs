//! Per-bucket, per-column accumulators.
//!
//! An accumulator is built from the rows of one chunk and merged into the
//! running state for its bucket. Merging is associative and commutative, and
//! finishing sorts retained values first, so the metrics do not depend on
//! how the input was chunked.

use crate::descriptive::{distinct_sorted, mean, population_std, quantile, sort_values};
use crate::sketch::HyperLogLog;
use chrono::NaiveDateTime;
use configuration::DistinctCount;
use core_types::{ColumnCategory, DataType, Metric, MetricValue, Value};
use rustc_hash::FxHashMap;

/// Distinct text values, either exact frequencies or a sketch.
#[derive(Debug, Clone)]
pub enum DistinctValues {
    Exact(FxHashMap<String, u64>),
    Approximate(HyperLogLog),
}

impl DistinctValues {
    pub fn new(mode: DistinctCount) -> Self {
        match mode {
            DistinctCount::Exact => DistinctValues::Exact(FxHashMap::default()),
            DistinctCount::Approximate => DistinctValues::Approximate(HyperLogLog::default()),
        }
    }

    pub fn insert(&mut self, value: &str) {
        match self {
            DistinctValues::Exact(frequencies) => {
                if let Some(n) = frequencies.get_mut(value) {
                    *n += 1;
                } else {
                    frequencies.insert(value.to_string(), 1);
                }
            }
            DistinctValues::Approximate(sketch) => sketch.insert(value),
        }
    }

    pub fn merge(&mut self, other: DistinctValues) {
        match other {
            DistinctValues::Exact(theirs) => match self {
                DistinctValues::Exact(mine) => {
                    for (value, n) in theirs {
                        *mine.entry(value).or_insert(0) += n;
                    }
                }
                DistinctValues::Approximate(sketch) => {
                    for value in theirs.keys() {
                        sketch.insert(value);
                    }
                }
            },
            DistinctValues::Approximate(mut theirs) => {
                if let DistinctValues::Exact(mine) = self {
                    for value in mine.keys() {
                        theirs.insert(value);
                    }
                    *self = DistinctValues::Approximate(theirs);
                } else if let DistinctValues::Approximate(mine) = self {
                    mine.merge(&theirs);
                }
            }
        }
    }

    pub fn unique_count(&self) -> f64 {
        match self {
            DistinctValues::Exact(frequencies) => frequencies.len() as f64,
            DistinctValues::Approximate(sketch) => sketch.estimate().round(),
        }
    }

    /// Frequency of the most common value; unknown for a sketch.
    pub fn mode_frequency(&self) -> Option<f64> {
        match self {
            DistinctValues::Exact(frequencies) => frequencies.values().max().map(|&n| n as f64),
            DistinctValues::Approximate(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
enum State {
    Numeric(Vec<f64>),
    Text(DistinctValues),
    Boolean { true_count: u64 },
    Temporal {
        min: Option<NaiveDateTime>,
        max: Option<NaiveDateTime>,
    },
}

/// The running state of one column within one bucket.
#[derive(Debug, Clone)]
pub struct ColumnAccumulator {
    count: u64,
    null_count: u64,
    /// Set once a value contradicts the declared type.
    mixed: bool,
    state: State,
}

impl ColumnAccumulator {
    pub fn new(data_type: DataType, distinct: DistinctCount) -> Self {
        let state = match data_type.category() {
            ColumnCategory::Numeric => State::Numeric(Vec::new()),
            ColumnCategory::Text => State::Text(DistinctValues::new(distinct)),
            ColumnCategory::Boolean => State::Boolean { true_count: 0 },
            ColumnCategory::Temporal => State::Temporal { min: None, max: None },
        };
        Self {
            count: 0,
            null_count: 0,
            mixed: false,
            state,
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn null_count(&self) -> u64 {
        self.null_count
    }

    /// Whether any value contradicted the column's declared type.
    pub fn is_mixed(&self) -> bool {
        self.mixed
    }

    pub fn update(&mut self, values: &[Value]) {
        for value in values {
            self.push(value);
        }
    }

    fn push(&mut self, value: &Value) {
        if value.is_null() || matches!(value, Value::Float(v) if v.is_nan()) {
            self.null_count += 1;
            return;
        }
        self.count += 1;

        let accepted = match (&mut self.state, value) {
            (State::Numeric(values), Value::Int(v)) => {
                values.push(*v as f64);
                true
            }
            (State::Numeric(values), Value::Float(v)) => {
                values.push(*v);
                true
            }
            (State::Text(distinct), Value::Text(v)) => {
                distinct.insert(v);
                true
            }
            (State::Text(distinct), other) => {
                distinct.insert(&other.to_string());
                true
            }
            (State::Boolean { true_count }, Value::Bool(v)) => {
                *true_count += u64::from(*v);
                true
            }
            (State::Temporal { min, max }, Value::Date(_) | Value::DateTime(_)) => {
                if let Some(ts) = value.as_timestamp() {
                    *min = Some(min.map_or(ts, |m| m.min(ts)));
                    *max = Some(max.map_or(ts, |m| m.max(ts)));
                }
                true
            }
            _ => false,
        };

        if !accepted {
            self.mark_mixed();
        }
    }

    /// Drops the type-specific state; only counts stay meaningful.
    pub fn mark_mixed(&mut self) {
        self.mixed = true;
        if let State::Numeric(values) = &mut self.state {
            values.clear();
            values.shrink_to_fit();
        }
    }

    pub fn merge(&mut self, other: ColumnAccumulator) {
        self.count += other.count;
        self.null_count += other.null_count;
        if other.mixed && !self.mixed {
            self.mark_mixed();
        }

        let mixed = self.mixed;
        let compatible = match (&mut self.state, other.state) {
            (State::Numeric(mine), State::Numeric(theirs)) => {
                if !mixed {
                    mine.extend(theirs);
                }
                true
            }
            (State::Text(mine), State::Text(theirs)) => {
                mine.merge(theirs);
                true
            }
            (State::Boolean { true_count }, State::Boolean { true_count: theirs }) => {
                *true_count += theirs;
                true
            }
            (State::Temporal { min, max }, State::Temporal { min: other_min, max: other_max }) => {
                *min = [*min, other_min].into_iter().flatten().min();
                *max = [*max, other_max].into_iter().flatten().max();
                true
            }
            _ => false,
        };
        if !compatible {
            self.mark_mixed();
        }
    }

    /// Finalizes the requested metrics, in the order given.
    ///
    /// A bucket without any rows yields `None` for every metric.
    pub fn finish(self, metrics: &[Metric]) -> Vec<Option<MetricValue>> {
        let rows = self.count + self.null_count;
        if rows == 0 {
            return vec![None; metrics.len()];
        }

        let mut sorted = match self.state {
            State::Numeric(ref values) if !self.mixed => values.clone(),
            _ => Vec::new(),
        };
        sort_values(&mut sorted);

        metrics
            .iter()
            .map(|metric| self.metric(*metric, rows, &sorted))
            .collect()
    }

    fn metric(&self, metric: Metric, rows: u64, sorted: &[f64]) -> Option<MetricValue> {
        let number = |v: f64| Some(MetricValue::Number(v));
        match metric {
            Metric::Count => number(self.count as f64),
            Metric::NullCount => number(self.null_count as f64),
            Metric::NullRatio => number(self.null_count as f64 / rows as f64),
            _ if self.mixed => None,
            _ => match &self.state {
                State::Numeric(_) => match metric {
                    Metric::UniqueCount => number(distinct_sorted(sorted) as f64),
                    Metric::Mean => mean(sorted).map(MetricValue::Number),
                    Metric::Std => population_std(sorted).map(MetricValue::Number),
                    Metric::Min => sorted.first().copied().map(MetricValue::Number),
                    Metric::Max => sorted.last().copied().map(MetricValue::Number),
                    Metric::P25 | Metric::Median | Metric::P75 => metric
                        .quantile()
                        .and_then(|q| quantile(sorted, q))
                        .map(MetricValue::Number),
                    _ => None,
                },
                State::Text(distinct) => match metric {
                    Metric::UniqueCount => number(distinct.unique_count()),
                    Metric::ModeFrequency => distinct.mode_frequency().map(MetricValue::Number),
                    _ => None,
                },
                State::Boolean { true_count } => match metric {
                    Metric::Mean if self.count > 0 => {
                        number(*true_count as f64 / self.count as f64)
                    }
                    _ => None,
                },
                State::Temporal { min, max } => match metric {
                    Metric::Min => min.map(MetricValue::Timestamp),
                    Metric::Max => max.map(MetricValue::Timestamp),
                    _ => None,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric(values: &[Value]) -> ColumnAccumulator {
        let mut acc = ColumnAccumulator::new(DataType::Float, DistinctCount::Exact);
        acc.update(values);
        acc
    }

    fn number(v: f64) -> Option<MetricValue> {
        Some(MetricValue::Number(v))
    }

    #[test]
    fn numeric_metrics() {
        let acc = numeric(&[
            Value::Int(4),
            Value::Float(1.0),
            Value::Null,
            Value::Float(f64::NAN),
            Value::Int(3),
            Value::Int(2),
        ]);
        let metrics = ColumnCategory::Numeric.metrics();
        let values = acc.finish(metrics);
        let get = |m: Metric| values[metrics.iter().position(|x| *x == m).unwrap()];

        assert_eq!(get(Metric::Count), number(4.0));
        assert_eq!(get(Metric::NullCount), number(2.0));
        assert_eq!(get(Metric::NullRatio), number(2.0 / 6.0));
        assert_eq!(get(Metric::UniqueCount), number(4.0));
        assert_eq!(get(Metric::Mean), number(2.5));
        assert_eq!(get(Metric::Min), number(1.0));
        assert_eq!(get(Metric::Max), number(4.0));
        assert_eq!(get(Metric::Median), number(2.5));
        assert_eq!(get(Metric::P25), number(1.75));
    }

    #[test]
    fn merge_matches_a_single_pass() {
        let values: Vec<Value> = (0..20).map(|i| Value::Float(f64::from(i) * 0.1)).collect();
        let whole = numeric(&values).finish(ColumnCategory::Numeric.metrics());

        let mut left = numeric(&values[12..]);
        left.merge(numeric(&values[..12]));
        assert_eq!(left.finish(ColumnCategory::Numeric.metrics()), whole);
    }

    #[test]
    fn text_mode_frequency_and_sketch() {
        let values: Vec<Value> = ["a", "b", "a", "c", "a"]
            .iter()
            .map(|s| Value::Text(s.to_string()))
            .collect();

        let mut exact = ColumnAccumulator::new(DataType::Text, DistinctCount::Exact);
        exact.update(&values);
        assert_eq!(
            exact.finish(&[Metric::UniqueCount, Metric::ModeFrequency]),
            vec![number(3.0), number(3.0)]
        );

        let mut approximate = ColumnAccumulator::new(DataType::Text, DistinctCount::Approximate);
        approximate.update(&values);
        assert_eq!(
            approximate.finish(&[Metric::UniqueCount, Metric::ModeFrequency]),
            vec![number(3.0), None]
        );
    }

    #[test]
    fn boolean_mean_is_the_true_share() {
        let mut acc = ColumnAccumulator::new(DataType::Boolean, DistinctCount::Exact);
        acc.update(&[Value::Bool(true), Value::Bool(false), Value::Bool(false), Value::Null]);
        assert_eq!(acc.finish(&[Metric::Mean]), vec![number(1.0 / 3.0)]);
    }

    #[test]
    fn temporal_min_and_max() {
        let day = |d: u32| chrono::NaiveDate::from_ymd_opt(2024, 2, d).unwrap();
        let mut acc = ColumnAccumulator::new(DataType::Date, DistinctCount::Exact);
        acc.update(&[Value::Date(day(9)), Value::Date(day(3)), Value::Date(day(5))]);
        let midnight = |d: u32| day(d).and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(
            acc.finish(&[Metric::Min, Metric::Max]),
            vec![
                Some(MetricValue::Timestamp(midnight(3))),
                Some(MetricValue::Timestamp(midnight(9)))
            ]
        );
    }

    #[test]
    fn contradicting_values_mark_the_column_mixed() {
        let acc = numeric(&[Value::Int(1), Value::Text("n/a".into()), Value::Null]);
        assert!(acc.is_mixed());
        assert_eq!(
            acc.finish(&[Metric::Count, Metric::NullCount, Metric::Mean]),
            vec![number(2.0), number(1.0), None]
        );
    }

    #[test]
    fn empty_bucket_is_all_null() {
        let acc = ColumnAccumulator::new(DataType::Integer, DistinctCount::Exact);
        assert!(acc
            .finish(ColumnCategory::Numeric.metrics())
            .iter()
            .all(Option::is_none));
    }
}
