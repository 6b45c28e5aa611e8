use crate::error::EvaluationError;
use crate::result::{ColumnResult, EvaluationResult, FlaggedSeries, MetricResult, TargetResult};
use configuration::OutlierSettings;
use core_types::{Bucket, TimeInterval};
use outliers::{detect_outliers, summarize};
use statistics::StatisticsReport;

/// Run-level facts the statistics report does not carry.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub date_column: String,
    pub interval: TimeInterval,
    pub outliers: OutlierSettings,
    pub dropped_null_dates: u64,
}

/// Flags every series of `report` and freezes everything into an
/// `EvaluationResult`.
///
/// Fails if the buckets are not strictly ascending or any series is not
/// aligned with them.
pub fn assemble(
    report: StatisticsReport,
    context: RunContext,
) -> Result<EvaluationResult, EvaluationError> {
    check_buckets(&report.buckets)?;
    let expected = report.buckets.len();
    let settings = context.outliers;
    let flag = |numeric: &[Option<f64>]| {
        (
            detect_outliers(numeric, settings.criterion, &settings),
            summarize(numeric, &settings),
        )
    };

    check_len("row counts", report.row_counts.len(), expected)?;
    let numeric: Vec<Option<f64>> = report.row_counts.iter().map(|n| Some(*n as f64)).collect();
    let (flags, summary) = flag(&numeric);
    let row_counts = FlaggedSeries::new(report.row_counts, flags, summary);

    let mut columns = Vec::with_capacity(report.columns.len());
    for column in report.columns {
        let mut metrics = Vec::with_capacity(column.metrics.len());
        for series in column.metrics {
            check_len(
                &format!("{} of `{}`", series.metric, column.name),
                series.values.len(),
                expected,
            )?;
            let (flags, summary) = flag(&series.as_f64());
            metrics.push(MetricResult::new(
                series.metric,
                FlaggedSeries::new(series.values, flags, summary),
            ));
        }
        columns.push(ColumnResult::new(column.name, column.data_type, metrics));
    }

    let target = match report.target {
        Some(target) => {
            check_len("target average", target.values.len(), expected)?;
            let (flags, summary) = flag(&target.values);
            Some(TargetResult::new(
                target.column,
                FlaggedSeries::new(target.values, flags, summary),
                target.overall,
            ))
        }
        None => None,
    };

    Ok(EvaluationResult::new(
        context.date_column,
        context.interval,
        settings.criterion,
        report.buckets,
        row_counts,
        columns,
        target,
        context.dropped_null_dates,
    ))
}

fn check_buckets(buckets: &[Bucket]) -> Result<(), EvaluationError> {
    match buckets.windows(2).find(|pair| pair[0] >= pair[1]) {
        Some(pair) => Err(EvaluationError::Inconsistent(format!(
            "bucket {} is followed by {}",
            pair[0], pair[1]
        ))),
        None => Ok(()),
    }
}

fn check_len(series: &str, actual: usize, expected: usize) -> Result<(), EvaluationError> {
    if actual == expected {
        Ok(())
    } else {
        Err(EvaluationError::Inconsistent(format!(
            "{series} has {actual} values for {expected} buckets"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use chrono::NaiveDate;

    fn bucket(d: u32) -> Bucket {
        Bucket(
            NaiveDate::from_ymd_opt(2024, 1, d)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        )
    }

    fn context() -> RunContext {
        RunContext {
            date_column: "date_column".to_string(),
            interval: TimeInterval::default(),
            outliers: OutlierSettings::default(),
            dropped_null_dates: 0,
        }
    }

    fn report(buckets: Vec<Bucket>, row_counts: Vec<u64>) -> StatisticsReport {
        StatisticsReport {
            buckets,
            row_counts,
            columns: Vec::new(),
            target: None,
        }
    }

    #[test]
    fn row_counts_are_flagged() {
        let buckets = (1..=5).map(bucket).collect();
        let result = assemble(report(buckets, vec![1, 2, 3, 4, 100]), context()).unwrap();
        assert_eq!(
            result.row_counts().outliers().flags,
            vec![false, false, false, false, true]
        );
        assert_eq!(result.total_rows(), 110);
    }

    #[test]
    fn misaligned_series_is_a_compute_error() {
        let err = assemble(report(vec![bucket(1), bucket(2)], vec![1]), context()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Compute);
    }

    #[test]
    fn unordered_buckets_are_rejected() {
        let err = assemble(report(vec![bucket(2), bucket(1)], vec![1, 1]), context()).unwrap_err();
        assert!(matches!(err, EvaluationError::Inconsistent(_)));
    }
}
