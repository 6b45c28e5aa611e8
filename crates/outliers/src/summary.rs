use crate::detector::{detect_outliers, mean_and_std, sorted_points};
use configuration::{OutlierCriterion, OutlierSettings};
use serde::Serialize;
use statistics::descriptive::quantile;

/// Descriptive figures of one metric series, shown next to its flags.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SeriesSummary {
    /// Non-null points.
    pub points: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub range: Option<f64>,
    pub q1: Option<f64>,
    pub q3: Option<f64>,
    pub iqr: Option<f64>,
    /// Share of non-null points flagged under IQR, in percent.
    pub iqr_outlier_pct: Option<f64>,
    /// Share of non-null points flagged under Z-score, in percent.
    pub z_score_outlier_pct: Option<f64>,
}

pub fn summarize(series: &[Option<f64>], settings: &OutlierSettings) -> SeriesSummary {
    let points = sorted_points(series);
    if points.is_empty() {
        return SeriesSummary::default();
    }

    let min = points.first().copied();
    let max = points.last().copied();
    let q1 = quantile(&points, 0.25);
    let q3 = quantile(&points, 0.75);
    let spread = mean_and_std(&points);
    let share = |criterion| {
        let flagged = detect_outliers(series, criterion, settings).flagged();
        Some(flagged as f64 * 100.0 / points.len() as f64)
    };

    SeriesSummary {
        points: points.len(),
        mean: spread.map(|(mu, _)| mu),
        std: spread.map(|(_, sigma)| sigma),
        min,
        max,
        range: min.zip(max).map(|(lo, hi)| hi - lo),
        q1,
        q3,
        iqr: q1.zip(q3).map(|(lo, hi)| hi - lo),
        iqr_outlier_pct: share(OutlierCriterion::Iqr),
        z_score_outlier_pct: share(OutlierCriterion::ZScore),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_of_a_series_with_one_outlier() {
        let series: Vec<Option<f64>> = [1.0, 2.0, 3.0, 4.0, 100.0].into_iter().map(Some).collect();
        let summary = summarize(&series, &OutlierSettings::default());
        assert_eq!(summary.points, 5);
        assert_eq!(summary.mean, Some(22.0));
        assert_eq!(summary.range, Some(99.0));
        assert_eq!(summary.iqr, Some(2.0));
        assert_eq!(summary.iqr_outlier_pct, Some(20.0));
        // 100 sits just under two standard deviations from the mean.
        assert_eq!(summary.z_score_outlier_pct, Some(0.0));
    }

    #[test]
    fn repeated_fractions_have_zero_spread() {
        let settings = OutlierSettings {
            threshold_z_score: 0.5,
            ..OutlierSettings::default()
        };
        let summary = summarize(&[Some(0.1); 10], &settings);
        assert_eq!(summary.mean, Some(0.1));
        assert_eq!(summary.std, Some(0.0));
        assert_eq!(summary.range, Some(0.0));
        assert_eq!(summary.z_score_outlier_pct, Some(0.0));
        assert_eq!(summary.iqr_outlier_pct, Some(0.0));
    }

    #[test]
    fn empty_series() {
        assert_eq!(
            summarize(&[None, None], &OutlierSettings::default()),
            SeriesSummary::default()
        );
    }
}
