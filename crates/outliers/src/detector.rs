use configuration::{OutlierCriterion, OutlierSettings};
use serde::Serialize;
use statistics::descriptive::{mean, population_std, quantile, sort_values};

/// Series with fewer non-null points are never flagged.
pub const MIN_POINTS: usize = 4;

/// The series-wide interval outside of which a point is an outlier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutlierBounds {
    pub lower: f64,
    pub upper: f64,
}

impl OutlierBounds {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Outlier flags for one series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierFlags {
    pub criterion: OutlierCriterion,
    /// One flag per bucket; null points are never flagged.
    pub flags: Vec<bool>,
    /// `None` when the series has too few points to judge.
    pub bounds: Option<OutlierBounds>,
}

impl OutlierFlags {
    pub fn flagged(&self) -> usize {
        self.flags.iter().filter(|f| **f).count()
    }
}

/// Non-null, finite points of a series, sorted ascending.
pub(crate) fn sorted_points(series: &[Option<f64>]) -> Vec<f64> {
    let mut points: Vec<f64> = series
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .collect();
    sort_values(&mut points);
    points
}

/// Mean and population standard deviation of sorted points.
///
/// A series whose points are all equal has a spread of exactly zero; summing
/// values such as `0.1` would otherwise leave rounding noise in σ.
pub(crate) fn mean_and_std(points: &[f64]) -> Option<(f64, f64)> {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) if first == last => Some((*first, 0.0)),
        _ => mean(points).zip(population_std(points)),
    }
}

/// Classifies every point of `series` under `criterion`.
pub fn detect_outliers(
    series: &[Option<f64>],
    criterion: OutlierCriterion,
    settings: &OutlierSettings,
) -> OutlierFlags {
    let points = sorted_points(series);
    let unflagged = |bounds| OutlierFlags {
        criterion,
        flags: vec![false; series.len()],
        bounds,
    };
    if points.len() < MIN_POINTS {
        return unflagged(None);
    }

    match criterion {
        OutlierCriterion::Iqr => {
            let (Some(q1), Some(q3)) = (quantile(&points, 0.25), quantile(&points, 0.75)) else {
                return unflagged(None);
            };
            let spread = settings.multiplier_iqr * (q3 - q1);
            let bounds = OutlierBounds {
                lower: q1 - spread,
                upper: q3 + spread,
            };
            OutlierFlags {
                criterion,
                flags: series
                    .iter()
                    .map(|v| v.is_some_and(|v| v.is_finite() && !bounds.contains(v)))
                    .collect(),
                bounds: Some(bounds),
            }
        }
        OutlierCriterion::ZScore => {
            let Some((mu, sigma)) = mean_and_std(&points) else {
                return unflagged(None);
            };
            let threshold = settings.threshold_z_score;
            let bounds = OutlierBounds {
                lower: mu - threshold * sigma,
                upper: mu + threshold * sigma,
            };
            if sigma == 0.0 {
                return unflagged(Some(bounds));
            }
            OutlierFlags {
                criterion,
                flags: series
                    .iter()
                    .map(|v| v.is_some_and(|v| v.is_finite() && ((v - mu) / sigma).abs() > threshold))
                    .collect(),
                bounds: Some(bounds),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn iqr_flags_points_strictly_outside_the_fences() {
        let flags = detect_outliers(
            &series(&[1.0, 2.0, 3.0, 4.0, 100.0]),
            OutlierCriterion::Iqr,
            &OutlierSettings::default(),
        );
        assert_eq!(
            flags.bounds,
            Some(OutlierBounds {
                lower: -1.0,
                upper: 7.0
            })
        );
        assert_eq!(flags.flags, vec![false, false, false, false, true]);
    }

    #[test]
    fn points_on_the_fence_are_not_flagged() {
        // Q1 = 2, Q3 = 4, fences at -1 and 7.
        let flags = detect_outliers(
            &series(&[1.0, 2.0, 3.0, 4.0, 7.0]),
            OutlierCriterion::Iqr,
            &OutlierSettings::default(),
        );
        assert_eq!(flags.flagged(), 0);
    }

    #[test]
    fn constant_series_has_no_z_score_outliers() {
        let flags = detect_outliers(
            &series(&[5.0; 10]),
            OutlierCriterion::ZScore,
            &OutlierSettings::default(),
        );
        assert_eq!(flags.flagged(), 0);
        assert_eq!(
            flags.bounds,
            Some(OutlierBounds {
                lower: 5.0,
                upper: 5.0
            })
        );
    }

    #[test]
    fn repeated_fractions_have_no_z_score_outliers() {
        let settings = OutlierSettings {
            threshold_z_score: 0.5,
            ..OutlierSettings::default()
        };
        let flags = detect_outliers(&series(&[0.1; 10]), OutlierCriterion::ZScore, &settings);
        assert_eq!(flags.flags, vec![false; 10]);
        assert_eq!(
            flags.bounds,
            Some(OutlierBounds {
                lower: 0.1,
                upper: 0.1
            })
        );
    }

    #[test]
    fn z_score_flags_distant_points() {
        let mut values = vec![10.0; 20];
        values.push(1000.0);
        let settings = OutlierSettings::default();
        let flags = detect_outliers(&series(&values), OutlierCriterion::ZScore, &settings);
        assert_eq!(flags.flagged(), 1);
        assert!(flags.flags[20]);
    }

    #[test]
    fn three_points_are_never_flagged() {
        for criterion in [OutlierCriterion::Iqr, OutlierCriterion::ZScore] {
            let flags = detect_outliers(
                &[Some(1.0), None, Some(2.0), Some(1e9)],
                criterion,
                &OutlierSettings::default(),
            );
            assert_eq!(flags.flags, vec![false; 4]);
            assert_eq!(flags.bounds, None);
        }
    }

    #[test]
    fn nulls_are_skipped_and_never_flagged() {
        let flags = detect_outliers(
            &[Some(1.0), None, Some(2.0), Some(3.0), Some(4.0), Some(100.0), None],
            OutlierCriterion::Iqr,
            &OutlierSettings::default(),
        );
        assert_eq!(
            flags.flags,
            vec![false, false, false, false, false, true, false]
        );
    }
}
