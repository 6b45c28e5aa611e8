//! Descriptive statistics over sorted `f64` slices.
//!
//! Callers sort once with `sort_values` and reuse the slice, which also makes
//! every sum independent of the order values arrived in.

/// Sorts ascending with a total order.
pub fn sort_values(values: &mut [f64]) {
    values.sort_by(f64::total_cmp);
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (ddof = 0).
pub fn population_std(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// The `q` quantile of an ascending slice, interpolating linearly between the
/// two closest ranks.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Number of distinct values in an ascending slice.
pub fn distinct_sorted(sorted: &[f64]) -> usize {
    let mut count = 0;
    let mut previous: Option<f64> = None;
    for &v in sorted {
        if previous != Some(v) {
            count += 1;
            previous = Some(v);
        }
    }
    count
}
