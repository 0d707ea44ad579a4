//! Small statistics helpers shared by the optimizer and point selector.

use std::cmp::Ordering;

/// Linear-interpolation percentile over `values` (numpy convention).
///
/// Index `h = (n-1) * p/100`, interpolating between `floor(h)` and
/// `ceil(h)`. The convention matters: point selection thresholds on this
/// value, so a nearest-rank percentile would select different points and
/// change the fit.
///
/// Panics on an empty slice; callers guarantee at least one value.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    assert!(!values.is_empty(), "percentile of empty slice");
    debug_assert!((0.0..=100.0).contains(&p));

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let h = (sorted.len() - 1) as f64 * p / 100.0;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

/// Percentile rank of `x` within `values`: the share of values at or
/// below `x`, as a percentage. Used to report where a force-included
/// point would have landed in the residual distribution.
pub fn percentile_rank(values: &[f64], x: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let at_or_below = values.iter().filter(|&&v| v <= x).count();
    at_or_below as f64 / values.len() as f64 * 100.0
}

/// Root mean squared error over a residual set.
pub fn rmse(residuals: &[f64]) -> f64 {
    if residuals.is_empty() {
        return 0.0;
    }
    let mean_sq = residuals.iter().map(|r| r * r).sum::<f64>() / residuals.len() as f64;
    mean_sq.sqrt()
}

/// Mean absolute error over a residual set.
pub fn mae(residuals: &[f64]) -> f64 {
    if residuals.is_empty() {
        return 0.0;
    }
    residuals.iter().map(|r| r.abs()).sum::<f64>() / residuals.len() as f64
}
