//! Windowed percentile-residual point selection
//!
//! Raw mean-maximal-power curves are dense and noisy: GPS dropouts and
//! sensor spikes produce samples well off the athlete's true capability.
//! Before fitting, the curve is thinned to a small set of representative
//! points - per time window, the samples whose power most exceeds what a
//! preliminary whole-curve fit predicts. A forced sprint point anchors the
//! short end and a fallback guarantees long-duration coverage.

use std::cmp::Ordering;

use tracing::trace;

use crate::model::predicted_power;
use crate::optimizer;
use crate::stats::{percentile, percentile_rank};

/// Selection is skipped entirely below this sample count
pub const MIN_SAMPLES: usize = 4;

/// Selected durations must reach past this, or the long-point fallback fires
const LONG_POINT_FLOOR_SECS: f64 = 600.0;

/// Upper bound of the fallback search range
const LONG_POINT_CEIL_SECS: f64 = 1800.0;

/// Outcome of a selection pass
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Indices into the input arrays, sorted by ascending duration
    pub indices: Vec<usize>,
    /// Percentile rank the force-included long point holds in the residual
    /// distribution; `None` when no forcing was needed
    pub forced_long_point: Option<f64>,
}

/// Fixed selection windows: 2-minute wide from 120s to 1800s, then
/// 15-minute wide from 1800s to 5400s. Half-open `[start, end)`.
fn windows() -> Vec<(f64, f64)> {
    let mut spans = Vec::new();
    let mut start = 120.0;
    while start < 1800.0 {
        spans.push((start, start + 120.0));
        start += 120.0;
    }
    let mut start = 1800.0;
    while start < 5400.0 {
        spans.push((start, start + 900.0));
        start += 900.0;
    }
    spans
}

/// Select a noise-robust subset of the curve for fitting.
///
/// Fits the model to the entire input to obtain residuals, thresholds them
/// at the given percentile, and keeps up to `values_per_window` of the
/// highest-residual samples per window. The sample closest to
/// `sprint_target` is always included. If nothing beyond 600s survives,
/// the highest-residual sample in (600, 1800] is forced in regardless of
/// the threshold, and the percentile rank it would have occupied is
/// reported for diagnostics.
///
/// Curves with fewer than [`MIN_SAMPLES`] samples short-circuit: every
/// index is returned as-is.
pub fn select_points(
    durations: &[f64],
    powers: &[f64],
    percentile_threshold: f64,
    values_per_window: usize,
    sprint_target: f64,
) -> Selection {
    let n = durations.len();
    debug_assert_eq!(n, powers.len());

    if n < MIN_SAMPLES {
        return Selection {
            indices: (0..n).collect(),
            forced_long_point: None,
        };
    }

    // Preliminary fit over the whole curve; selection keys off how far
    // each sample sits above its prediction.
    let params = optimizer::fit(durations, powers);
    let residuals: Vec<f64> = durations
        .iter()
        .zip(powers.iter())
        .map(|(&t, &p)| p - predicted_power(t, &params))
        .collect();

    let threshold = percentile(&residuals, percentile_threshold);
    trace!(
        percentile = percentile_threshold,
        threshold,
        "selection threshold"
    );

    let mut selected: Vec<usize> = Vec::new();

    for (start, end) in windows() {
        let mut members: Vec<usize> = (0..n)
            .filter(|&i| durations[i] >= start && durations[i] < end)
            .collect();
        members.sort_by(|&a, &b| {
            residuals[b]
                .partial_cmp(&residuals[a])
                .unwrap_or(Ordering::Equal)
        });

        let mut accepted = 0;
        for i in members {
            if accepted >= values_per_window {
                break;
            }
            if residuals[i] < threshold {
                break;
            }
            if !selected.contains(&i) {
                selected.push(i);
                accepted += 1;
            }
        }
    }

    // Sprint anchor: the sample nearest the target duration, threshold or not.
    let mut sprint_index = 0;
    let mut sprint_distance = f64::INFINITY;
    for (i, &t) in durations.iter().enumerate() {
        let distance = (t - sprint_target).abs();
        if distance < sprint_distance {
            sprint_distance = distance;
            sprint_index = i;
        }
    }
    if !selected.contains(&sprint_index) {
        selected.push(sprint_index);
    }

    // Fallback: without a long point the fit has nothing pinning CP down,
    // so pull in the best candidate from the 600-1800s range.
    let mut forced_long_point = None;
    if !selected.iter().any(|&i| durations[i] > LONG_POINT_FLOOR_SECS) {
        let candidate = (0..n)
            .filter(|&i| {
                durations[i] > LONG_POINT_FLOOR_SECS
                    && durations[i] <= LONG_POINT_CEIL_SECS
                    && !selected.contains(&i)
            })
            .max_by(|&a, &b| {
                residuals[a]
                    .partial_cmp(&residuals[b])
                    .unwrap_or(Ordering::Equal)
            });

        if let Some(i) = candidate {
            forced_long_point = Some(percentile_rank(&residuals, residuals[i]));
            selected.push(i);
        }
    }

    selected.sort_by(|&a, &b| {
        durations[a]
            .partial_cmp(&durations[b])
            .unwrap_or(Ordering::Equal)
    });

    Selection {
        indices: selected,
        forced_long_point,
    }
}
