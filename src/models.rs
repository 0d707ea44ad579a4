//! Core data types shared across the omniPD engine

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Curve construction errors
#[derive(Debug, Error)]
pub enum CurveError {
    #[error("Mismatched curve arrays: {durations} durations vs {powers} powers")]
    MismatchedLengths { durations: usize, powers: usize },
    #[error("Curve contains no samples")]
    Empty,
    #[error("Invalid sample at index {index}: {reason}")]
    InvalidSample { index: usize, reason: String },
}

/// A mean-maximal-power curve: for each duration, the best average power
/// the athlete sustained for at least that long.
///
/// Durations are seconds, powers are watts; the arrays are parallel and
/// assumed ordered by ascending duration (assembled upstream from activity
/// recordings, not enforced here).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MmpCurve {
    durations: Vec<f64>,
    powers: Vec<f64>,
}

impl MmpCurve {
    /// Build a curve from parallel duration/power arrays.
    ///
    /// Validates equal length, non-emptiness, and that every sample is a
    /// finite positive number.
    pub fn new(durations: Vec<f64>, powers: Vec<f64>) -> Result<Self, CurveError> {
        if durations.len() != powers.len() {
            return Err(CurveError::MismatchedLengths {
                durations: durations.len(),
                powers: powers.len(),
            });
        }
        if durations.is_empty() {
            return Err(CurveError::Empty);
        }
        for (index, (&t, &p)) in durations.iter().zip(powers.iter()).enumerate() {
            if !t.is_finite() || t <= 0.0 {
                return Err(CurveError::InvalidSample {
                    index,
                    reason: format!("duration must be a positive number of seconds, got {t}"),
                });
            }
            if !p.is_finite() || p <= 0.0 {
                return Err(CurveError::InvalidSample {
                    index,
                    reason: format!("power must be a positive number of watts, got {p}"),
                });
            }
        }
        Ok(Self { durations, powers })
    }

    pub fn durations(&self) -> &[f64] {
        &self.durations
    }

    pub fn powers(&self) -> &[f64] {
        &self.powers
    }

    pub fn len(&self) -> usize {
        self.durations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    /// Longest duration present in the curve.
    pub fn max_duration(&self) -> f64 {
        self.durations
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Power of the first sample with duration at or above `target`
    /// seconds. This reads the raw curve, not the fitted model; `None`
    /// when the curve is shorter than the target.
    pub fn power_at_or_above(&self, target: f64) -> Option<f64> {
        self.durations
            .iter()
            .position(|&t| t >= target)
            .map(|i| self.powers[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_mismatched_lengths() {
        let err = MmpCurve::new(vec![1.0, 2.0], vec![100.0]).unwrap_err();
        assert!(matches!(err, CurveError::MismatchedLengths { .. }));
    }

    #[test]
    fn test_rejects_empty() {
        let err = MmpCurve::new(vec![], vec![]).unwrap_err();
        assert!(matches!(err, CurveError::Empty));
    }

    #[test]
    fn test_rejects_nonpositive_samples() {
        let err = MmpCurve::new(vec![0.0, 5.0], vec![100.0, 90.0]).unwrap_err();
        assert!(matches!(err, CurveError::InvalidSample { index: 0, .. }));

        let err = MmpCurve::new(vec![1.0, 5.0], vec![100.0, -3.0]).unwrap_err();
        assert!(matches!(err, CurveError::InvalidSample { index: 1, .. }));

        let err = MmpCurve::new(vec![1.0, f64::NAN], vec![100.0, 90.0]).unwrap_err();
        assert!(matches!(err, CurveError::InvalidSample { index: 1, .. }));
    }

    #[test]
    fn test_power_lookup() {
        let curve = MmpCurve::new(
            vec![1.0, 5.0, 60.0, 300.0, 900.0],
            vec![950.0, 850.0, 500.0, 320.0, 280.0],
        )
        .unwrap();

        assert_eq!(curve.power_at_or_above(1.0), Some(950.0));
        assert_eq!(curve.power_at_or_above(180.0), Some(320.0));
        assert_eq!(curve.power_at_or_above(720.0), Some(280.0));
        assert_eq!(curve.power_at_or_above(1200.0), None);
        assert_eq!(curve.max_duration(), 900.0);
    }
}
