//! Critical power model calculation (omniPD orchestrator)
//!
//! End to end: raw mean-maximal-power curve plus athlete weight in, a
//! [`CpFitResult`] out. Runs the percentile point-selection search, fits
//! the model on the surviving subset, and derives the summary statistics
//! the dashboards consume (RMSE/MAE, t99, per-kg metrics, named MMP
//! values).

use anyhow::{anyhow, Result};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::model::{w_prime_depleted, predicted_power, DECAY_BREAKPOINT_SECS, ModelParams};
use crate::models::MmpCurve;
use crate::optimizer;
use crate::selection::{self, Selection};
use crate::stats::{mae, rmse};

/// Decay coefficient applied when the curve has no long-duration data;
/// without samples beyond 1800s the A term is unidentifiable.
const DEFAULT_A: f64 = 5.0;

/// Number of probe durations for the t99 scan
const T99_SAMPLES: usize = 500;

/// t99 scan range in seconds
const T99_RANGE: (f64, f64) = (1.0, 180.0);

/// Named MMP lookup targets: 1s, 5s, 3min, 6min, 12min
const MMP_TARGETS: [f64; 5] = [1.0, 5.0, 180.0, 360.0, 720.0];

/// CP model calculation errors
#[derive(Debug, thiserror::Error)]
pub enum CpModelError {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Complete result of an omniPD fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpFitResult {
    /// Critical power in watts, rounded
    pub cp: f64,
    /// Anaerobic work capacity in joules, rounded
    pub w_prime: f64,
    /// Maximal instantaneous power in watts, rounded
    pub pmax: f64,
    /// Root mean squared error of the fit over the selected subset
    pub rmse: f64,
    /// Mean absolute error of the fit over the selected subset
    pub mae: f64,
    /// CP per kilogram of body weight (W/kg)
    pub cp_kg: Decimal,
    /// W' per kilogram of body weight (kJ/kg)
    pub w_prime_kg: Decimal,
    /// Pmax per kilogram of body weight (W/kg)
    pub pmax_kg: Decimal,
    /// Long-duration decay coefficient in watts
    pub a_param: f64,
    /// Time to 99% W' depletion in seconds
    pub t_99: f64,
    /// Percentile at which the point-selection search succeeded
    pub used_percentile: u8,
    /// Number of curve samples the final fit used
    pub points_used: usize,
    /// Percentile rank of the force-included long point, if one was needed
    pub forced_long_point: Option<f64>,
    /// Best 1-second power read directly off the raw curve
    pub mmp_1s: Option<f64>,
    /// Best 5-second power read directly off the raw curve
    pub mmp_5s: Option<f64>,
    /// Best 3-minute power read directly off the raw curve
    pub mmp_3m: Option<f64>,
    /// Best 6-minute power read directly off the raw curve
    pub mmp_6m: Option<f64>,
    /// Best 12-minute power read directly off the raw curve
    pub mmp_12m: Option<f64>,
}

/// omniPD critical power analyzer
pub struct CpAnalyzer;

impl CpAnalyzer {
    /// Compute the CP model with default engine settings.
    pub fn compute(curve: &MmpCurve, weight: f64) -> Result<CpFitResult> {
        Self::compute_with(curve, weight, &EngineConfig::default())
    }

    /// Compute the CP model for a raw MMP curve.
    ///
    /// `weight` is in kilograms and only affects the per-kg fields; pass
    /// 1.0 when unknown. Fails with [`CpModelError::InsufficientData`]
    /// when fewer than four points are available, or when the percentile
    /// search exhausts 100 down to 0 without assembling four points.
    pub fn compute_with(
        curve: &MmpCurve,
        weight: f64,
        config: &EngineConfig,
    ) -> Result<CpFitResult> {
        // Configs built in code bypass the file-load validation; a
        // start_percentile over 100 would index past the end of the
        // residual distribution.
        config.validate()?;

        if weight <= 0.0 || !weight.is_finite() {
            return Err(anyhow!(CpModelError::InvalidParameter(format!(
                "weight must be a positive number of kilograms, got {weight}"
            ))));
        }

        let durations = curve.durations();
        let powers = curve.powers();

        if curve.len() < config.min_points {
            return Err(anyhow!(CpModelError::InsufficientData(format!(
                "CP model needs at least {} samples, got {}",
                config.min_points,
                curve.len()
            ))));
        }

        // Percentile search: start strict and loosen one percentile at a
        // time until enough points survive. Each pass refits the entire
        // curve for fresh residuals - expensive but bounded at 101 passes.
        let mut accepted: Option<(Selection, u8)> = None;
        let mut current = config.start_percentile as i32;
        while current >= 0 {
            let selection = selection::select_points(
                durations,
                powers,
                current as f64,
                config.values_per_window,
                config.sprint_target_secs,
            );
            if selection.indices.len() >= config.min_points {
                accepted = Some((selection, current as u8));
                break;
            }
            current -= 1;
        }

        let (selection, used_percentile) = accepted.ok_or_else(|| {
            anyhow!(CpModelError::InsufficientData(
                "percentile search exhausted without finding 4 usable points".to_string()
            ))
        })?;

        debug!(
            used_percentile,
            points = selection.indices.len(),
            forced = selection.forced_long_point.is_some(),
            "point selection converged"
        );

        let sel_durations: Vec<f64> = selection.indices.iter().map(|&i| durations[i]).collect();
        let sel_powers: Vec<f64> = selection.indices.iter().map(|&i| powers[i]).collect();

        let mut params = optimizer::fit(&sel_durations, &sel_powers);

        // The decay term is unidentifiable without long-duration samples.
        if curve.max_duration() <= DECAY_BREAKPOINT_SECS {
            params.a = DEFAULT_A;
        }

        let residuals: Vec<f64> = sel_durations
            .iter()
            .zip(sel_powers.iter())
            .map(|(&t, &p)| p - predicted_power(t, &params))
            .collect();

        let cp = params.cp.round();
        let w_prime = params.w_prime.round();
        let pmax = params.pmax.round();

        Ok(CpFitResult {
            cp,
            w_prime,
            pmax,
            rmse: rmse(&residuals),
            mae: mae(&residuals),
            cp_kg: per_kg(cp / weight),
            w_prime_kg: per_kg(w_prime / weight / 1000.0),
            pmax_kg: per_kg(pmax / weight),
            a_param: params.a,
            t_99: t99(&params),
            used_percentile,
            points_used: selection.indices.len(),
            forced_long_point: selection.forced_long_point,
            mmp_1s: curve.power_at_or_above(MMP_TARGETS[0]),
            mmp_5s: curve.power_at_or_above(MMP_TARGETS[1]),
            mmp_3m: curve.power_at_or_above(MMP_TARGETS[2]),
            mmp_6m: curve.power_at_or_above(MMP_TARGETS[3]),
            mmp_12m: curve.power_at_or_above(MMP_TARGETS[4]),
        })
    }
}

fn per_kg(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO).round_dp(2)
}

/// Time to 99% W' depletion: scan 500 evenly spaced durations in [1, 180]
/// and return the one whose depleted work is closest to 0.99 * W'.
fn t99(params: &ModelParams) -> f64 {
    let target = 0.99 * params.w_prime;
    let (lo, hi) = T99_RANGE;
    let step = (hi - lo) / (T99_SAMPLES - 1) as f64;

    let mut best_t = lo;
    let mut best_distance = f64::INFINITY;
    for i in 0..T99_SAMPLES {
        let t = lo + i as f64 * step;
        let distance = (w_prime_depleted(t, params) - target).abs();
        if distance < best_distance {
            best_distance = distance;
            best_t = t;
        }
    }
    best_t
}
