//! Derivative-free parameter fitting for the omniPD model
//!
//! A coordinate-wise step/probe descent: each round probes every dimension
//! up and down by its current step size and keeps any improvement. When a
//! full round yields no improvement the steps decay by 0.9. This is a
//! greedy, axis-aligned local search - not a simplex method - and must stay
//! that way: a different optimizer would converge to different local optima
//! on ambiguous curves.

use tracing::debug;

use crate::model::{sum_squared_error, ModelParams};
use crate::stats::percentile;

/// Maximum descent rounds before giving up on further refinement
pub const MAX_ROUNDS: usize = 1000;

/// Initial per-dimension step sizes for (CP, W', Pmax, A)
const INITIAL_STEPS: [f64; 4] = [10.0, 1000.0, 10.0, 0.5];

/// Multiplier applied to every step after a round with no improvement
const STEP_DECAY: f64 = 0.9;

/// Convergence threshold: stop once every |step| drops below this
const STEP_TOLERANCE: f64 = 0.01;

/// Starting W' guess in joules
const INITIAL_W_PRIME: f64 = 20_000.0;

/// Starting decay coefficient guess in watts
const INITIAL_A: f64 = 5.0;

fn to_params(v: &[f64; 4]) -> ModelParams {
    ModelParams::new(v[0], v[1], v[2], v[3])
}

/// Fit omniPD parameters to a `(durations, powers)` sample set by
/// minimizing the sum of squared residuals.
///
/// Initial guesses: CP at the 30th percentile of observed power, W' at
/// 20 kJ, Pmax at the observed maximum, A at 5 W. Always returns a
/// parameter tuple after bounded iterations; there is no convergence
/// failure. Quality is only observable downstream via RMSE.
pub fn fit(durations: &[f64], powers: &[f64]) -> ModelParams {
    debug_assert_eq!(durations.len(), powers.len());
    debug_assert!(!powers.is_empty());

    let cp0 = percentile(powers, 30.0);
    let pmax0 = powers.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    let mut params = [cp0, INITIAL_W_PRIME, pmax0, INITIAL_A];
    let mut steps = INITIAL_STEPS;
    let mut best = sum_squared_error(&to_params(&params), durations, powers);

    let mut rounds = 0;
    for round in 0..MAX_ROUNDS {
        rounds = round + 1;
        let mut improved = false;

        for dim in 0..4 {
            for direction in [1.0, -1.0] {
                let mut candidate = params;
                candidate[dim] += direction * steps[dim];
                let cost = sum_squared_error(&to_params(&candidate), durations, powers);
                if cost < best {
                    params = candidate;
                    best = cost;
                    improved = true;
                    break;
                }
            }
        }

        if !improved {
            for step in steps.iter_mut() {
                *step *= STEP_DECAY;
            }
        }

        if steps.iter().all(|s| s.abs() < STEP_TOLERANCE) {
            break;
        }
    }

    debug!(rounds, sse = best, "omniPD descent finished");
    to_params(&params)
}
