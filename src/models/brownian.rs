// src/models/brownian.rs
//! Arithmetic Brownian Motion
//!
//! # Mathematical Framework
//!
//! ```text
//! dX_t = μ dt + σ dW_t,   X_0 = 0
//! ```
//!
//! Discretised exactly (the increments are Gaussian, so there is no
//! discretisation error):
//! ```text
//! X_{i+1} = X_i + μΔt + σ√Δt Z_i,   Z_i ~ N(0,1)
//! ```
//!
//! The diffusion term scales with `√Δt`, not `Δt`, which keeps
//! `Var(X_T) = σ²T` for every step count N.

use super::model::ProcessModel;
use crate::error::validation::{sanitize_finite, sanitize_magnitude, sanitize_positive};
use crate::params::{BrownianParams, DEFAULT_DRIFT, DEFAULT_HORIZON, DEFAULT_VOLATILITY};
use crate::rng::{standard_normal, UniformSource};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArithmeticBrownian {
    pub steps: usize,
    pub dt: f64,
    pub drift: f64,
    pub volatility: f64,
    drift_term: f64, // μΔt
    vol_term: f64,   // σ√Δt
}

impl ArithmeticBrownian {
    /// Out-of-domain inputs fall back the same way as
    /// [`BrownianParams::sanitized`]: a negative horizon or volatility is
    /// mirrored, a zero or non-finite horizon becomes the default, a
    /// non-finite drift becomes 0 and `steps` is at least 1.
    pub fn new(horizon: f64, steps: usize, drift: f64, volatility: f64) -> Self {
        let (horizon, _) = sanitize_positive("horizon", horizon, DEFAULT_HORIZON);
        let (drift, _) = sanitize_finite("drift", drift, DEFAULT_DRIFT);
        let (volatility, _) = sanitize_magnitude("volatility", volatility, DEFAULT_VOLATILITY);
        let steps = steps.max(1);
        let dt = horizon / steps as f64;
        ArithmeticBrownian {
            steps,
            dt,
            drift,
            volatility,
            drift_term: drift * dt,
            vol_term: volatility * dt.sqrt(),
        }
    }

    pub fn horizon(&self) -> f64 {
        self.dt * self.steps as f64
    }

    /// Time grid `0, Δt, 2Δt, ..., T`
    pub fn time_grid(&self) -> Vec<f64> {
        (0..=self.steps).map(|i| i as f64 * self.dt).collect()
    }

    /// Advance by one step using a supplied standard normal draw
    pub fn step_with_z(&self, current: f64, z: f64) -> f64 {
        current + self.drift_term + self.vol_term * z
    }
}

impl From<&BrownianParams> for ArithmeticBrownian {
    fn from(params: &BrownianParams) -> Self {
        ArithmeticBrownian::new(params.horizon, params.steps, params.drift, params.volatility)
    }
}

impl ProcessModel for ArithmeticBrownian {
    type Value = f64;

    fn steps(&self) -> usize {
        self.steps
    }

    fn start(&self) -> f64 {
        0.0
    }

    fn step<U: UniformSource + ?Sized>(&self, current: f64, rng: &mut U) -> f64 {
        self.step_with_z(current, standard_normal(rng))
    }

    fn expected_path(&self) -> Vec<f64> {
        self.time_grid().into_iter().map(|t| self.drift * t).collect()
    }
}
