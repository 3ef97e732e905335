// src/params.rs
//! Simulation parameters for the three processes.
//!
//! Parameters arrive already cleaned by the input layer, but every run
//! trigger re-sanitises them so the engine stays correct when called
//! directly. Sanitisation never fails: out-of-domain values are replaced by
//! the documented defaults or clamped, and each substitution is returned as
//! an [`SimError::InvalidParameter`] notice.

use crate::error::validation::*;
use crate::error::{SimError, SimResult};

pub const DEFAULT_TRIALS: usize = 10;
pub const DEFAULT_PROBABILITY: f64 = 0.5;
pub const DEFAULT_REPETITIONS: u32 = 1;
pub const DEFAULT_HORIZON: f64 = 10.0;
pub const DEFAULT_STEPS: usize = 100;
pub const DEFAULT_DRIFT: f64 = 0.0;
pub const DEFAULT_VOLATILITY: f64 = 1.0;

/// Largest accepted trial count for the discrete walks
pub const MAX_TRIALS: usize = 10_000;
/// Largest accepted step count for Brownian paths
pub const MAX_STEPS: usize = 100_000;
/// Largest accepted repetition count for the compound probability
pub const MAX_REPETITIONS: u32 = 10_000;

/// Bernoulli cumulative-successes walk
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BernoulliParams {
    pub trials: usize, // n
    pub p: f64,        // Success probability per trial
}

impl Default for BernoulliParams {
    fn default() -> Self {
        BernoulliParams {
            trials: DEFAULT_TRIALS,
            p: DEFAULT_PROBABILITY,
        }
    }
}

impl BernoulliParams {
    pub fn validate(&self) -> SimResult<()> {
        validate_count("trials", self.trials, MAX_TRIALS)?;
        validate_probability("p", self.p)
    }

    pub fn sanitized(&self) -> (Self, Vec<SimError>) {
        let mut notices = Vec::new();
        let (trials, e1) = sanitize_count("trials", self.trials, MAX_TRIALS);
        let (p, e2) = sanitize_probability("p", self.p, DEFAULT_PROBABILITY);
        notices.extend(e1);
        notices.extend(e2);
        (BernoulliParams { trials, p }, notices)
    }
}

/// Signed ±1 walk whose up-step probability is the compound probability
/// `q = (1 - p)^m`
///
/// `p` is the per-repetition failure probability, `m` the number of
/// repetitions per step (e.g. daily risk over a week of `m` days); a step is
/// +1 when all `m` repetitions pass.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignedWalkParams {
    pub trials: usize,    // n
    pub p: f64,           // Base probability
    pub repetitions: u32, // m
}

impl Default for SignedWalkParams {
    fn default() -> Self {
        SignedWalkParams {
            trials: DEFAULT_TRIALS,
            p: DEFAULT_PROBABILITY,
            repetitions: DEFAULT_REPETITIONS,
        }
    }
}

impl SignedWalkParams {
    /// Compound up-step probability `q = (1 - p)^m`, always in [0, 1]
    pub fn step_probability(&self) -> f64 {
        let p = self.p.clamp(0.0, 1.0);
        let p = if p.is_nan() { DEFAULT_PROBABILITY } else { p };
        (1.0 - p).powi(self.repetitions.min(i32::MAX as u32) as i32)
    }

    pub fn validate(&self) -> SimResult<()> {
        validate_count("trials", self.trials, MAX_TRIALS)?;
        validate_probability("p", self.p)?;
        validate_count("repetitions", self.repetitions as usize, MAX_REPETITIONS as usize)
    }

    pub fn sanitized(&self) -> (Self, Vec<SimError>) {
        let mut notices = Vec::new();
        let (trials, e1) = sanitize_count("trials", self.trials, MAX_TRIALS);
        let (p, e2) = sanitize_probability("p", self.p, DEFAULT_PROBABILITY);
        let (repetitions, e3) =
            sanitize_count("repetitions", self.repetitions as usize, MAX_REPETITIONS as usize);
        notices.extend(e1);
        notices.extend(e2);
        notices.extend(e3);
        (
            SignedWalkParams {
                trials,
                p,
                repetitions: repetitions as u32,
            },
            notices,
        )
    }
}

/// Arithmetic Brownian motion `dX = μ dt + σ dW` on `[0, T]` with `N` steps
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BrownianParams {
    pub horizon: f64,    // T
    pub steps: usize,    // N
    pub drift: f64,      // μ
    pub volatility: f64, // σ
}

impl Default for BrownianParams {
    fn default() -> Self {
        BrownianParams {
            horizon: DEFAULT_HORIZON,
            steps: DEFAULT_STEPS,
            drift: DEFAULT_DRIFT,
            volatility: DEFAULT_VOLATILITY,
        }
    }
}

impl BrownianParams {
    pub fn dt(&self) -> f64 {
        self.horizon / self.steps.max(1) as f64
    }

    /// Terminal mean `μT`
    pub fn terminal_mean(&self) -> f64 {
        self.drift * self.horizon
    }

    /// Terminal standard deviation `σ√T`
    pub fn terminal_std_dev(&self) -> f64 {
        self.volatility * self.horizon.sqrt()
    }

    pub fn validate(&self) -> SimResult<()> {
        validate_positive("horizon", self.horizon)?;
        validate_count("steps", self.steps, MAX_STEPS)?;
        validate_finite("drift", self.drift)?;
        validate_non_negative("volatility", self.volatility)
    }

    /// σ = 0 is kept: it is a degenerate but well-defined process.
    pub fn sanitized(&self) -> (Self, Vec<SimError>) {
        let mut notices = Vec::new();
        let (horizon, e1) = sanitize_positive("horizon", self.horizon, DEFAULT_HORIZON);
        let (steps, e2) = sanitize_count("steps", self.steps, MAX_STEPS);
        let (drift, e3) = sanitize_finite("drift", self.drift, DEFAULT_DRIFT);
        let (volatility, e4) = sanitize_magnitude("volatility", self.volatility, DEFAULT_VOLATILITY);
        notices.extend(e1);
        notices.extend(e2);
        notices.extend(e3);
        notices.extend(e4);
        (
            BrownianParams {
                horizon,
                steps,
                drift,
                volatility,
            },
            notices,
        )
    }
}

/// Parameters of one experiment
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SimulationParameters {
    Bernoulli(BernoulliParams),
    SignedWalk(SignedWalkParams),
    Brownian(BrownianParams),
}

impl SimulationParameters {
    pub fn validate(&self) -> SimResult<()> {
        match self {
            SimulationParameters::Bernoulli(p) => p.validate(),
            SimulationParameters::SignedWalk(p) => p.validate(),
            SimulationParameters::Brownian(p) => p.validate(),
        }
    }

    pub fn sanitized(&self) -> (Self, Vec<SimError>) {
        match self {
            SimulationParameters::Bernoulli(p) => {
                let (p, notices) = p.sanitized();
                (SimulationParameters::Bernoulli(p), notices)
            }
            SimulationParameters::SignedWalk(p) => {
                let (p, notices) = p.sanitized();
                (SimulationParameters::SignedWalk(p), notices)
            }
            SimulationParameters::Brownian(p) => {
                let (p, notices) = p.sanitized();
                (SimulationParameters::Brownian(p), notices)
            }
        }
    }

    pub fn process_name(&self) -> &'static str {
        match self {
            SimulationParameters::Bernoulli(_) => "bernoulli",
            SimulationParameters::SignedWalk(_) => "signed-walk",
            SimulationParameters::Brownian(_) => "brownian",
        }
    }

    /// Size measure used by the sampling tiers (trials or steps)
    pub fn size(&self) -> usize {
        match self {
            SimulationParameters::Bernoulli(p) => p.trials,
            SimulationParameters::SignedWalk(p) => p.trials,
            SimulationParameters::Brownian(p) => p.steps,
        }
    }
}

impl From<BernoulliParams> for SimulationParameters {
    fn from(p: BernoulliParams) -> Self {
        SimulationParameters::Bernoulli(p)
    }
}

impl From<SignedWalkParams> for SimulationParameters {
    fn from(p: SignedWalkParams) -> Self {
        SimulationParameters::SignedWalk(p)
    }
}

impl From<BrownianParams> for SimulationParameters {
    fn from(p: BrownianParams) -> Self {
        SimulationParameters::Brownian(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_compound_probability() {
        let params = SignedWalkParams {
            trials: 10,
            p: 0.1,
            repetitions: 5,
        };
        assert_relative_eq!(params.step_probability(), 0.9f64.powi(5), epsilon = 1e-15);

        let certain = SignedWalkParams { p: 0.0, ..params };
        assert_eq!(certain.step_probability(), 1.0);
        let hopeless = SignedWalkParams { p: 1.0, ..params };
        assert_eq!(hopeless.step_probability(), 0.0);
    }

    #[test]
    fn test_bernoulli_sanitize() {
        let (params, notices) = BernoulliParams { trials: 0, p: 1.5 }.sanitized();
        assert_eq!(params, BernoulliParams { trials: 1, p: 1.0 });
        assert_eq!(notices.len(), 2);

        let (params, notices) = BernoulliParams::default().sanitized();
        assert_eq!(params, BernoulliParams::default());
        assert!(notices.is_empty());
    }

    #[test]
    fn test_brownian_sanitize() {
        let raw = BrownianParams {
            horizon: -4.0,
            steps: 0,
            drift: f64::NAN,
            volatility: -0.3,
        };
        assert!(raw.validate().is_err());
        let (params, notices) = raw.sanitized();
        assert_eq!(params.horizon, 4.0);
        assert_eq!(params.steps, 1);
        assert_eq!(params.drift, DEFAULT_DRIFT);
        assert_eq!(params.volatility, 0.3);
        assert_eq!(notices.len(), 4);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_brownian_zero_volatility_is_kept() {
        let raw = BrownianParams {
            volatility: 0.0,
            ..Default::default()
        };
        let (params, notices) = raw.sanitized();
        assert_eq!(params.volatility, 0.0);
        assert!(notices.is_empty());
    }

    #[test]
    fn test_terminal_moments() {
        let params = BrownianParams {
            horizon: 4.0,
            steps: 10,
            drift: 0.5,
            volatility: 2.0,
        };
        assert_relative_eq!(params.terminal_mean(), 2.0);
        assert_relative_eq!(params.terminal_std_dev(), 4.0);
        assert_relative_eq!(params.dt(), 0.4);
    }
}
