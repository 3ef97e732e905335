//! # stochastic-lab: Random Walks and Brownian Motion for the Classroom
//!
//! A simulation and distribution-estimation engine for three processes:
//!
//! - **Bernoulli cumulative walk**: running count of successes in n trials
//! - **Signed random walk**: ±1 steps with compound up-probability `q = (1-p)^m`
//! - **Arithmetic Brownian motion**: `dX = μ dt + σ dW` on `[0, T]`
//!
//! Each run trigger produces sampled trajectories, a histogram of terminal
//! outcomes and a closed-form reference curve on the same bins, ready for any
//! plotting front end.
//!
//! ## Quick Start
//!
//! ```rust
//! use stochastic_lab::mc::{ExperimentState, SamplingConfig, SamplingMode};
//! use stochastic_lab::params::BernoulliParams;
//! use stochastic_lab::rng;
//!
//! let mut state = ExperimentState::new();
//! let mut rng = rng::seed_rng_from_u64(42);
//!
//! let report = state.run_batch(
//!     BernoulliParams { trials: 3, p: 0.5 },
//!     &SamplingConfig::default(),
//!     &mut rng,
//! );
//!
//! assert_eq!(report.summary().mode, Some(SamplingMode::Exact));
//! assert_eq!(report.histogram().counts, vec![1, 3, 3, 1]);
//! ```
//!
//! ## Sampling tiers
//!
//! Small discrete problems are enumerated exactly (all 2^n sequences),
//! medium ones are simulated with a small displayed fan, and large ones are
//! estimated without drawing any trajectory. See [`mc::strategy`].

// Module declarations
pub mod analytics;
pub mod error;
pub mod frequency;
pub mod histogram;
pub mod math_utils;
pub mod mc;
pub mod models;
pub mod output;
pub mod params;
pub mod rng;

// Re-export commonly used types for convenience
pub use error::{SimError, SimResult};
pub use mc::{ExperimentState, RunReport, SamplingConfig, SamplingMode};
pub use params::SimulationParameters;
