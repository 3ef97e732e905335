// src/mc/strategy.rs
//! Adaptive sampling tiers
//!
//! The number of outcome sequences grows as 2^n while rendering and exact
//! enumeration only stay tractable for small n, so the engine picks one of
//! three tiers by problem size:
//! ```text
//! n ≤ exact_threshold                     Exact: enumerate all 2^n
//! exact_threshold < n ≤ hybrid_threshold  HybridMonteCarlo: fixed runs, small fan drawn
//! n > hybrid_threshold                    EstimationOnly: min(cap, per_block·⌈n/block⌉) runs, nothing drawn
//! ```
//! The estimation heuristic is a tunable bound on synchronous latency, not a
//! statistical target, so all its constants live in [`SamplingConfig`].

use crate::analytics::theory::NormalCurveMethod;
use crate::error::{SimError, SimResult};
use crate::mc::enumerate::MAX_ENUMERATION_TRIALS;
use tracing::warn;

/// Largest Monte Carlo run count any tier may use in one trigger
pub const MAX_MONTE_CARLO_RUNS: u64 = 1_000_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SamplingMode {
    Exact,
    HybridMonteCarlo,
    EstimationOnly,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SamplingConfig {
    pub exact_threshold: usize,
    pub hybrid_threshold: usize,
    /// Most trajectories ever handed to the sink in one output
    pub display_cap: usize,
    pub hybrid_runs: u64,
    /// Leading hybrid runs that are drawn
    pub fan_size: usize,
    pub estimation_runs_per_block: u64,
    pub estimation_block: usize,
    pub estimation_run_cap: u64,
    pub brownian_runs: u64,
    pub brownian_fan: usize,
    pub histogram_bins: usize,
    pub normal_curve: NormalCurveMethod,
    /// Replaces the Monte Carlo run count of every non-exact tier; the
    /// estimation tier still caps it at `estimation_run_cap`
    pub runs_override: Option<u64>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        SamplingConfig {
            exact_threshold: 12,
            hybrid_threshold: 20,
            display_cap: 5000,
            hybrid_runs: 5000,
            fan_size: 100,
            estimation_runs_per_block: 1000,
            estimation_block: 10,
            estimation_run_cap: 20_000,
            brownian_runs: 5000,
            brownian_fan: 50,
            histogram_bins: 40,
            normal_curve: NormalCurveMethod::DensityAtCenter,
            runs_override: None,
        }
    }
}

/// Resolved tier for one problem size
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SamplingPlan {
    pub mode: SamplingMode,
    /// Outcomes aggregated into the histogram
    pub runs: u64,
    /// Trajectories handed to the sink
    pub displayed: usize,
}

fn invalid(field: &str, value: f64, constraint: &str) -> SimError {
    SimError::InvalidParameter {
        parameter: field.to_string(),
        value,
        constraint: constraint.to_string(),
    }
}

impl SamplingConfig {
    /// Validate the sampling configuration
    pub fn validate(&self) -> SimResult<()> {
        if self.exact_threshold > MAX_ENUMERATION_TRIALS {
            return Err(SimError::CapacityExceeded {
                what: "exact_threshold".to_string(),
                requested: self.exact_threshold as u64,
                cap: MAX_ENUMERATION_TRIALS as u64,
            });
        }
        if self.hybrid_threshold < self.exact_threshold {
            return Err(invalid(
                "hybrid_threshold",
                self.hybrid_threshold as f64,
                &format!("must be at least exact_threshold ({})", self.exact_threshold),
            ));
        }
        for (field, value) in [
            ("display_cap", self.display_cap as u64),
            ("hybrid_runs", self.hybrid_runs),
            ("estimation_runs_per_block", self.estimation_runs_per_block),
            ("estimation_block", self.estimation_block as u64),
            ("estimation_run_cap", self.estimation_run_cap),
            ("brownian_runs", self.brownian_runs),
            ("histogram_bins", self.histogram_bins as u64),
        ] {
            if value == 0 {
                return Err(invalid(field, 0.0, "must be at least 1"));
            }
        }
        if let Some(0) = self.runs_override {
            return Err(invalid("runs_override", 0.0, "must be at least 1"));
        }
        for (field, value) in [
            ("hybrid_runs", self.hybrid_runs),
            ("estimation_run_cap", self.estimation_run_cap),
            ("brownian_runs", self.brownian_runs),
            ("runs_override", self.runs_override.unwrap_or(0)),
        ] {
            if value > MAX_MONTE_CARLO_RUNS {
                return Err(SimError::CapacityExceeded {
                    what: field.to_string(),
                    requested: value,
                    cap: MAX_MONTE_CARLO_RUNS,
                });
            }
        }
        if self.fan_size > self.display_cap {
            return Err(SimError::CapacityExceeded {
                what: "fan_size".to_string(),
                requested: self.fan_size as u64,
                cap: self.display_cap as u64,
            });
        }
        if self.brownian_fan > self.display_cap {
            return Err(SimError::CapacityExceeded {
                what: "brownian_fan".to_string(),
                requested: self.brownian_fan as u64,
                cap: self.display_cap as u64,
            });
        }
        Ok(())
    }

    /// Repair an invalid configuration field by field
    ///
    /// Each repaired field is replaced by its default (or clamped to its cap)
    /// and reported.
    pub fn sanitized(&self) -> (Self, Vec<SimError>) {
        let defaults = SamplingConfig::default();
        let mut cfg = self.clone();
        let mut notices = Vec::new();

        if cfg.exact_threshold > MAX_ENUMERATION_TRIALS {
            notices.push(SimError::CapacityExceeded {
                what: "exact_threshold".to_string(),
                requested: cfg.exact_threshold as u64,
                cap: MAX_ENUMERATION_TRIALS as u64,
            });
            cfg.exact_threshold = MAX_ENUMERATION_TRIALS;
        }
        if cfg.hybrid_threshold < cfg.exact_threshold {
            notices.push(invalid(
                "hybrid_threshold",
                cfg.hybrid_threshold as f64,
                "raised to exact_threshold",
            ));
            cfg.hybrid_threshold = cfg.exact_threshold;
        }

        macro_rules! nonzero {
            ($field:ident) => {
                if cfg.$field == 0 {
                    notices.push(invalid(stringify!($field), 0.0, "must be at least 1, default used"));
                    cfg.$field = defaults.$field;
                }
            };
        }
        nonzero!(display_cap);
        nonzero!(hybrid_runs);
        nonzero!(estimation_runs_per_block);
        nonzero!(estimation_block);
        nonzero!(estimation_run_cap);
        nonzero!(brownian_runs);
        nonzero!(histogram_bins);

        if cfg.runs_override == Some(0) {
            notices.push(invalid("runs_override", 0.0, "must be at least 1, override dropped"));
            cfg.runs_override = None;
        }

        macro_rules! capped {
            ($field:ident) => {
                if cfg.$field > MAX_MONTE_CARLO_RUNS {
                    notices.push(SimError::CapacityExceeded {
                        what: stringify!($field).to_string(),
                        requested: cfg.$field,
                        cap: MAX_MONTE_CARLO_RUNS,
                    });
                    cfg.$field = MAX_MONTE_CARLO_RUNS;
                }
            };
        }
        capped!(hybrid_runs);
        capped!(estimation_run_cap);
        capped!(brownian_runs);
        if let Some(runs) = cfg.runs_override.filter(|&r| r > MAX_MONTE_CARLO_RUNS) {
            notices.push(SimError::CapacityExceeded {
                what: "runs_override".to_string(),
                requested: runs,
                cap: MAX_MONTE_CARLO_RUNS,
            });
            cfg.runs_override = Some(MAX_MONTE_CARLO_RUNS);
        }
        if cfg.fan_size > cfg.display_cap {
            notices.push(SimError::CapacityExceeded {
                what: "fan_size".to_string(),
                requested: cfg.fan_size as u64,
                cap: cfg.display_cap as u64,
            });
            cfg.fan_size = cfg.display_cap;
        }
        if cfg.brownian_fan > cfg.display_cap {
            notices.push(SimError::CapacityExceeded {
                what: "brownian_fan".to_string(),
                requested: cfg.brownian_fan as u64,
                cap: cfg.display_cap as u64,
            });
            cfg.brownian_fan = cfg.display_cap;
        }

        for notice in &notices {
            warn!(%notice, "sampling configuration repaired");
        }
        (cfg, notices)
    }

    /// Tier for a discrete problem of `n` trials
    ///
    /// Both thresholds are inclusive upper bounds of their tier.
    pub fn select_mode(&self, n: usize) -> SamplingMode {
        if n <= self.exact_threshold {
            SamplingMode::Exact
        } else if n <= self.hybrid_threshold {
            SamplingMode::HybridMonteCarlo
        } else {
            SamplingMode::EstimationOnly
        }
    }

    /// `min(cap, runs_per_block · ⌈n / block⌉)`
    pub fn estimation_runs(&self, n: usize) -> u64 {
        let block = self.estimation_block.max(1);
        let blocks = ((n + block - 1) / block) as u64;
        self.estimation_runs_per_block
            .saturating_mul(blocks)
            .min(self.estimation_run_cap)
            .min(MAX_MONTE_CARLO_RUNS)
    }

    /// Run count of the hybrid tier after the override and the hard cap
    pub fn hybrid_run_count(&self) -> u64 {
        self.runs_override
            .unwrap_or(self.hybrid_runs)
            .min(MAX_MONTE_CARLO_RUNS)
    }

    /// Runs and display count for a discrete problem of `n` trials
    pub fn plan(&self, n: usize) -> SamplingPlan {
        match self.select_mode(n) {
            SamplingMode::Exact => {
                let runs = 1u64 << n.min(MAX_ENUMERATION_TRIALS);
                SamplingPlan {
                    mode: SamplingMode::Exact,
                    runs,
                    displayed: runs.min(self.display_cap as u64) as usize,
                }
            }
            SamplingMode::HybridMonteCarlo => {
                let runs = self.hybrid_run_count();
                SamplingPlan {
                    mode: SamplingMode::HybridMonteCarlo,
                    runs,
                    displayed: runs.min(self.fan_size as u64) as usize,
                }
            }
            SamplingMode::EstimationOnly => SamplingPlan {
                mode: SamplingMode::EstimationOnly,
                runs: match self.runs_override {
                    Some(runs) => runs.min(self.estimation_run_cap).min(MAX_MONTE_CARLO_RUNS),
                    None => self.estimation_runs(n),
                },
                displayed: 0,
            },
        }
    }

    /// Brownian paths are never enumerable; they always use the fan tier
    pub fn brownian_plan(&self) -> SamplingPlan {
        let runs = self
            .runs_override
            .unwrap_or(self.brownian_runs)
            .min(MAX_MONTE_CARLO_RUNS);
        SamplingPlan {
            mode: SamplingMode::HybridMonteCarlo,
            runs,
            displayed: runs.min(self.brownian_fan as u64) as usize,
        }
    }
}
