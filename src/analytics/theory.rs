// src/analytics/theory.rs
//! Closed-form reference distributions for the histogram overlay
//!
//! # Binomial case
//!
//! After n trials with per-trial probability q the number of successes K has
//! ```text
//! P(K = k) = C(n,k) q^k (1-q)^(n-k)
//! ```
//! and the expected count in bin k after R runs is `R·P(K = k)`.
//!
//! # Normal case
//!
//! Arithmetic Brownian motion has `X_T ~ N(μT, σ²T)` for every step count,
//! since a sum of independent Gaussian increments is Gaussian. The expected
//! count in a bin of width w centred at x is approximately
//! ```text
//! φ(x; μT, σ√T) · R · w
//! ```
//!
//! Every curve here is a pure function of its arguments.

use crate::error::SimError;
use crate::math_utils::{norm_cdf, norm_pdf};
use crate::models::DiscreteProcess;

/// Expected counts aligned 1:1 with histogram bins
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TheoreticalCurve {
    pub labels: Vec<f64>,
    pub expected: Vec<f64>,
}

impl TheoreticalCurve {
    pub fn total(&self) -> f64 {
        self.expected.iter().sum()
    }
}

/// How the normal reference curve turns a density into bin counts
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NormalCurveMethod {
    /// `pdf(center) · runs · width`
    #[default]
    DensityAtCenter,
    /// `(Φ(right) - Φ(left)) · runs`
    BinMass,
}

/// Binomial coefficient C(n, k) as a float
///
/// Iterative multiplicative form `Π (n-k+i)/i` over the smaller of `k` and
/// `n-k`, so no factorial is ever formed. Overflows to infinity for very
/// large `n` (past roughly C(1029, 514)); see [`ln_binomial_coefficient`].
pub fn binomial_coefficient(n: u64, k: u64) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    let mut c = 1.0;
    for i in 1..=k {
        c = c * (n - k + i) as f64 / i as f64;
    }
    c
}

/// Natural log of C(n, k), same iteration in log space
pub fn ln_binomial_coefficient(n: u64, k: u64) -> f64 {
    if k > n {
        return f64::NEG_INFINITY;
    }
    let k = k.min(n - k);
    (1..=k)
        .map(|i| ((n - k + i) as f64 / i as f64).ln())
        .sum()
}

/// Binomial probability mass `P(K = k)` for `K ~ Binomial(n, q)`
///
/// `q <= 0` and `q >= 1` are point masses at 0 and n. When the direct
/// product would overflow or underflow the log-space form is used instead.
pub fn binomial_pmf(n: u64, k: u64, q: f64) -> f64 {
    if k > n {
        return 0.0;
    }
    if q.is_nan() {
        return 0.0;
    }
    if q <= 0.0 {
        return if k == 0 { 1.0 } else { 0.0 };
    }
    if q >= 1.0 {
        return if k == n { 1.0 } else { 0.0 };
    }

    let c = binomial_coefficient(n, k);
    let tail = q.powf(k as f64) * (1.0 - q).powf((n - k) as f64);
    let direct = c * tail;
    if c.is_finite() && tail > 0.0 && direct.is_finite() {
        return direct;
    }
    let ln_p = ln_binomial_coefficient(n, k) + k as f64 * q.ln() + (n - k) as f64 * (1.0 - q).ln();
    ln_p.exp()
}

/// Reference curve for a discrete walk, one bin per integer outcome
///
/// Bins span the walk's full outcome range. Outcomes the walk cannot reach
/// (odd offsets of a signed walk) carry an expected count of exactly 0.
pub fn binomial_curve<P: DiscreteProcess + ?Sized>(process: &P, total_runs: u64) -> TheoreticalCurve {
    let n = process.steps();
    let q = process.success_probability();
    let (lo, hi) = process.outcome_range();
    let labels: Vec<f64> = (lo..=hi).map(|v| v as f64).collect();
    let mut expected = vec![0.0; labels.len()];

    for k in 0..=n {
        let idx = (process.outcome_for_successes(k) - lo) as usize;
        expected[idx] += binomial_pmf(n as u64, k as u64, q) * total_runs as f64;
    }
    TheoreticalCurve { labels, expected }
}

/// Reference curve for a normal terminal distribution over equal-width bins
///
/// A zero (or non-finite) `std_dev` yields a point mass: all `total_runs`
/// land in the bin holding `mean`, clamped to the edge bins, and every other
/// bin is 0.
pub fn normal_curve(
    mean: f64,
    std_dev: f64,
    bin_centers: &[f64],
    bin_width: f64,
    total_runs: u64,
    method: NormalCurveMethod,
) -> TheoreticalCurve {
    let labels = bin_centers.to_vec();
    let runs = total_runs as f64;

    if bin_centers.is_empty() {
        return TheoreticalCurve {
            labels,
            expected: Vec::new(),
        };
    }

    if !std_dev.is_finite() || std_dev <= 0.0 {
        let mut expected = vec![0.0; bin_centers.len()];
        let left_edge = bin_centers[0] - 0.5 * bin_width;
        let idx = if bin_width > 0.0 {
            ((mean - left_edge) / bin_width).floor()
        } else {
            0.0
        };
        let idx = if idx.is_nan() { 0.0 } else { idx.clamp(0.0, (bin_centers.len() - 1) as f64) };
        expected[idx as usize] = runs;
        return TheoreticalCurve { labels, expected };
    }

    let expected = match method {
        NormalCurveMethod::DensityAtCenter => bin_centers
            .iter()
            .map(|&x| norm_pdf(x, mean, std_dev) * runs * bin_width)
            .collect(),
        NormalCurveMethod::BinMass => bin_centers
            .iter()
            .map(|&x| {
                let a = (x - 0.5 * bin_width - mean) / std_dev;
                let b = (x + 0.5 * bin_width - mean) / std_dev;
                (norm_cdf(b) - norm_cdf(a)) * runs
            })
            .collect(),
    };
    TheoreticalCurve { labels, expected }
}

/// Notice for a point-mass binomial (q = 0 or q = 1)
pub fn binomial_degeneracy(q: f64) -> Option<SimError> {
    if q <= 0.0 || q >= 1.0 {
        Some(SimError::DegenerateDistribution {
            distribution: "binomial".to_string(),
            reason: format!("success probability {} gives a point mass", q),
        })
    } else {
        None
    }
}

/// Notice for a zero-variance normal (σ√T = 0)
pub fn normal_degeneracy(std_dev: f64) -> Option<SimError> {
    if !std_dev.is_finite() || std_dev <= 0.0 {
        Some(SimError::DegenerateDistribution {
            distribution: "normal".to_string(),
            reason: format!("standard deviation {} gives a point mass", std_dev),
        })
    } else {
        None
    }
}
