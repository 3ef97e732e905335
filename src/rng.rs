// src/rng.rs
//! Random Number Generation for the Simulation Engine
//!
//! # Design
//!
//! Every generator in this crate draws its randomness through the
//! [`UniformSource`] capability, so callers decide where numbers come from:
//! 1. **Any `rand` generator**: blanket implementation over `RngCore`
//!    (`StdRng`, `thread_rng()`, ...)
//! 2. **Counter-based**: [`CounterRng`], a splitmix64 stream keyed by
//!    `(seed, counter)`
//! 3. **Scripted**: [`SequenceSource`] replays a fixed list of uniforms, for
//!    tests that need an exact sequence of coin flips
//!
//! # Box-Muller Transform
//!
//! Converts two uniforms into one standard normal draw:
//! ```text
//! Z = √(-2ln(U)) * cos(2πV)
//! ```
//! where U, V ~ Uniform(0,1). A draw of exactly 0 for either uniform is
//! rejected and redrawn, since ln(0) = -∞.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::collections::BTreeSet;
use std::f64::consts::PI;
use tracing::warn;

/// Number of consecutive zero draws tolerated by [`standard_normal`]
pub const MAX_ZERO_RESAMPLES: usize = 64;

/// Source of independent uniform draws in [0, 1)
pub trait UniformSource {
    fn uniform(&mut self) -> f64;
}

impl<R: RngCore> UniformSource for R {
    fn uniform(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Bernoulli trial: `true` with probability `p`
///
/// `p <= 0` never succeeds and `p >= 1` always succeeds.
pub fn bernoulli<U: UniformSource + ?Sized>(rng: &mut U, p: f64) -> bool {
    rng.uniform() < p
}

/// Standard normal draw via Box-Muller
///
/// Zero uniforms are redrawn. A source that keeps returning zero past
/// [`MAX_ZERO_RESAMPLES`] yields the mean (0.0) so no NaN or infinity can
/// leave this function.
pub fn standard_normal<U: UniformSource + ?Sized>(rng: &mut U) -> f64 {
    let u = match nonzero_uniform(rng) {
        Some(u) => u,
        None => return 0.0,
    };
    let v = match nonzero_uniform(rng) {
        Some(v) => v,
        None => return 0.0,
    };
    (-2.0 * u.ln()).sqrt() * (2.0 * PI * v).cos()
}

fn nonzero_uniform<U: UniformSource + ?Sized>(rng: &mut U) -> Option<f64> {
    for _ in 0..MAX_ZERO_RESAMPLES {
        let u = rng.uniform();
        if u > 0.0 {
            return Some(u);
        }
    }
    warn!(
        attempts = MAX_ZERO_RESAMPLES,
        "uniform source returned only zeros, substituting the mean"
    );
    None
}

/// Uniform integer in `0..n` (`n` must be at least 1)
pub fn index_below<U: UniformSource + ?Sized>(rng: &mut U, n: usize) -> usize {
    debug_assert!(n > 0, "index_below needs a non-empty range");
    let idx = (rng.uniform() * n as f64) as usize;
    idx.min(n.saturating_sub(1))
}

/// Uniform draw of `k` distinct indices out of `0..n`, without replacement
///
/// # Algorithm
///
/// Robert Floyd's sampling algorithm: `k` draws regardless of `n`, so a small
/// display subset of a 2^20 enumeration costs only `k` uniforms. The result
/// is sorted ascending. `k >= n` returns every index.
pub fn sample_indices<U: UniformSource + ?Sized>(rng: &mut U, n: usize, k: usize) -> Vec<usize> {
    if k >= n {
        return (0..n).collect();
    }
    let mut chosen = BTreeSet::new();
    for j in (n - k)..n {
        let t = index_below(rng, j + 1);
        if !chosen.insert(t) {
            chosen.insert(j);
        }
    }
    chosen.into_iter().collect()
}

/// Counter-based RNG for reproducible simulations
///
/// # Algorithm
///
/// splitmix64 over an incrementing counter:
/// ```text
/// z = base_seed + counter
/// z = (z ⊕ (z >> 30)) * 0xbf58476d1ce4e5b9
/// z = (z ⊕ (z >> 27)) * 0x94d049bb133111eb
/// output = z ⊕ (z >> 31)
/// ```
#[derive(Debug, Clone)]
pub struct CounterRng {
    base_seed: u64,
    counter: u64,
}

impl CounterRng {
    pub fn new(base_seed: u64, counter: u64) -> Self {
        Self { base_seed, counter }
    }
}

impl RngCore for CounterRng {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.counter = self.counter.wrapping_add(1);
        let mut z = self.base_seed.wrapping_add(self.counter);
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9u64);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111ebu64);
        z ^ (z >> 31)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Replays a fixed list of uniforms, cycling when exhausted
///
/// Values are expected in [0, 1). An empty list behaves like a source that
/// always returns 0.0.
#[derive(Debug, Clone)]
pub struct SequenceSource {
    values: Vec<f64>,
    position: usize,
}

impl SequenceSource {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, position: 0 }
    }

    /// Number of uniforms drawn so far
    pub fn draws(&self) -> usize {
        self.position
    }
}

impl UniformSource for SequenceSource {
    fn uniform(&mut self) -> f64 {
        if self.values.is_empty() {
            self.position += 1;
            return 0.0;
        }
        let value = self.values[self.position % self.values.len()];
        self.position += 1;
        value
    }
}

/// RNG factory for reproducible runs
pub struct RngFactory {
    base_seed: u64,
}

impl RngFactory {
    pub fn new(base_seed: u64) -> Self {
        Self { base_seed }
    }

    /// Create a counter RNG for a specific stream
    pub fn create_counter_rng(&self, stream_id: u64) -> CounterRng {
        CounterRng::new(self.base_seed, stream_id)
    }

    /// Create a standard RNG for a specific stream
    pub fn create_std_rng(&self, stream_id: u64) -> StdRng {
        StdRng::seed_from_u64(self.base_seed.wrapping_add(stream_id))
    }
}

pub fn seed_rng_from_u64(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
