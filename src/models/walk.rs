// src/models/walk.rs
//! Discrete random walks
//!
//! # Bernoulli cumulative walk
//! ```text
//! S_0 = 0,  S_i = S_{i-1} + B_i,  B_i ~ Bernoulli(p)
//! ```
//! Non-decreasing, `S_n ∈ [0, n]`, `S_n ~ Binomial(n, p)`.
//!
//! # Signed walk
//! ```text
//! S_0 = 0,  S_i = S_{i-1} + X_i,  X_i = +1 w.p. q, -1 otherwise
//! ```
//! `S_n = 2K - n` with `K ~ Binomial(n, q)`, so `S_n` always has the parity
//! of `n`.

use super::model::{DiscreteProcess, ProcessModel};
use crate::params::{BernoulliParams, SignedWalkParams};
use crate::rng::{bernoulli, UniformSource};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BernoulliWalk {
    pub trials: usize,
    pub p: f64,
}

impl BernoulliWalk {
    pub fn new(trials: usize, p: f64) -> Self {
        BernoulliWalk {
            trials: trials.max(1),
            p: if p.is_nan() { 0.5 } else { p.clamp(0.0, 1.0) },
        }
    }
}

impl From<&BernoulliParams> for BernoulliWalk {
    fn from(params: &BernoulliParams) -> Self {
        BernoulliWalk::new(params.trials, params.p)
    }
}

impl ProcessModel for BernoulliWalk {
    type Value = i64;

    fn steps(&self) -> usize {
        self.trials
    }

    fn start(&self) -> i64 {
        0
    }

    fn step<U: UniformSource + ?Sized>(&self, current: i64, rng: &mut U) -> i64 {
        current + self.increment(bernoulli(rng, self.p))
    }

    fn expected_path(&self) -> Vec<f64> {
        (0..=self.trials).map(|i| i as f64 * self.p).collect()
    }
}

impl DiscreteProcess for BernoulliWalk {
    fn increment(&self, success: bool) -> i64 {
        i64::from(success)
    }

    fn success_probability(&self) -> f64 {
        self.p
    }

    fn outcome_for_successes(&self, successes: usize) -> i64 {
        successes as i64
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SignedWalk {
    pub trials: usize,
    pub q: f64, // Up-step probability
}

impl SignedWalk {
    pub fn new(trials: usize, q: f64) -> Self {
        SignedWalk {
            trials: trials.max(1),
            q: if q.is_nan() { 0.5 } else { q.clamp(0.0, 1.0) },
        }
    }
}

impl From<&SignedWalkParams> for SignedWalk {
    fn from(params: &SignedWalkParams) -> Self {
        SignedWalk::new(params.trials, params.step_probability())
    }
}

impl ProcessModel for SignedWalk {
    type Value = i64;

    fn steps(&self) -> usize {
        self.trials
    }

    fn start(&self) -> i64 {
        0
    }

    fn step<U: UniformSource + ?Sized>(&self, current: i64, rng: &mut U) -> i64 {
        current + self.increment(bernoulli(rng, self.q))
    }

    fn expected_path(&self) -> Vec<f64> {
        let drift = 2.0 * self.q - 1.0;
        (0..=self.trials).map(|i| i as f64 * drift).collect()
    }
}

impl DiscreteProcess for SignedWalk {
    fn increment(&self, success: bool) -> i64 {
        if success {
            1
        } else {
            -1
        }
    }

    fn success_probability(&self) -> f64 {
        self.q
    }

    fn outcome_for_successes(&self, successes: usize) -> i64 {
        2 * successes as i64 - self.trials as i64
    }
}

/// Either discrete walk, for code that drives both through one path
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DiscreteWalk {
    Bernoulli(BernoulliWalk),
    Signed(SignedWalk),
}

impl ProcessModel for DiscreteWalk {
    type Value = i64;

    fn steps(&self) -> usize {
        match self {
            DiscreteWalk::Bernoulli(w) => w.steps(),
            DiscreteWalk::Signed(w) => w.steps(),
        }
    }

    fn start(&self) -> i64 {
        0
    }

    fn step<U: UniformSource + ?Sized>(&self, current: i64, rng: &mut U) -> i64 {
        match self {
            DiscreteWalk::Bernoulli(w) => w.step(current, rng),
            DiscreteWalk::Signed(w) => w.step(current, rng),
        }
    }

    fn expected_path(&self) -> Vec<f64> {
        match self {
            DiscreteWalk::Bernoulli(w) => w.expected_path(),
            DiscreteWalk::Signed(w) => w.expected_path(),
        }
    }
}

impl DiscreteProcess for DiscreteWalk {
    fn increment(&self, success: bool) -> i64 {
        match self {
            DiscreteWalk::Bernoulli(w) => w.increment(success),
            DiscreteWalk::Signed(w) => w.increment(success),
        }
    }

    fn success_probability(&self) -> f64 {
        match self {
            DiscreteWalk::Bernoulli(w) => w.success_probability(),
            DiscreteWalk::Signed(w) => w.success_probability(),
        }
    }

    fn outcome_for_successes(&self, successes: usize) -> i64 {
        match self {
            DiscreteWalk::Bernoulli(w) => w.outcome_for_successes(successes),
            DiscreteWalk::Signed(w) => w.outcome_for_successes(successes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{seed_rng_from_u64, SequenceSource};

    #[test]
    fn test_bernoulli_walk_shape() {
        let walk = BernoulliWalk::new(50, 0.3);
        let mut rng = seed_rng_from_u64(11);
        for _ in 0..200 {
            let traj = walk.simulate(&mut rng);
            assert_eq!(traj.len(), 51);
            assert_eq!(traj.start(), 0);
            assert!(traj.values().windows(2).all(|w| w[1] - w[0] == 0 || w[1] - w[0] == 1));
            assert!((0..=50).contains(&traj.terminal()));
        }
    }

    #[test]
    fn test_bernoulli_walk_scripted() {
        // Step is a success when the uniform is below p
        let walk = BernoulliWalk::new(4, 0.5);
        let mut src = SequenceSource::new(vec![0.1, 0.9, 0.4, 0.6]);
        let traj = walk.simulate(&mut src);
        assert_eq!(traj.values(), &[0, 1, 1, 2, 2]);
    }

    #[test]
    fn test_signed_walk_parity() {
        let walk = SignedWalk::new(7, 0.6);
        let mut rng = seed_rng_from_u64(5);
        for _ in 0..200 {
            let traj = walk.simulate(&mut rng);
            assert_eq!(traj.len(), 8);
            assert!(traj.values().windows(2).all(|w| (w[1] - w[0]).abs() == 1));
            assert_eq!(traj.terminal().rem_euclid(2), 1);
            assert!((-7..=7).contains(&traj.terminal()));
        }
    }

    #[test]
    fn test_signed_walk_from_compound_probability() {
        let params = SignedWalkParams {
            trials: 8,
            p: 1.0,
            repetitions: 3,
        };
        let walk = SignedWalk::from(&params);
        assert_eq!(walk.q, 0.0);
        let mut rng = seed_rng_from_u64(5);
        assert_eq!(walk.simulate(&mut rng).terminal(), -8);
    }

    #[test]
    fn test_outcome_ranges() {
        assert_eq!(BernoulliWalk::new(6, 0.5).outcome_range(), (0, 6));
        assert_eq!(SignedWalk::new(6, 0.5).outcome_range(), (-6, 6));
    }

    #[test]
    fn test_success_fraction() {
        let walk = BernoulliWalk::new(8, 0.5);
        assert_eq!(walk.success_fraction(2.0), 0.25);
        let walk = SignedWalk::new(8, 0.5);
        // S = 2k - n, so S = -4 means k = 2
        assert_eq!(walk.success_fraction(-4.0), 0.25);
        assert_eq!(walk.success_fraction(8.0), 1.0);
    }

    #[test]
    fn test_expected_paths() {
        let path = BernoulliWalk::new(4, 0.25).expected_path();
        assert_eq!(path, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        let path = SignedWalk::new(2, 0.75).expected_path();
        assert_eq!(path, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_constructor_clamps() {
        let walk = BernoulliWalk::new(0, 3.0);
        assert_eq!(walk.trials, 1);
        assert_eq!(walk.p, 1.0);
        let walk = SignedWalk::new(3, f64::NAN);
        assert_eq!(walk.q, 0.5);
    }
}
