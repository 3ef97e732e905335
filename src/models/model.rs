// src/models/model.rs
use super::trajectory::Trajectory;
use crate::rng::UniformSource;

/// A process simulated one step at a time from a fixed start state
pub trait ProcessModel {
    type Value: Copy;

    /// Number of steps per trajectory (the trajectory holds `steps() + 1` values)
    fn steps(&self) -> usize;

    fn start(&self) -> Self::Value;

    fn step<U: UniformSource + ?Sized>(&self, current: Self::Value, rng: &mut U) -> Self::Value;

    /// Expected state at every step index, aligned with a trajectory
    fn expected_path(&self) -> Vec<f64>;

    fn simulate<U: UniformSource + ?Sized>(&self, rng: &mut U) -> Trajectory<Self::Value> {
        let mut values = Vec::with_capacity(self.steps() + 1);
        let mut current = self.start();
        values.push(current);
        for _ in 0..self.steps() {
            current = self.step(current, rng);
            values.push(current);
        }
        Trajectory::new(values)
    }

    /// Terminal value of one run without storing the path
    fn simulate_terminal<U: UniformSource + ?Sized>(&self, rng: &mut U) -> Self::Value {
        let mut current = self.start();
        for _ in 0..self.steps() {
            current = self.step(current, rng);
        }
        current
    }
}

/// Integer-valued walk built from `steps()` binary trials
///
/// The terminal value is an affine function of the number of successes `k`,
/// which is what lets the theoretical curve be a binomial PMF and the exact
/// enumerator read trials straight from bit patterns.
pub trait DiscreteProcess: ProcessModel<Value = i64> {
    /// Increment contributed by one trial outcome
    fn increment(&self, success: bool) -> i64;

    /// Per-trial success probability used by the reference curve
    fn success_probability(&self) -> f64;

    /// Terminal value reached after `successes` successes
    fn outcome_for_successes(&self, successes: usize) -> i64;

    /// Smallest and largest reachable terminal value (inclusive)
    fn outcome_range(&self) -> (i64, i64) {
        (
            self.outcome_for_successes(0),
            self.outcome_for_successes(self.steps()),
        )
    }

    /// Fraction of successful trials behind `outcome` (a terminal value or
    /// a mean of terminal values), in `[0, 1]`
    fn success_fraction(&self, outcome: f64) -> f64 {
        let (lo, hi) = self.outcome_range();
        if hi <= lo {
            return 0.0;
        }
        ((outcome - lo as f64) / (hi - lo) as f64).clamp(0.0, 1.0)
    }
}
