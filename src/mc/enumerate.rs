// src/mc/enumerate.rs
//! Exact enumeration of every binary outcome sequence
//!
//! For n trials the integers `0..2^n` are read as outcome sequences,
//! most-significant bit first: bit `n-1-j` of the index is trial `j+1`, and a
//! set bit is a success. Index 0 is the all-failure path and index `2^n - 1`
//! the all-success path. No probability weighting is applied; each sequence
//! appears exactly once.

use crate::error::{SimError, SimResult};
use crate::models::{DiscreteProcess, Trajectory};

/// Largest trial count that can be enumerated (2^20 ≈ 1M sequences)
pub const MAX_ENUMERATION_TRIALS: usize = 20;

pub struct ExactEnumerator<'a, P: DiscreteProcess + ?Sized> {
    process: &'a P,
    trials: usize,
    next: u64,
}

impl<'a, P: DiscreteProcess + ?Sized> ExactEnumerator<'a, P> {
    pub fn new(process: &'a P) -> SimResult<Self> {
        let trials = process.steps();
        if trials > MAX_ENUMERATION_TRIALS {
            return Err(SimError::CapacityExceeded {
                what: "exact enumeration trials".to_string(),
                requested: trials as u64,
                cap: MAX_ENUMERATION_TRIALS as u64,
            });
        }
        Ok(ExactEnumerator {
            process,
            trials,
            next: 0,
        })
    }

    /// Number of sequences, `2^n`
    pub fn total(&self) -> u64 {
        1u64 << self.trials
    }

    fn success_at(&self, index: u64, trial: usize) -> bool {
        (index >> (self.trials - 1 - trial)) & 1 == 1
    }

    /// Cumulative trajectory of the sequence encoded by `index`
    pub fn trajectory_at(&self, index: u64) -> Trajectory<i64> {
        debug_assert!(index < self.total());
        let mut values = Vec::with_capacity(self.trials + 1);
        let mut current = self.process.start();
        values.push(current);
        for trial in 0..self.trials {
            current += self.process.increment(self.success_at(index, trial));
            values.push(current);
        }
        Trajectory::new(values)
    }

    /// Terminal value of the sequence encoded by `index`, from its popcount
    pub fn terminal_at(&self, index: u64) -> i64 {
        self.process.outcome_for_successes(index.count_ones() as usize)
    }

    /// Terminal values of every sequence, in index order
    pub fn terminals(&self) -> impl Iterator<Item = i64> + '_ {
        (0..self.total()).map(move |i| self.terminal_at(i))
    }
}

impl<'a, P: DiscreteProcess + ?Sized> Iterator for ExactEnumerator<'a, P> {
    type Item = Trajectory<i64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.total() {
            return None;
        }
        let traj = self.trajectory_at(self.next);
        self.next += 1;
        Some(traj)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.total() - self.next.min(self.total())) as usize;
        (remaining, Some(remaining))
    }
}
