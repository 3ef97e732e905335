// src/frequency.rs
//! Relative frequency of successes against the number of trials
//!
//! Every discrete run trigger adds one point `(n, successes / n)`. Points
//! survive changes of `n`, so repeated triggers at growing `n` show the
//! frequency settling towards the success probability. The series only
//! restarts when the process or its success probability changes, or on an
//! explicit reset.

/// One trigger's relative frequency
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrequencyPoint {
    pub trials: usize,
    pub frequency: f64,
}

/// Points sorted by trial count plus the mean over all points
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrequencySeries {
    pub points: Vec<FrequencyPoint>,
    pub mean_frequency: f64,
}

/// Accumulates frequency points for one (process, probability) pair
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrequencyTracker {
    key: Option<(&'static str, f64)>,
    points: Vec<FrequencyPoint>,
}

impl FrequencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a point, restarting the series if `process` or `probability`
    /// differ from the points already held
    pub fn record(&mut self, process: &'static str, probability: f64, trials: usize, frequency: f64) {
        if self.key != Some((process, probability)) {
            self.points.clear();
            self.key = Some((process, probability));
        }
        let point = FrequencyPoint { trials, frequency };
        // Insert after any point with the same trial count, keeping arrival order
        let at = self.points.partition_point(|p| p.trials <= trials);
        self.points.insert(at, point);
    }

    pub fn clear(&mut self) {
        self.key = None;
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn mean_frequency(&self) -> f64 {
        if self.points.is_empty() {
            return 0.0;
        }
        self.points.iter().map(|p| p.frequency).sum::<f64>() / self.points.len() as f64
    }

    pub fn snapshot(&self) -> FrequencySeries {
        FrequencySeries {
            points: self.points.clone(),
            mean_frequency: self.mean_frequency(),
        }
    }
}
