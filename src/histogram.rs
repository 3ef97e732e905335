// src/histogram.rs
//! Histograms of terminal outcomes
//!
//! Discrete walks get one bin per integer outcome. Brownian terminals get a
//! fixed number of equal-width bins over the observed range padded by 5% on
//! each side; values outside the bins are clamped into the edge bins.

use crate::models::DiscreteProcess;
use tracing::warn;

/// Fraction of the observed range added on each side of continuous bins
pub const RANGE_PADDING: f64 = 0.05;

/// Bin layout and counts handed to the presentation sink as parallel arrays
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HistogramSnapshot {
    pub labels: Vec<f64>,
    /// True per-bin count (`previous + most_recent`)
    pub counts: Vec<u64>,
    /// Contribution of the latest single run only
    pub most_recent: Vec<u64>,
    pub bin_width: f64,
}

impl HistogramSnapshot {
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// One bin per integer outcome in `[lo, hi]`
///
/// Counts are held as two parallel counters per bin: everything aggregated
/// before the latest single run (`previous`) and that run's own contribution
/// (`most_recent`). Their sum is the true count.
#[derive(Clone, Debug, PartialEq)]
pub struct DiscreteHistogram {
    lo: i64,
    previous: Vec<u64>,
    most_recent: Vec<u64>,
}

impl DiscreteHistogram {
    pub fn with_range(lo: i64, hi: i64) -> Self {
        let (lo, hi) = if hi < lo { (hi, lo) } else { (lo, hi) };
        let bins = (hi - lo + 1) as usize;
        DiscreteHistogram {
            lo,
            previous: vec![0; bins],
            most_recent: vec![0; bins],
        }
    }

    pub fn for_process<P: DiscreteProcess + ?Sized>(process: &P) -> Self {
        let (lo, hi) = process.outcome_range();
        Self::with_range(lo, hi)
    }

    pub fn bins(&self) -> usize {
        self.previous.len()
    }

    pub fn labels(&self) -> Vec<i64> {
        (0..self.bins() as i64).map(|i| self.lo + i).collect()
    }

    fn bin_index(&self, outcome: i64) -> usize {
        let last = self.bins() - 1;
        let offset = outcome - self.lo;
        if offset < 0 || offset as usize > last {
            warn!(outcome, lo = self.lo, bins = self.bins(), "outcome outside histogram, clamped to edge bin");
            return if offset < 0 { 0 } else { last };
        }
        offset as usize
    }

    /// Incremental single-run update
    ///
    /// The previous most-recent contribution is folded into the accumulated
    /// counts and this run becomes the only one flagged as most recent.
    pub fn record_run(&mut self, outcome: i64) {
        for (prev, recent) in self.previous.iter_mut().zip(self.most_recent.iter_mut()) {
            *prev += *recent;
            *recent = 0;
        }
        let idx = self.bin_index(outcome);
        self.most_recent[idx] = 1;
    }

    /// Batch rebuild: clear and recount from a full set of outcomes
    pub fn rebuild<I: IntoIterator<Item = i64>>(&mut self, outcomes: I) {
        self.clear();
        for outcome in outcomes {
            let idx = self.bin_index(outcome);
            self.previous[idx] += 1;
        }
    }

    /// Add one outcome to the accumulated counts without touching the
    /// most-recent overlay
    pub fn add(&mut self, outcome: i64) {
        let idx = self.bin_index(outcome);
        self.previous[idx] += 1;
    }

    pub fn clear(&mut self) {
        self.previous.iter_mut().for_each(|c| *c = 0);
        self.most_recent.iter_mut().for_each(|c| *c = 0);
    }

    pub fn counts(&self) -> Vec<u64> {
        self.previous
            .iter()
            .zip(&self.most_recent)
            .map(|(p, r)| p + r)
            .collect()
    }

    pub fn previous(&self) -> &[u64] {
        &self.previous
    }

    pub fn most_recent(&self) -> &[u64] {
        &self.most_recent
    }

    pub fn total(&self) -> u64 {
        self.previous.iter().sum::<u64>() + self.most_recent.iter().sum::<u64>()
    }

    pub fn count_of(&self, outcome: i64) -> u64 {
        let offset = outcome - self.lo;
        if offset < 0 || offset as usize >= self.bins() {
            return 0;
        }
        let idx = offset as usize;
        self.previous[idx] + self.most_recent[idx]
    }

    pub fn snapshot(&self) -> HistogramSnapshot {
        HistogramSnapshot {
            labels: self.labels().into_iter().map(|v| v as f64).collect(),
            counts: self.counts(),
            most_recent: self.most_recent.clone(),
            bin_width: 1.0,
        }
    }
}

/// Equal-width bins over a padded observed range
#[derive(Clone, Debug, PartialEq)]
pub struct ContinuousHistogram {
    left_edge: f64,
    bin_width: f64,
    counts: Vec<u64>,
}

impl ContinuousHistogram {
    /// Bin `values` into `bins` buckets (at least one)
    ///
    /// The span is `[min - 5%·range, max + 5%·range]`. With a zero range
    /// (every value equal) the span is a unit-width window centred on the
    /// value. Non-finite values are ignored when sizing the span and
    /// clamped like any other out-of-range value.
    pub fn from_values(values: &[f64], bins: usize) -> Self {
        let bins = bins.max(1);
        let (min, max) = values
            .iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

        let (left, right) = if !min.is_finite() {
            (-0.5, 0.5)
        } else if max - min > 0.0 {
            let pad = (max - min) * RANGE_PADDING;
            (min - pad, max + pad)
        } else {
            (min - 0.5, min + 0.5)
        };

        let mut hist = ContinuousHistogram {
            left_edge: left,
            bin_width: (right - left) / bins as f64,
            counts: vec![0; bins],
        };
        for &v in values {
            let idx = hist.bin_index(v);
            hist.counts[idx] += 1;
        }
        hist
    }

    /// Bin holding `value`, clamped to the edge bins
    pub fn bin_index(&self, value: f64) -> usize {
        let last = self.counts.len() - 1;
        let raw = ((value - self.left_edge) / self.bin_width).floor();
        if raw.is_nan() || raw < 0.0 {
            0
        } else if raw >= last as f64 {
            last
        } else {
            raw as usize
        }
    }

    pub fn bin_width(&self) -> f64 {
        self.bin_width
    }

    pub fn left_edge(&self) -> f64 {
        self.left_edge
    }

    pub fn right_edge(&self) -> f64 {
        self.left_edge + self.bin_width * self.counts.len() as f64
    }

    pub fn centers(&self) -> Vec<f64> {
        (0..self.counts.len())
            .map(|i| self.left_edge + (i as f64 + 0.5) * self.bin_width)
            .collect()
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn snapshot(&self) -> HistogramSnapshot {
        HistogramSnapshot {
            labels: self.centers(),
            counts: self.counts.clone(),
            most_recent: vec![0; self.counts.len()],
            bin_width: self.bin_width,
        }
    }
}
