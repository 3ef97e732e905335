// src/models/trajectory.rs

/// Ordered sequence of cumulative states produced by one run
///
/// Index 0 is the deterministic start state. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trajectory<T> {
    values: Vec<T>,
}

impl<T: Copy> Trajectory<T> {
    pub(crate) fn new(values: Vec<T>) -> Self {
        debug_assert!(!values.is_empty(), "a trajectory always holds its start state");
        Trajectory { values }
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn start(&self) -> T {
        self.values[0]
    }

    /// Terminal outcome (the last value)
    pub fn terminal(&self) -> T {
        self.values[self.values.len() - 1]
    }

    /// Number of stored states (`steps + 1`)
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<T> {
        self.values
    }
}
