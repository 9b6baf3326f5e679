//! The finite, ordered integer domain a [`crate::variable::Variable`] ranges over.

use rand::Rng;

/// A fixed, ordered sequence of admissible integer values.
///
/// Built once, at model-construction time, and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    values: Vec<i64>,
}

impl Domain {
    /// Builds a domain from an explicit, already-ordered list of values.
    pub fn from_values(values: Vec<i64>) -> Self {
        Self { values }
    }

    /// Builds the interval `[start, start + size)`.
    pub fn from_interval(size: usize, start: i64) -> Self {
        Self { values: (0..size as i64).map(|i| start + i).collect() }
    }

    pub fn size(&self) -> usize {
        self.values.len()
    }

    pub fn contains(&self, value: i64) -> bool {
        self.values.contains(&value)
    }

    pub fn possible_values(&self) -> &[i64] {
        &self.values
    }

    pub fn index_of(&self, value: i64) -> Option<usize> {
        self.values.iter().position(|&v| v == value)
    }

    pub fn value_at(&self, index: usize) -> Option<i64> {
        self.values.get(index).copied()
    }

    pub fn random_value(&self, rng: &mut impl Rng) -> i64 {
        self.values[rng.random_range(0..self.values.len())]
    }

    /// A centered window of up to `range` values around `center`, wrapping
    /// around the domain's ends rather than truncating at the boundary.
    pub fn partial_domain(&self, center: i64, range: usize) -> Vec<i64> {
        let n = self.values.len();
        if range >= n {
            return self.values.clone();
        }
        let center_idx = self.index_of(center).unwrap_or(0);
        let half = range / 2;
        (0..range)
            .map(|k| self.values[(center_idx + n + k - half) % n])
            .collect()
    }
}
