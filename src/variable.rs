//! Integer decision variables.

use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;

use crate::domain::Domain;
use crate::error::SearchError;

static NEXT_VARIABLE_ID: AtomicU64 = AtomicU64::new(0);

fn next_id() -> u64 {
    NEXT_VARIABLE_ID.fetch_add(1, Ordering::Relaxed)
}

/// A single integer decision variable: an id, an optional name, a fixed
/// domain, a current value that is always a member of that domain, and an
/// `index` used only when the model is solved in permutation mode.
#[derive(Debug, Clone)]
pub struct Variable {
    id: u64,
    name: Option<String>,
    domain: Domain,
    value: i64,
    index: usize,
}

impl Variable {
    /// Constructs a variable over an explicit domain, checking that
    /// `initial_value` belongs to it.
    pub fn new(name: Option<String>, domain: Domain, initial_value: i64) -> Result<Self, SearchError> {
        if !domain.contains(initial_value) {
            return Err(SearchError::OutOfDomain { variable_id: 0, value: initial_value });
        }
        let id = next_id();
        Ok(Self { id, name, domain, value: initial_value, index: 0 })
    }

    /// Convenience constructor over an explicit value list.
    pub fn from_values(name: Option<String>, values: Vec<i64>, initial_value: i64) -> Result<Self, SearchError> {
        Self::new(name, Domain::from_values(values), initial_value)
    }

    /// Convenience constructor over the interval `[start, start + size)`.
    pub fn from_interval(name: Option<String>, size: usize, start: i64, initial_value: i64) -> Result<Self, SearchError> {
        Self::new(name, Domain::from_interval(size, start), initial_value)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    /// Commits `value` as the variable's current value.
    ///
    /// Fails with [`SearchError::OutOfDomain`] if `value` is not a member of
    /// the domain; the variable is left unchanged in that case.
    pub fn set_value(&mut self, value: i64) -> Result<(), SearchError> {
        if !self.domain.contains(value) {
            return Err(SearchError::OutOfDomain { variable_id: self.id, value });
        }
        self.value = value;
        Ok(())
    }

    pub fn random_value(&self, rng: &mut impl Rng) -> i64 {
        self.domain.random_value(rng)
    }

    pub fn index_of(&self, value: i64) -> Result<usize, SearchError> {
        self.domain.index_of(value).ok_or(SearchError::OutOfDomain { variable_id: self.id, value })
    }

    pub fn value_at(&self, index: usize) -> Result<i64, SearchError> {
        self.domain
            .value_at(index)
            .ok_or(SearchError::OutOfRange { index, size: self.domain.size() })
    }

    pub fn possible_values(&self) -> &[i64] {
        self.domain.possible_values()
    }

    /// Samples a value uniformly from the domain and commits it.
    pub fn pick_random_value(&mut self, rng: &mut impl Rng) -> i64 {
        let v = self.random_value(rng);
        self.value = v;
        v
    }

    pub fn partial_domain(&self, range: usize) -> Vec<i64> {
        self.domain.partial_domain(self.value, range)
    }
}
