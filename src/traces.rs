//! Label-set sequences produced by trajectories.
//!
//! A trace is the projection of a trajectory to the labels of its states,
//! the input consumed by temporal-logic evaluation. [`FiniteTrace`] is a
//! plain finite sequence; [`InfiniteTrace`] is a lasso, a finite prefix
//! followed by an infinitely repeating suffix.

use crate::types::AtomicProposition;

/// A finite sequence of label sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiniteTrace(Vec<Vec<AtomicProposition>>);

impl FiniteTrace {
    pub fn new(steps: Vec<Vec<AtomicProposition>>) -> Self {
        FiniteTrace(steps)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, k: usize) -> Option<&[AtomicProposition]> {
        self.0.get(k).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = &[AtomicProposition]> {
        self.0.iter().map(Vec::as_slice)
    }
}

/// An ultimately periodic sequence of label sets. The suffix must be
/// non-empty; positions past the prefix wrap around it forever.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfiniteTrace {
    prefix: Vec<Vec<AtomicProposition>>,
    suffix: Vec<Vec<AtomicProposition>>,
}

impl InfiniteTrace {
    pub fn new(prefix: Vec<Vec<AtomicProposition>>, suffix: Vec<Vec<AtomicProposition>>) -> Self {
        assert!(!suffix.is_empty(), "repeating suffix must be non-empty");
        InfiniteTrace { prefix, suffix }
    }

    pub fn get(&self, k: usize) -> &[AtomicProposition] {
        if k < self.prefix.len() {
            &self.prefix[k]
        } else {
            &self.suffix[(k - self.prefix.len()) % self.suffix.len()]
        }
    }

    pub fn prefix(&self) -> &[Vec<AtomicProposition>] {
        &self.prefix
    }

    pub fn suffix(&self) -> &[Vec<AtomicProposition>] {
        &self.suffix
    }
}
