//! Bounded history of analysis results.
//!
//! The analysis layer never writes here. Callers own a ring, push the
//! results they want to keep, and decide how to share it.

use crate::result::AnalysisResult;
use std::collections::VecDeque;

/// Smallest allowed ring capacity.
pub const MIN_CAPACITY: usize = 5;

/// Largest allowed ring capacity.
pub const MAX_CAPACITY: usize = 50;

/// A fixed-capacity ring buffer of results; the oldest entry is evicted first.
#[derive(Debug, Clone)]
pub struct HistoryRing {
    capacity: usize,
    entries: VecDeque<AnalysisResult>,
}

impl HistoryRing {
    /// Creates a ring, clamping `capacity` into `MIN_CAPACITY..=MAX_CAPACITY`.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(MIN_CAPACITY, MAX_CAPACITY);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Appends a result, evicting the oldest one when full.
    pub fn push(&mut self, result: AnalysisResult) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(result);
    }

    /// Appends several results in order.
    pub fn extend(&mut self, results: impl IntoIterator<Item = AnalysisResult>) {
        for result in results {
            self.push(result);
        }
    }

    /// Iterates from newest to oldest.
    pub fn newest_first(&self) -> impl Iterator<Item = &AnalysisResult> {
        self.entries.iter().rev()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
