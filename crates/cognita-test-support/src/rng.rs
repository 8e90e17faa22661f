//! Test RNG — deterministic `DeterministicRng` implementations for tests.

use cognita_core::rng::DeterministicRng;

/// A no-op RNG that always returns the lower bound. Suitable for tests that
/// do not depend on specific random values.
#[derive(Debug)]
pub struct MockRng;

impl DeterministicRng for MockRng {
    fn next_i64_range(&mut self, min: i64, _max: i64) -> i64 {
        min
    }

    fn next_index(&mut self, _len: usize) -> usize {
        0
    }
}

/// An RNG that returns values from a predetermined sequence, shared by both
/// methods. Panics if the sequence is exhausted. Values are clamped into
/// the requested range so scripted plans stay valid.
#[derive(Debug)]
pub struct SequenceRng {
    values: Vec<i64>,
    index: usize,
}

impl SequenceRng {
    /// Create a new `SequenceRng` with the given values.
    #[must_use]
    pub fn new(values: Vec<i64>) -> Self {
        Self { values, index: 0 }
    }

    fn next_raw(&mut self) -> i64 {
        let val = self.values[self.index];
        self.index += 1;
        val
    }
}

impl DeterministicRng for SequenceRng {
    fn next_i64_range(&mut self, min: i64, max: i64) -> i64 {
        self.next_raw().clamp(min, max)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn next_index(&mut self, len: usize) -> usize {
        (self.next_raw().max(0) as usize).min(len.saturating_sub(1))
    }
}
