//! Sparse `code -> logit` map (C1). Unknown codes implicitly hold logit `0`.
//!
//! The stored values are logits, not probabilities: a probability
//! distribution over a step's legal codes only exists once you run them
//! through a softmax (see [`crate::playout`] and [`crate::adapt`]).

use std::collections::HashMap;

pub type MoveCode = u32;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Policy {
    logits: HashMap<MoveCode, f64>,
}

impl Policy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored logit, or `0.0` if `code` has never been touched.
    /// Total: never fails.
    #[inline]
    pub fn prob(&self, code: MoveCode) -> f64 {
        self.logits.get(&code).copied().unwrap_or(0.0)
    }

    /// Overwrites the logit for `code`.
    #[inline]
    pub fn set(&mut self, code: MoveCode, value: f64) {
        self.logits.insert(code, value);
    }

    /// `logit <- (logit or 0) + delta`; returns the new value.
    #[inline]
    pub fn update(&mut self, code: MoveCode, delta: f64) -> f64 {
        let entry = self.logits.entry(code).or_insert(0.0);
        *entry += delta;
        *entry
    }

    pub fn len(&self) -> usize {
        self.logits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_code_has_zero_logit() {
        let policy = Policy::new();
        assert_eq!(policy.prob(42), 0.0);
    }

    #[test]
    fn set_overwrites() {
        let mut policy = Policy::new();
        policy.set(1, 3.5);
        assert_eq!(policy.prob(1), 3.5);
        policy.set(1, -1.0);
        assert_eq!(policy.prob(1), -1.0);
    }

    #[test]
    fn update_inserts_then_accumulates() {
        let mut policy = Policy::new();
        assert_eq!(policy.update(7, 2.0), 2.0);
        assert_eq!(policy.update(7, 0.5), 2.5);
        assert_eq!(policy.prob(7), 2.5);
    }

    #[test]
    fn update_on_untouched_code_starts_from_zero() {
        let mut policy = Policy::new();
        assert_eq!(policy.update(3, -4.0), -4.0);
    }
}
