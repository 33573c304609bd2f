//! The configuration surface (§6.3, ambient addition A5): a plain data type
//! plus validation. Building a CLI around it (argument parsing, `--help`
//! text) is an external collaborator's job, same as the teacher's
//! `mcts::Behaviour` is a config struct with no argument parser attached.

use crate::constants::{MAX_ITER, MAX_LEVEL, MAX_THREADS};
use crate::error::NrpaError;

#[derive(Clone, Debug, PartialEq)]
pub struct NrpaConfig {
    /// Number of independent top-level searches.
    pub num_run: u32,
    /// Top level of recursion (`0` is a single playout).
    pub num_level: usize,
    /// Iterations `N` run at every level.
    pub num_iter: u32,
    /// Wall-clock cut-off in seconds; `0` means no timeout.
    pub timeout_secs: u64,
    /// Worker count: `1` is sequential, `0` picks a pool-default size.
    pub num_thread: usize,
    /// The level at which batching onto the worker pool occurs.
    pub parallel_level: usize,
    /// Whether to emit per-iteration and per-timer-event samples.
    pub stats: bool,
    /// Filename suffix for stats outputs.
    pub tag: String,
}

impl Default for NrpaConfig {
    fn default() -> Self {
        Self {
            num_run: 1,
            num_level: 2,
            num_iter: 100,
            timeout_secs: 0,
            num_thread: 1,
            parallel_level: 0,
            stats: false,
            tag: String::new(),
        }
    }
}

impl NrpaConfig {
    /// Enforces §6.3's constraints; returns the effective worker count (the
    /// `num_thread: 0` "pool default" sentinel resolved against the number
    /// of available CPUs).
    pub fn validate(&self) -> Result<usize, NrpaError> {
        if self.num_run < 1 {
            return Err(NrpaError::Config("num_run must be >= 1".into()));
        }
        if self.num_level >= MAX_LEVEL {
            return Err(NrpaError::Config(format!(
                "num_level ({}) must be < {MAX_LEVEL}",
                self.num_level
            )));
        }
        if self.num_iter >= MAX_ITER {
            return Err(NrpaError::Config(format!(
                "num_iter ({}) must be < {MAX_ITER}",
                self.num_iter
            )));
        }
        if self.num_thread >= MAX_THREADS {
            return Err(NrpaError::Config(format!(
                "num_thread ({}) must be < {MAX_THREADS}",
                self.num_thread
            )));
        }
        let effective_threads = if self.num_thread == 0 {
            std::thread::available_parallelism()
                .map(std::num::NonZeroUsize::get)
                .unwrap_or(1)
        } else {
            self.num_thread
        };

        if effective_threads > 1 && self.parallel_level >= self.num_level {
            return Err(NrpaError::Config(format!(
                "parallel_level ({}) must be < num_level ({})",
                self.parallel_level, self.num_level
            )));
        }

        Ok(effective_threads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(NrpaConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_level_at_or_above_max() {
        let mut config = NrpaConfig::default();
        config.num_level = MAX_LEVEL;
        assert!(matches!(config.validate(), Err(NrpaError::Config(_))));
    }

    #[test]
    fn rejects_iter_at_or_above_max() {
        let mut config = NrpaConfig::default();
        config.num_iter = MAX_ITER;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_thread_at_or_above_max() {
        let mut config = NrpaConfig::default();
        config.num_thread = MAX_THREADS;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_parallel_level_outside_recursion_range() {
        let mut config = NrpaConfig::default();
        config.num_thread = 4;
        config.num_level = 2;
        config.parallel_level = 2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_num_thread_resolves_to_available_parallelism() {
        let mut config = NrpaConfig::default();
        config.num_thread = 0;
        let effective = config.validate().unwrap();
        assert!(effective >= 1);
    }

    #[test]
    fn pool_default_thread_count_still_checks_parallel_level_when_resolved_above_one() {
        let mut config = NrpaConfig::default();
        config.num_thread = 0;
        config.num_level = 2;
        config.parallel_level = 5;
        // Only a meaningful regression check on machines with >1 CPU, where
        // `num_thread: 0` resolves to something other than sequential.
        if std::thread::available_parallelism().map(std::num::NonZeroUsize::get).unwrap_or(1) > 1 {
            assert!(config.validate().is_err());
        }
    }
}
