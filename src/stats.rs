//! Per-iteration and per-timer-event sample recording (ambient addition,
//! A7), and a best-effort file writer for them. Modeled on the teacher's
//! explicit binary reader/writer pattern (see its rollout-record module):
//! a plain data struct, a `write_to`/`read_from` pair, and round-trip tests.

use std::io::{self, Write};
use std::time::Duration;

use tracing::warn;

use crate::config::NrpaConfig;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IterationSample {
    pub iter: u32,
    pub at: Duration,
    pub best_score: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimerSample {
    pub event_idx: u32,
    pub at: Duration,
    pub best_score: f64,
}

#[derive(Clone, Debug, Default)]
pub struct StatsCollector {
    pub iterations: Vec<IterationSample>,
    pub timer_events: Vec<TimerSample>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_iteration(&mut self, sample: IterationSample) {
        self.iterations.push(sample);
    }

    pub fn record_timer_event(&mut self, sample: TimerSample) {
        self.timer_events.push(sample);
    }

    /// Writes both series to `plots/dat/nrpa_stats_<params>[.tag]`, matching
    /// the filename scheme of §6.3. Failures are logged and swallowed: stats
    /// I/O never aborts a search (§7).
    pub fn write_best_effort(&self, config: &NrpaConfig) {
        if let Err(err) = self.write(config) {
            warn!(error = %err, "failed to write NRPA stats file");
        }
    }

    fn base_filename(config: &NrpaConfig) -> String {
        let mut name = format!(
            "nrpa_stats_nbRun.{}_level.{}_nbIter.{}_timeout.{}_nbThreads.{}",
            config.num_run, config.num_level, config.num_iter, config.timeout_secs, config.num_thread
        );
        if !config.tag.is_empty() {
            name.push('.');
            name.push_str(&config.tag);
        }
        name
    }

    fn write(&self, config: &NrpaConfig) -> io::Result<()> {
        std::fs::create_dir_all("plots/dat")?;
        let base = Self::base_filename(config);

        let mut iter_file = std::fs::File::create(format!("plots/dat/{base}.dat"))?;
        writeln!(iter_file, "# iteration stats")?;
        for s in &self.iterations {
            writeln!(iter_file, "{} {} {}", s.iter, s.at.as_secs_f64(), s.best_score)?;
        }

        let mut timer_file = std::fs::File::create(format!("plots/dat/{base}.dat.timer"))?;
        writeln!(timer_file, "# timer-event stats")?;
        for s in &self.timer_events {
            writeln!(timer_file, "{} {} {}", s.event_idx, s.at.as_secs_f64(), s.best_score)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collector_accumulates_both_series() {
        let mut stats = StatsCollector::new();
        stats.record_iteration(IterationSample {
            iter: 0,
            at: Duration::from_millis(1),
            best_score: 1.0,
        });
        stats.record_timer_event(TimerSample {
            event_idx: 0,
            at: Duration::from_secs(1),
            best_score: 1.0,
        });
        assert_eq!(stats.iterations.len(), 1);
        assert_eq!(stats.timer_events.len(), 1);
    }

    #[test]
    fn base_filename_includes_tag_only_when_present() {
        let mut config = NrpaConfig::default();
        config.tag.clear();
        let untagged = StatsCollector::base_filename(&config);
        assert!(!untagged.ends_with(".run1"));

        config.tag = "run1".into();
        let tagged = StatsCollector::base_filename(&config);
        assert!(tagged.ends_with(".run1"));
        assert_eq!(tagged, format!("{untagged}.run1"));
    }
}
