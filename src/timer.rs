//! Cooperative termination (C9): a monotonic `done` flag guarded by a
//! mutex/condvar pair, plus a background timer thread that wakes on a
//! doubling schedule (`1, 2, 4, ...` seconds, capped at the timeout) to
//! record timer-event stats samples and finally flip `done`.

use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::constants::MAX_TIME_EVENTS;

/// Shared between the driver (which polls it) and the timer thread (which
/// sets it). `done` only ever transitions false -> true.
#[derive(Clone)]
pub struct DoneSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl DoneSignal {
    pub fn new() -> Self {
        Self {
            inner: Arc::new((Mutex::new(false), Condvar::new())),
        }
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        *self.inner.0.lock().unwrap()
    }

    /// Flips `done` to true, waking anything blocked in [`DoneSignal::wait_until`].
    /// Monotonic: calling this more than once has no further effect.
    pub fn mark_done(&self) {
        let (lock, cvar) = &*self.inner;
        let mut done = lock.lock().unwrap();
        *done = true;
        cvar.notify_all();
    }

    /// Blocks the caller until either `done` becomes true or `deadline`
    /// elapses, whichever comes first.
    fn wait_until(&self, deadline: Instant) {
        let (lock, cvar) = &*self.inner;
        let mut done = lock.lock().unwrap();
        while !*done {
            let now = Instant::now();
            if now >= deadline {
                return;
            }
            let (guard, timeout_result) = cvar.wait_timeout(done, deadline - now).unwrap();
            done = guard;
            if timeout_result.timed_out() {
                return;
            }
        }
    }
}

impl Default for DoneSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawns the timer thread described in §4.7 when `timeout` is positive.
/// `on_event(event_idx, elapsed)` is invoked on every wakeup, including the
/// final one that flips `done`; this module has no notion of a level's best
/// score, so it's the caller's job to sample whatever live state it wants
/// (e.g. the running best score) at call time and turn that into a
/// [`crate::stats::TimerSample`].
pub fn spawn_timer<F>(done: DoneSignal, timeout: Duration, mut on_event: F) -> Option<std::thread::JoinHandle<()>>
where
    F: FnMut(u32, Duration) + Send + 'static,
{
    if timeout.is_zero() {
        return None;
    }

    Some(std::thread::spawn(move || {
        let start = Instant::now();
        let mut interval = Duration::from_secs(1);
        for event_idx in 0..MAX_TIME_EVENTS {
            if done.is_done() {
                return;
            }
            let mut wake_at = start + interval;
            if wake_at > start + timeout {
                wake_at = start + timeout;
            }
            done.wait_until(wake_at);
            if done.is_done() {
                return;
            }
            let elapsed = wake_at.saturating_duration_since(start);
            let is_last = elapsed >= timeout;
            on_event(event_idx as u32, elapsed);
            if is_last {
                done.mark_done();
                return;
            }
            interval *= 2;
        }
        done.mark_done();
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn done_signal_starts_false_and_latches_true() {
        let done = DoneSignal::new();
        assert!(!done.is_done());
        done.mark_done();
        assert!(done.is_done());
    }

    #[test]
    fn timer_sets_done_after_timeout() {
        let done = DoneSignal::new();
        let handle = spawn_timer(done.clone(), Duration::from_millis(50), |_, _| {});
        assert!(handle.is_some());
        handle.unwrap().join().unwrap();
        assert!(done.is_done());
    }

    #[test]
    fn zero_timeout_spawns_no_timer() {
        let done = DoneSignal::new();
        let handle = spawn_timer(done, Duration::ZERO, |_, _| {});
        assert!(handle.is_none());
    }

    #[test]
    fn on_event_receives_monotonic_event_indices_and_elapsed_times() {
        let done = DoneSignal::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in_closure = Arc::clone(&seen);
        let handle = spawn_timer(done.clone(), Duration::from_millis(120), move |event_idx, elapsed| {
            seen_in_closure.lock().unwrap().push((event_idx, elapsed));
        });
        handle.unwrap().join().unwrap();

        let recorded = seen.lock().unwrap();
        assert!(!recorded.is_empty());
        for window in recorded.windows(2) {
            assert!(window[1].0 > window[0].0);
            assert!(window[1].1 >= window[0].1);
        }
    }
}
