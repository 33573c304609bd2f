//! Tunable ceilings shared across the search. These mirror the compile-time
//! template bounds of the original implementation: they exist so that
//! configuration validation (see [`crate::config`]) has something concrete
//! to check `num_level`/`num_iter`/`num_thread` against.

/// Upper bound on recursion depth (`L` in the source material).
pub const MAX_LEVEL: usize = 16;

/// Upper bound on iterations per level.
pub const MAX_ITER: u32 = 1_000_000;

/// Upper bound on worker-pool size.
pub const MAX_THREADS: usize = 256;

/// Number of timer-event samples recorded before a run's hard timeout fires.
pub const MAX_TIME_EVENTS: usize = 32;

/// Default learning rate `ALPHA` used by [`crate::adapt::adapt`].
pub const DEFAULT_ALPHA: f64 = 1.0;
