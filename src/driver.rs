//! The recursion driver (C7) and parallel batch runner (C8): the part of the
//! search that actually calls itself. Everything below here (policy,
//! playout, adaptation) is pure; this module is where the concurrency,
//! cancellation and stats-recording live.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{debug, info, info_span};

use crate::adapt::adapt;
use crate::board::Board;
use crate::config::NrpaConfig;
use crate::constants::DEFAULT_ALPHA;
use crate::error::NrpaResult;
use crate::level::NrpaLevel;
use crate::playout::playout;
use crate::policy::Policy;
use crate::pool::{FixedPool, TaskHandle};
use crate::rollout::{LegalMoveCodes, Rollout};
use crate::stats::{IterationSample, StatsCollector, TimerSample};
use crate::timer::{spawn_timer, DoneSignal};

/// The result of a completed (or cooperatively cut-short) top-level search.
#[derive(Debug)]
pub struct SearchOutcome {
    pub best_rollout: Rollout,
    pub best_legal_codes: LegalMoveCodes,
    pub best_score: f64,
    /// True if the run ended because of the cooperative done-flag rather
    /// than exhausting its iteration budget.
    pub cut_short: bool,
}

/// State shared across every recursion frame and worker for one top-level
/// run. Cheap to clone (an `Arc`), so batch workers each get their own
/// handle without borrowing across thread boundaries.
struct SearchContext {
    config: NrpaConfig,
    start_level: usize,
    done: DoneSignal,
    stats: Arc<Mutex<StatsCollector>>,
    /// The start level's running best score, kept up to date so the timer
    /// thread (which has no other way to reach live search state) can stamp
    /// accurate [`TimerSample`]s rather than a placeholder.
    current_best: Arc<Mutex<f64>>,
    start_time: Instant,
    pool: Option<Arc<FixedPool>>,
    seed: u64,
}

type Ctx = Arc<SearchContext>;

/// A configured NRPA search over board type `B`.
pub struct NrpaSearch<B: Board> {
    config: NrpaConfig,
    seed: Option<u64>,
    _board: std::marker::PhantomData<B>,
}

impl<B: Board> NrpaSearch<B> {
    pub fn new(config: NrpaConfig) -> Self {
        Self {
            config,
            seed: None,
            _board: std::marker::PhantomData,
        }
    }

    /// Fixes the top-level RNG seed, making a sequential (`num_thread: 1`)
    /// run byte-for-byte reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Performs `config.num_run` independent top-level searches (matching
    /// the original's `for (i = 0; i < numRun; i++) test()`), returning the
    /// single best result across all of them.
    pub fn run(&self) -> NrpaResult<SearchOutcome> {
        let effective_threads = self.config.validate()?;

        let mut best: Option<SearchOutcome> = None;
        for run_idx in 0..self.config.num_run {
            let seed = self
                .seed
                .map(|s| s.wrapping_add(u64::from(run_idx)))
                .unwrap_or_else(|| fastrand::u64(..));
            let outcome = self.run_once(effective_threads, seed)?;
            best = Some(match best {
                Some(prev) if prev.best_score >= outcome.best_score => prev,
                _ => outcome,
            });
        }

        Ok(best.expect("validate() rejects num_run < 1, so the loop runs at least once"))
    }

    fn run_once(&self, effective_threads: usize, seed: u64) -> NrpaResult<SearchOutcome> {
        let pool = (effective_threads > 1).then(|| Arc::new(FixedPool::new(effective_threads)));

        let done = DoneSignal::new();
        let stats = Arc::new(Mutex::new(StatsCollector::new()));
        let current_best = Arc::new(Mutex::new(f64::NEG_INFINITY));
        let start_time = Instant::now();

        let timer_handle = (self.config.timeout_secs > 0).then(|| {
            let done_for_timer = done.clone();
            let stats_for_timer = Arc::clone(&stats);
            let best_for_timer = Arc::clone(&current_best);
            spawn_timer(
                done_for_timer,
                Duration::from_secs(self.config.timeout_secs),
                move |event_idx, elapsed| {
                    let best_score = *best_for_timer.lock().unwrap();
                    if let Ok(mut s) = stats_for_timer.lock() {
                        s.record_timer_event(TimerSample {
                            event_idx,
                            at: elapsed,
                            best_score,
                        });
                    }
                    info!(event_idx, best_score, "timer event");
                },
            )
        }).flatten();

        let ctx: Ctx = Arc::new(SearchContext {
            config: self.config.clone(),
            start_level: self.config.num_level,
            done: done.clone(),
            stats: Arc::clone(&stats),
            current_best,
            start_time,
            pool,
            seed,
        });

        let span = info_span!("nrpa_run", level = self.config.num_level, nb_iter = self.config.num_iter);
        let _enter = span.enter();

        let mut rng = fastrand::Rng::with_seed(ctx.seed);
        let result = run_level::<B>(self.config.num_level, Policy::new(), &ctx, &mut rng);

        done.mark_done();
        if let Some(handle) = timer_handle {
            let _ = handle.join();
        }

        if self.config.stats {
            stats.lock().unwrap().write_best_effort(&self.config);
        }

        let (best_rollout, best_legal_codes, best_score) = result?;
        let cut_short = ctx.done.is_done();
        info!(best_score, cut_short, "search complete");

        Ok(SearchOutcome {
            best_rollout,
            best_legal_codes,
            best_score,
            cut_short,
        })
    }
}

/// One recursion frame: runs `N` iterations of level `level - 1` (or, at
/// `level == 0`, a single playout), tracking the best result seen so far.
/// Matches §4.5 exactly, delegating to [`run_batch`] at the configured
/// parallel level (§4.6).
fn run_level<B: Board>(
    level: usize,
    policy: Policy,
    ctx: &Ctx,
    rng: &mut fastrand::Rng,
) -> NrpaResult<(Rollout, LegalMoveCodes, f64)> {
    if level == 0 {
        let (rollout, legal_codes) = playout::<B>(&policy, rng)?;
        let score = rollout.score();
        return Ok((rollout, legal_codes, score));
    }

    let _span = tracing::debug_span!("nrpa_level", level).entered();
    let mut nl = NrpaLevel::new();
    nl.reset_with(policy);

    let use_batch = level == ctx.config.parallel_level && ctx.pool.is_some();
    if use_batch {
        run_batch::<B>(level, &mut nl, ctx)?;
    } else {
        for i in 0..ctx.config.num_iter {
            let (sub_rollout, sub_codes, sub_score) =
                run_level::<B>(level - 1, nl.level_policy.clone(), ctx, rng)?;

            if sub_score >= nl.best_score() {
                nl.accept(sub_rollout, sub_codes);
            }

            if level == ctx.start_level {
                record_iteration(ctx, i, nl.best_score());
            }
            debug!(level, iter = i, best_score = nl.best_score());

            if ctx.done.is_done() {
                break;
            }

            if i + 1 != ctx.config.num_iter {
                nl.level_policy = adapt(&nl.level_policy, &nl.best_rollout, &nl.legal_codes, DEFAULT_ALPHA);
            }
        }
    }

    let score = nl.best_score();
    Ok((nl.best_rollout, nl.legal_codes, score))
}

/// The parallel batch runner (C8): at `level == parallel_level`, splits the
/// `N` iterations of [`run_level`] into batches of `T = pool_size` submitted
/// to the worker pool, merging the best result after each batch with an
/// amplified learning rate.
fn run_batch<B: Board>(level: usize, nl: &mut NrpaLevel, ctx: &Ctx) -> NrpaResult<()> {
    let pool = ctx.pool.as_ref().expect("run_batch requires a pool");
    let batch_size = pool.nb_threads() as u32;

    let mut i = 0u32;
    while i < ctx.config.num_iter {
        let t = batch_size.min(ctx.config.num_iter - i);
        let policy_snapshot = nl.level_policy.clone();

        let handles: Vec<TaskHandle<NrpaResult<(Rollout, LegalMoveCodes, f64)>>> = (0..t)
            .map(|worker| {
                let worker_ctx = Arc::clone(ctx);
                let worker_policy = policy_snapshot.clone();
                let worker_seed = ctx.seed ^ (u64::from(i) << 32) ^ u64::from(worker);
                pool.submit(move || {
                    let mut worker_rng = fastrand::Rng::with_seed(worker_seed);
                    run_level::<B>(level - 1, worker_policy, &worker_ctx, &mut worker_rng)
                })
            })
            .collect();

        let mut batch_best: Option<(Rollout, LegalMoveCodes, f64)> = None;
        for handle in handles {
            let (rollout, codes, score) = handle.wait()?;
            let is_new_best = match &batch_best {
                None => true,
                Some((_, _, best)) => score > *best,
            };
            if is_new_best {
                batch_best = Some((rollout, codes, score));
            }
        }
        let (winner_rollout, winner_codes, winner_score) =
            batch_best.expect("batch_size is always >= 1");

        if winner_score >= nl.best_score() {
            nl.accept(winner_rollout, winner_codes);
        }

        if level == ctx.start_level {
            record_iteration(ctx, i, nl.best_score());
        }
        debug!(level, batch_start = i, batch_size = t, best_score = nl.best_score());

        if ctx.done.is_done() {
            return Ok(());
        }

        let amplified_alpha = DEFAULT_ALPHA * f64::from(t);
        nl.level_policy = adapt(&nl.level_policy, &nl.best_rollout, &nl.legal_codes, amplified_alpha);

        i += t;
    }
    Ok(())
}

fn record_iteration(ctx: &Ctx, iter: u32, best_score: f64) {
    if let Ok(mut b) = ctx.current_best.lock() {
        *b = best_score;
    }
    if !ctx.config.stats {
        return;
    }
    if let Ok(mut s) = ctx.stats.lock() {
        s.record_iteration(IterationSample {
            iter,
            at: ctx.start_time.elapsed(),
            best_score,
        });
    }
}
