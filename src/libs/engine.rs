//! Event aggregation engine.
//!
//! The engine is the single owner of the day counters. Three parties talk to
//! it concurrently:
//!
//! - the **capture source**, which calls [`Engine::on_input_event`] from its
//!   own thread for every key press or click;
//! - the **flush task**, a tokio task started by [`Engine::start`] that writes
//!   the full snapshot to the store on a fixed interval;
//! - **readers** such as the history views, which call [`Engine::snapshot`]
//!   or [`Engine::recent_history`].
//!
//! All counter state sits behind one mutex. The capture path only ever does
//! in-memory work under that mutex; store I/O happens exclusively in
//! [`Engine::flush`], which serializes on a second mutex guarding the store.
//!
//! ## Lifecycle
//!
//! ```text
//! Engine::new ──▶ start (reconcile + flush task) ──▶ on_input_event ... ──▶ shutdown (final forced flush)
//! ```
//!
//! Events delivered before [`Engine::start`] has reconciled the store are
//! rejected, so a restart can never count into a zeroed "today" that is then
//! overwritten by the loaded one.

use super::clock::Clock;
use super::counter::{DailyCounter, Rollover};
use super::day::{DayRecord, EventKind};
use crate::db::days::DayStore;
use crate::db::StoreError;
use chrono::NaiveDate;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{oneshot, Notify};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Default interval between periodic flushes.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(60);

/// Timing of the background flush task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushSettings {
    /// Period of the flush timer. Zero is treated as one second.
    pub interval: Duration,
    /// Number of accepted events after which a flush is requested ahead of
    /// the timer. Zero disables early flushes.
    pub event_threshold: u64,
}

impl Default for FlushSettings {
    fn default() -> Self {
        FlushSettings {
            interval: DEFAULT_FLUSH_INTERVAL,
            event_threshold: 0,
        }
    }
}

/// Failures of [`Engine::start`].
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine was already started. The store is reconciled only once.
    #[error("aggregation engine is already started")]
    AlreadyStarted,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Handle on the running flush task, consumed by [`Engine::shutdown`].
pub struct FlushTask {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

pub struct Engine {
    state: Mutex<DailyCounter>,
    store: Mutex<DayStore>,
    clock: Box<dyn Clock>,
    started: AtomicBool,
    accepting: AtomicBool,
    skew_reported: AtomicBool,
    unflushed: AtomicU64,
    event_threshold: AtomicU64,
    flush_wanted: Notify,
}

impl Engine {
    /// Creates an engine in `Active(today)` with empty state. Call
    /// [`Engine::start`] before feeding it events.
    pub fn new(store: DayStore, clock: impl Clock + 'static) -> Self {
        let today = clock.today();
        Engine {
            state: Mutex::new(DailyCounter::new(today)),
            store: Mutex::new(store),
            clock: Box::new(clock),
            started: AtomicBool::new(false),
            accepting: AtomicBool::new(false),
            skew_reported: AtomicBool::new(false),
            unflushed: AtomicU64::new(0),
            event_threshold: AtomicU64::new(0),
            flush_wanted: Notify::new(),
        }
    }

    /// Reconciles the store into memory, then spawns the flush task on the
    /// current tokio runtime.
    ///
    /// # Errors
    ///
    /// [`EngineError::AlreadyStarted`] on any call after the first successful
    /// one, including after shutdown. [`EngineError::Store`] if the existing
    /// records cannot be read; the engine stays closed to events and may be
    /// started again.
    pub fn start(self: &Arc<Self>, settings: FlushSettings) -> Result<FlushTask, EngineError> {
        if self.started.swap(true, Ordering::AcqRel) {
            return Err(EngineError::AlreadyStarted);
        }
        if let Err(e) = self.reconcile() {
            self.started.store(false, Ordering::Release);
            return Err(e.into());
        }
        self.event_threshold.store(settings.event_threshold, Ordering::Relaxed);

        let period = settings.interval.max(Duration::from_secs(1));
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let engine = Arc::clone(self);

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {}
                    _ = engine.flush_wanted.notified() => {
                        tracing::debug!("event threshold reached, flushing early");
                    }
                }

                let flusher = Arc::clone(&engine);
                // Failures are logged by flush itself; the next tick retries.
                if let Err(e) = tokio::task::spawn_blocking(move || flusher.flush(false)).await {
                    tracing::error!("periodic flush task failed: {}", e);
                }
            }
            tracing::debug!("flush task stopped");
        });

        tracing::info!(interval_secs = period.as_secs(), threshold = settings.event_threshold, "aggregation engine started");
        Ok(FlushTask { shutdown: shutdown_tx, handle })
    }

    // Loads every record from the store and merges it into memory, then
    // opens the engine to events. Runs once, from `start`.
    fn reconcile(&self) -> Result<usize, StoreError> {
        let loaded = self.store.lock().read_all()?;
        let total = loaded.len();

        let (accepted, deferred, current) = {
            let mut state = self.state.lock();
            state.rollover_check(self.clock.today());
            let accepted = state.reconcile(loaded);
            (accepted, state.deferred_len(), state.current_date())
        };

        if deferred > 0 {
            tracing::warn!(deferred, current = %current, "store holds records dated after today, keeping them aside");
        }
        tracing::info!(loaded = total, accepted, current = %current, "store reconciled");

        self.accepting.store(true, Ordering::Release);
        Ok(accepted)
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting.load(Ordering::Acquire)
    }

    /// Capture-source entry point. Counts one `kind` event for today.
    ///
    /// Never touches the store. Returns `false` if the event was rejected
    /// because the engine is not started or already shut down.
    pub fn on_input_event(&self, kind: EventKind) -> bool {
        if !self.is_accepting() {
            tracing::debug!(?kind, "engine not accepting events, dropped");
            return false;
        }

        self.record_event(kind, self.clock.today());

        let threshold = self.event_threshold.load(Ordering::Relaxed);
        if threshold > 0 && self.unflushed.fetch_add(1, Ordering::Relaxed) + 1 == threshold {
            self.flush_wanted.notify_one();
        }
        true
    }

    /// Counts one `kind` event observed on `observed`, rolling the current
    /// day over first if needed.
    pub fn record_event(&self, kind: EventKind, observed: NaiveDate) -> Rollover {
        let rollover = self.state.lock().record_event(kind, observed);
        self.report_rollover(&rollover);
        rollover
    }

    /// Runs a rollover check for `observed` without counting anything.
    pub fn rollover_check(&self, observed: NaiveDate) -> Rollover {
        let rollover = self.state.lock().rollover_check(observed);
        self.report_rollover(&rollover);
        rollover
    }

    fn report_rollover(&self, rollover: &Rollover) {
        match rollover {
            Rollover::Unchanged => {}
            Rollover::Advanced { sealed } => {
                self.skew_reported.store(false, Ordering::Relaxed);
                tracing::info!(
                    sealed = %sealed.formatted_date(),
                    keyboard = sealed.keyboard_presses,
                    left = sealed.left_clicks,
                    right = sealed.right_clicks,
                    "day rolled over"
                );
            }
            Rollover::ClockSkew { observed } => {
                if !self.skew_reported.swap(true, Ordering::Relaxed) {
                    tracing::warn!(observed = %observed, current = %self.current_date(), "clock moved backwards, counting on the current day");
                }
            }
        }
    }

    pub fn current_date(&self) -> NaiveDate {
        self.state.lock().current_date()
    }

    /// History plus today's record, newest first.
    pub fn snapshot(&self) -> Vec<DayRecord> {
        self.state.lock().snapshot()
    }

    /// Up to `days` most recent records, oldest first. Days without a record
    /// are not filled in.
    pub fn recent_history(&self, days: usize) -> Vec<DayRecord> {
        let mut records: Vec<DayRecord> = self.snapshot().into_iter().take(days).collect();
        records.reverse();
        records
    }

    /// Writes the full state to the store. Returns the number of records
    /// written.
    ///
    /// Flushes are serialized: the store lock is held from snapshot to
    /// rename, so an older snapshot never overwrites a newer one. With
    /// `force == false` a failure is logged as a warning and left to the
    /// next tick; with `force == true` it is logged as an error. Both return
    /// the error.
    pub fn flush(&self, force: bool) -> Result<usize, StoreError> {
        let store = self.store.lock();
        self.unflushed.store(0, Ordering::Relaxed);
        let records = self.state.lock().persisted_records();

        match store.write_all(&records) {
            Ok(()) => {
                tracing::debug!(records = records.len(), force, "state flushed");
                Ok(records.len())
            }
            Err(e) if force => {
                tracing::error!("final flush failed, unsaved counts are lost: {}", e);
                Err(e)
            }
            Err(e) => {
                tracing::warn!("periodic flush failed, retrying on next tick: {}", e);
                Err(e)
            }
        }
    }

    /// Stops the flush task, closes the engine to new events and runs the
    /// forced final flush.
    pub async fn shutdown(self: &Arc<Self>, task: FlushTask) -> Result<usize, StoreError> {
        let _ = task.shutdown.send(());
        if let Err(e) = task.handle.await {
            tracing::warn!("flush task ended abnormally: {}", e);
        }

        self.accepting.store(false, Ordering::Release);

        let engine = Arc::clone(self);
        match tokio::task::spawn_blocking(move || engine.flush(true)).await {
            Ok(result) => result,
            // The blocking pool is gone; flush on this thread instead.
            Err(_) => self.flush(true),
        }
    }
}
