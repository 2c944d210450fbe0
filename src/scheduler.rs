/// Background refresh scheduler
///
/// A single dedicated thread sweeps every database catalog, refreshing each
/// foreign table that is due, then waits out the configured interval on a
/// condition variable so `stop` can wake it mid-wait. State is Stopped or
/// Running; `start` and `stop` are idempotent, and `stop` joins the thread
/// before returning, so no refresh is left in flight once it returns.
use crate::refresh::RefreshContext;
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

/// State shared between the scheduler handle and its sweep thread
struct SchedulerShared {
    /// Running flag; cleared by `stop` to cancel the sweep loop
    is_running: AtomicBool,

    /// Set whenever a sweep attempts a table refresh
    has_refreshed_table: AtomicBool,

    /// Seconds to wait between sweeps; read at each wait
    sweep_interval_secs: AtomicU64,

    /// Pairing for the cancellable timed wait between sweeps
    wait_mutex: Mutex<()>,
    wait_condvar: Condvar,
}

/// Driver for scheduled foreign-table refreshes
///
/// An owned instance; hosts construct one and share it. Independent
/// instances never interact, so tests can run their own.
pub struct RefreshScheduler {
    ctx: RefreshContext,
    shared: Arc<SchedulerShared>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl RefreshScheduler {
    pub fn new(ctx: RefreshContext) -> Self {
        Self {
            ctx,
            shared: Arc::new(SchedulerShared {
                is_running: AtomicBool::new(false),
                has_refreshed_table: AtomicBool::new(false),
                sweep_interval_secs: AtomicU64::new(DEFAULT_SWEEP_INTERVAL_SECS),
                wait_mutex: Mutex::new(()),
                wait_condvar: Condvar::new(),
            }),
            thread: Mutex::new(None),
        }
    }

    /// Start the sweep thread
    ///
    /// No-op if the process is shutting down or the scheduler is already
    /// running. Returns immediately; the sweep runs on its own thread.
    pub fn start(&self, process_alive: Arc<AtomicBool>) {
        if !process_alive.load(Ordering::SeqCst) {
            return;
        }
        if self
            .shared
            .is_running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }

        let ctx = self.ctx.clone();
        let shared = self.shared.clone();
        let handle = thread::spawn(move || sweep_loop(ctx, shared, process_alive));
        *self.thread.lock() = Some(handle);
        tracing::info!("Foreign table refresh scheduler started");
    }

    /// Stop the sweep thread and wait for it to exit
    ///
    /// Wakes the thread immediately if it is waiting out the sweep
    /// interval. No-op if not running. Once this returns, no refresh
    /// activity is in flight.
    pub fn stop(&self) {
        {
            // Flip the flag under the wait mutex so the thread cannot miss
            // the wake-up between its last cancellation check and the wait
            let _wait_guard = self.shared.wait_mutex.lock();
            if !self.shared.is_running.swap(false, Ordering::SeqCst) {
                return;
            }
        }
        self.shared.wait_condvar.notify_one();

        let handle = self.thread.lock().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                tracing::error!("Refresh scheduler thread panicked during shutdown");
            }
        }
        tracing::info!("Foreign table refresh scheduler stopped");
    }

    /// Set the interval between sweeps; takes effect at the next wait
    pub fn set_sweep_interval(&self, seconds: u64) {
        self.shared
            .sweep_interval_secs
            .store(seconds, Ordering::Relaxed);
    }

    pub fn is_running(&self) -> bool {
        self.shared.is_running.load(Ordering::SeqCst)
    }

    /// Whether any table refresh has been attempted since the last reset
    pub fn did_refresh_any_table(&self) -> bool {
        self.shared.has_refreshed_table.load(Ordering::Relaxed)
    }

    pub fn reset_did_refresh_any_table(&self) {
        self.shared.has_refreshed_table.store(false, Ordering::Relaxed);
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

fn cancelled(shared: &SchedulerShared, process_alive: &AtomicBool) -> bool {
    !process_alive.load(Ordering::SeqCst) || !shared.is_running.load(Ordering::SeqCst)
}

fn sweep_loop(ctx: RefreshContext, shared: Arc<SchedulerShared>, process_alive: Arc<AtomicBool>) {
    loop {
        if cancelled(&shared, &process_alive) {
            return;
        }
        for catalog in ctx.system_catalog.catalogs_for_all_dbs() {
            if cancelled(&shared, &process_alive) {
                return;
            }
            for td in catalog.foreign_tables_due_for_refresh() {
                if cancelled(&shared, &process_alive) {
                    return;
                }
                // A failed table is logged and skipped; the sweep goes on
                if let Err(e) = ctx.refresh(&catalog, &td.name, false) {
                    tracing::error!(
                        "Scheduled refresh for table \"{}\" resulted in an error. {}",
                        td.name,
                        e
                    );
                }
                shared.has_refreshed_table.store(true, Ordering::Relaxed);
            }
        }

        // A condition variable is used here (instead of a sleep call) so a
        // concurrent stop() wakes the thread in the middle of the interval
        let mut wait_guard = shared.wait_mutex.lock();
        if cancelled(&shared, &process_alive) {
            return;
        }
        let interval = Duration::from_secs(shared.sweep_interval_secs.load(Ordering::Relaxed));
        shared.wait_condvar.wait_for(&mut wait_guard, interval);
    }
}
