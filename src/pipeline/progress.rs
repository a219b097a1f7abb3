//! Batch progress tracking.
//!
//! Every run gets its own counters, registered under its `run_id`, so
//! concurrent runs sharing one tracker never see each other's counts.
//! Finished runs stay queryable until their entry expires.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use moka::sync::Cache;
use serde::Serialize;
use uuid::Uuid;

/// Default time a run's counters stay queryable after it was started.
pub const DEFAULT_PROGRESS_RETENTION_SECONDS: u64 = 3600;

const MAX_TRACKED_RUNS: u64 = 1_000;

/// A point-in-time copy of one run's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    /// Units in the run.
    pub total: usize,
    /// Units that succeeded.
    pub completed: usize,
    /// Units that failed.
    pub failed: usize,
    /// Units never started or abandoned.
    pub cancelled: usize,
}

impl ProgressSnapshot {
    /// Units accounted for so far.
    pub fn finished(&self) -> usize {
        self.completed + self.failed + self.cancelled
    }

    /// Percentage of units accounted for; 100 for an empty run.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.finished() as f64 / self.total as f64 * 100.0
    }
}

#[derive(Debug, Default)]
struct Counters {
    total: AtomicUsize,
    completed: AtomicUsize,
    failed: AtomicUsize,
    cancelled: AtomicUsize,
}

/// Lock-free counters of a single run.
#[derive(Debug, Clone)]
pub struct RunProgress {
    counters: Arc<Counters>,
}

impl RunProgress {
    fn new(total: usize) -> Self {
        let counters = Counters::default();
        counters.total.store(total, Ordering::SeqCst);
        Self {
            counters: Arc::new(counters),
        }
    }

    /// Records a successful unit.
    pub fn record_completed(&self) {
        self.counters.completed.fetch_add(1, Ordering::SeqCst);
    }

    /// Records a failed unit.
    pub fn record_failed(&self) {
        self.counters.failed.fetch_add(1, Ordering::SeqCst);
    }

    /// Records units skipped or abandoned by cancellation.
    pub fn record_cancelled(&self, count: usize) {
        self.counters.cancelled.fetch_add(count, Ordering::SeqCst);
    }

    /// Returns the current counters.
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            total: self.counters.total.load(Ordering::SeqCst),
            completed: self.counters.completed.load(Ordering::SeqCst),
            failed: self.counters.failed.load(Ordering::SeqCst),
            cancelled: self.counters.cancelled.load(Ordering::SeqCst),
        }
    }
}

/// Registry of per-run progress counters.
#[derive(Clone)]
pub struct ProgressTracker {
    runs: Cache<Uuid, RunProgress>,
}

impl ProgressTracker {
    /// Creates a tracker with the default retention.
    pub fn new() -> Self {
        Self::with_retention(Duration::from_secs(DEFAULT_PROGRESS_RETENTION_SECONDS))
    }

    /// Creates a tracker that forgets runs `retention` after they started.
    pub fn with_retention(retention: Duration) -> Self {
        Self {
            runs: Cache::builder()
                .time_to_live(retention)
                .max_capacity(MAX_TRACKED_RUNS)
                .build(),
        }
    }

    /// Registers a new run of `total` units and returns its counters.
    pub fn start(&self, run_id: Uuid, total: usize) -> RunProgress {
        let progress = RunProgress::new(total);
        self.runs.insert(run_id, progress.clone());
        progress
    }

    /// Returns the counters of a run, if it is still tracked.
    pub fn snapshot(&self, run_id: Uuid) -> Option<ProgressSnapshot> {
        self.runs.get(&run_id).map(|progress| progress.snapshot())
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}
