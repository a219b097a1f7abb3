//! Batch processing over employees and date ranges.
//!
//! A [`BatchCoordinator`] expands a request into (employee, date) units,
//! puts them on a shared queue and runs a fixed pool of worker tasks over
//! it. Each worker sends exactly one message per unit back over a result
//! channel. On cancellation workers stop taking units and abandon the unit
//! in flight; nothing is persisted for a unit that fails or is abandoned.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use serde::Serialize;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{DateRange, ShiftType};
use crate::store::MetricsSink;

use super::cache::ResultCache;
use super::engine::{Engine, UnitResult};
use super::progress::ProgressTracker;

/// Upper bound on the default worker count.
pub const DEFAULT_MAX_WORKERS: usize = 8;

/// Worker pool and persistence settings.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Number of worker tasks.
    pub workers: usize,
    /// Extra upsert attempts after a failed write.
    pub persist_retries: u32,
    /// Pause between upsert attempts.
    pub retry_backoff: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self {
            workers: cores.min(DEFAULT_MAX_WORKERS),
            persist_retries: 3,
            retry_backoff: Duration::from_millis(50),
        }
    }
}

/// A batch run request.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    /// Employees to process.
    pub employee_ids: Vec<String>,
    /// Dates to process, inclusive.
    pub range: DateRange,
    /// Requested shift window.
    pub shift: ShiftType,
    /// Retry once with the detected shift window.
    pub auto_detect_shift: bool,
    /// Write results to the sink; `false` is a dry run.
    pub persist: bool,
}

/// One failed unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitError {
    /// The employee of the failed unit.
    pub employee_id: String,
    /// The date of the failed unit.
    pub date: NaiveDate,
    /// Machine-readable error code.
    pub code: String,
    /// Error description.
    pub message: String,
}

impl UnitError {
    fn new(employee_id: &str, date: NaiveDate, error: &EngineError) -> Self {
        Self {
            employee_id: employee_id.to_string(),
            date,
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}

/// Counts for a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Units that succeeded.
    pub processed: usize,
    /// Units that failed.
    pub failed: usize,
    /// Units never started or abandoned because the run was cancelled.
    pub cancelled: usize,
    /// Wall-clock duration of the run.
    pub duration_ms: u64,
}

/// The outcome of a batch run.
///
/// Results and errors are sorted by (employee id, date).
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Identifier stamped on every persisted record of the run.
    pub run_id: Uuid,
    /// Successful units.
    pub results: Vec<UnitResult>,
    /// Failed units.
    pub errors: Vec<UnitError>,
    /// Run counts.
    pub summary: BatchSummary,
}

#[derive(Debug, Clone)]
struct Unit {
    employee_id: String,
    date: NaiveDate,
}

struct UnitMessage {
    unit: Unit,
    outcome: EngineResult<UnitResult>,
}

struct WorkerContext {
    engine: Arc<Engine>,
    sink: Arc<dyn MetricsSink>,
    cache: Arc<ResultCache>,
    config: BatchConfig,
    run_id: Uuid,
    shift: ShiftType,
    auto_detect_shift: bool,
    persist: bool,
}

/// Runs batches of units over a worker pool.
pub struct BatchCoordinator {
    engine: Arc<Engine>,
    sink: Arc<dyn MetricsSink>,
    cache: Arc<ResultCache>,
    progress: Arc<ProgressTracker>,
    config: BatchConfig,
    shutdown: CancellationToken,
}

impl BatchCoordinator {
    /// Creates a coordinator over injected services.
    pub fn new(
        engine: Arc<Engine>,
        sink: Arc<dyn MetricsSink>,
        cache: Arc<ResultCache>,
        progress: Arc<ProgressTracker>,
        config: BatchConfig,
    ) -> Self {
        Self {
            engine,
            sink,
            cache,
            progress,
            config,
            shutdown: CancellationToken::new(),
        }
    }

    /// Returns the shared engine.
    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    /// Returns the progress registry; look runs up by their `run_id`.
    pub fn progress(&self) -> &Arc<ProgressTracker> {
        &self.progress
    }

    /// Processes every (employee, date) unit of the request.
    ///
    /// Unit failures never fail the batch; they are itemized in
    /// [`BatchReport::errors`]. When `cancel` fires (or the coordinator is
    /// shut down) workers stop taking new units and abandon the ones in
    /// flight. Untouched and abandoned units are counted as cancelled, not
    /// listed as errors.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidRequest`] when the date range is
    /// inverted or no employee is given.
    pub async fn process_batch(
        &self,
        request: BatchRequest,
        cancel: CancellationToken,
    ) -> EngineResult<BatchReport> {
        if !request.range.is_valid() {
            return Err(EngineError::InvalidRequest {
                message: format!(
                    "end date {} is before start date {}",
                    request.range.end_date, request.range.start_date
                ),
            });
        }
        if request.employee_ids.is_empty() {
            return Err(EngineError::InvalidRequest {
                message: "no employee ids given".to_string(),
            });
        }

        let started = Instant::now();
        let run_id = Uuid::new_v4();

        let units: VecDeque<Unit> = request
            .employee_ids
            .iter()
            .flat_map(|employee_id| {
                request.range.days().map(move |date| Unit {
                    employee_id: employee_id.clone(),
                    date,
                })
            })
            .collect();
        let total = units.len();
        let progress = self.progress.start(run_id, total);

        info!(
            %run_id,
            units = total,
            workers = self.config.workers,
            persist = request.persist,
            "Starting batch run"
        );

        let queue = Arc::new(Mutex::new(units));
        let worker_count = self.config.workers.clamp(1, total.max(1));
        let (tx, mut rx) = mpsc::channel::<UnitMessage>(worker_count * 2);

        let context = Arc::new(WorkerContext {
            engine: Arc::clone(&self.engine),
            sink: Arc::clone(&self.sink),
            cache: Arc::clone(&self.cache),
            config: self.config.clone(),
            run_id,
            shift: request.shift,
            auto_detect_shift: request.auto_detect_shift,
            persist: request.persist,
        });

        let handles: Vec<JoinHandle<()>> = (0..worker_count)
            .map(|worker_id| {
                tokio::spawn(worker_loop(
                    worker_id,
                    Arc::clone(&context),
                    Arc::clone(&queue),
                    tx.clone(),
                    cancel.clone(),
                    self.shutdown.clone(),
                ))
            })
            .collect();
        drop(tx);

        let mut results = Vec::new();
        let mut errors = Vec::new();
        let mut abandoned = 0;
        while let Some(message) = rx.recv().await {
            match message.outcome {
                Ok(result) => {
                    progress.record_completed();
                    results.push(result);
                }
                Err(EngineError::Cancelled) => {
                    progress.record_cancelled(1);
                    debug!(
                        %run_id,
                        employee_id = %message.unit.employee_id,
                        date = %message.unit.date,
                        "Unit abandoned"
                    );
                    abandoned += 1;
                }
                Err(err) => {
                    progress.record_failed();
                    warn!(
                        %run_id,
                        employee_id = %message.unit.employee_id,
                        date = %message.unit.date,
                        code = err.code(),
                        error = %err,
                        "Unit failed"
                    );
                    errors.push(UnitError::new(&message.unit.employee_id, message.unit.date, &err));
                }
            }
        }

        for handle in handles {
            if let Err(err) = handle.await {
                error!(%run_id, error = %err, "Batch worker panicked");
            }
        }

        let unstarted = queue.lock().await.len();
        if unstarted > 0 {
            progress.record_cancelled(unstarted);
        }
        let cancelled = unstarted + abandoned;
        if cancelled > 0 {
            info!(%run_id, unstarted, abandoned, "Batch run cancelled before all units finished");
        }

        results.sort_by(|a, b| (&a.employee_id, a.date).cmp(&(&b.employee_id, b.date)));
        errors.sort_by(|a, b| (&a.employee_id, a.date).cmp(&(&b.employee_id, b.date)));

        let summary = BatchSummary {
            processed: results.len(),
            failed: errors.len(),
            cancelled,
            duration_ms: started.elapsed().as_millis() as u64,
        };

        info!(
            %run_id,
            processed = summary.processed,
            failed = summary.failed,
            cancelled = summary.cancelled,
            duration_ms = summary.duration_ms,
            "Batch run finished"
        );

        Ok(BatchReport {
            run_id,
            results,
            errors,
            summary,
        })
    }

    /// Stops outstanding runs from taking new units and clears the cache.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        self.cache.clear();
        info!("Batch coordinator shut down");
    }

    /// Returns true once [`shutdown`](Self::shutdown) has been called.
    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

async fn worker_loop(
    worker_id: usize,
    context: Arc<WorkerContext>,
    queue: Arc<Mutex<VecDeque<Unit>>>,
    tx: mpsc::Sender<UnitMessage>,
    cancel: CancellationToken,
    shutdown: CancellationToken,
) {
    loop {
        if cancel.is_cancelled() || shutdown.is_cancelled() {
            debug!(worker_id, "Worker observed cancellation");
            break;
        }

        let Some(unit) = queue.lock().await.pop_front() else {
            break;
        };

        // cancellation drops the whole unit future, pending persist included
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(EngineError::Cancelled),
            _ = shutdown.cancelled() => Err(EngineError::Cancelled),
            outcome = run_unit(&context, &unit) => outcome,
        };
        if tx.send(UnitMessage { unit, outcome }).await.is_err() {
            break;
        }
    }
}

async fn run_unit(context: &WorkerContext, unit: &Unit) -> EngineResult<UnitResult> {
    let result = match context.cache.get(
        &unit.employee_id,
        unit.date,
        context.shift,
        context.auto_detect_shift,
    ) {
        Some(cached) => {
            debug!(employee_id = %unit.employee_id, date = %unit.date, "Using cached unit result");
            cached.as_ref().clone()
        }
        None => {
            let result = context
                .engine
                .process_unit(
                    &unit.employee_id,
                    unit.date,
                    context.shift,
                    context.auto_detect_shift,
                )
                .await?;
            context.cache.insert(
                context.shift,
                context.auto_detect_shift,
                Arc::new(result.clone()),
            );
            result
        }
    };

    if context.persist {
        persist_with_retry(context, &result).await?;
    }

    Ok(result)
}

async fn persist_with_retry(context: &WorkerContext, result: &UnitResult) -> EngineResult<()> {
    let record = result.to_record(Some(context.run_id));
    let mut attempt = 0;
    loop {
        match context.sink.upsert(record.clone()).await {
            Ok(()) => return Ok(()),
            Err(err) if attempt < context.config.persist_retries => {
                attempt += 1;
                warn!(
                    employee_id = %result.employee_id,
                    date = %result.date,
                    attempt,
                    error = %err,
                    "Persist failed, retrying"
                );
                tokio::time::sleep(context.config.retry_backoff).await;
            }
            Err(err) => return Err(err.into()),
        }
    }
}
