//! Unit and batch processing services.
//!
//! [`Engine`] runs the analytical stages for one unit. [`BatchCoordinator`]
//! fans units out over a worker pool, with a [`ResultCache`] and a
//! [`ProgressTracker`] injected at construction.

mod batch;
mod cache;
mod engine;
mod progress;

pub use batch::{
    BatchConfig, BatchCoordinator, BatchReport, BatchRequest, BatchSummary, DEFAULT_MAX_WORKERS,
    UnitError,
};
pub use cache::{
    DEFAULT_CACHE_MAX_CAPACITY, DEFAULT_CACHE_TTL_SECONDS, ResultCache, ResultCacheConfig,
};
pub use engine::{Engine, UnitResult};
pub use progress::{
    DEFAULT_PROGRESS_RETENTION_SECONDS, ProgressSnapshot, ProgressTracker, RunProgress,
};
