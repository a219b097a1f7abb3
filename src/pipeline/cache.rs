//! Unit result cache.
//!
//! Keeps recently computed units so repeated batch runs over the same range
//! skip recomputation. Entries expire after a TTL and the cache is bounded
//! by entry count.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use moka::sync::Cache;

use crate::models::ShiftType;

use super::engine::UnitResult;

/// Default time-to-live for cached units.
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 300;

/// Default maximum number of cached units.
pub const DEFAULT_CACHE_MAX_CAPACITY: u64 = 10_000;

/// Cache sizing.
#[derive(Debug, Clone)]
pub struct ResultCacheConfig {
    /// Time-to-live of each entry.
    pub ttl: Duration,
    /// Maximum number of entries.
    pub max_capacity: u64,
}

impl Default for ResultCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECONDS),
            max_capacity: DEFAULT_CACHE_MAX_CAPACITY,
        }
    }
}

/// Employee id, date, requested shift and whether shift auto-detection was on.
type CacheKey = (String, NaiveDate, ShiftType, bool);

/// TTL-bounded cache of unit results.
///
/// Entries are keyed by how the unit was requested, not by the shift the
/// result ended up in: an auto-detected run may resolve to the other window.
#[derive(Clone)]
pub struct ResultCache {
    inner: Cache<CacheKey, Arc<UnitResult>>,
}

impl ResultCache {
    /// Creates an empty cache.
    pub fn new(config: ResultCacheConfig) -> Self {
        tracing::debug!(
            ttl_seconds = config.ttl.as_secs(),
            max_capacity = config.max_capacity,
            "Result cache created"
        );
        Self {
            inner: Cache::builder()
                .time_to_live(config.ttl)
                .max_capacity(config.max_capacity)
                .build(),
        }
    }

    /// Returns the cached result for a unit requested with `shift` and
    /// `auto_detect_shift`.
    pub fn get(
        &self,
        employee_id: &str,
        date: NaiveDate,
        shift: ShiftType,
        auto_detect_shift: bool,
    ) -> Option<Arc<UnitResult>> {
        self.inner.get(&(employee_id.to_string(), date, shift, auto_detect_shift))
    }

    /// Stores the result of a unit requested with `shift` and
    /// `auto_detect_shift`.
    pub fn insert(&self, shift: ShiftType, auto_detect_shift: bool, result: Arc<UnitResult>) {
        let key = (result.employee_id.clone(), result.date, shift, auto_detect_shift);
        self.inner.insert(key, result);
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.inner.invalidate_all();
        self.inner.run_pending_tasks();
    }

    /// Approximate number of entries.
    pub fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(ResultCacheConfig::default())
    }
}
