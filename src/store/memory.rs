//! In-memory store implementations.
//!
//! Used by tests, benchmarks and dry runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::models::{ClaimedHours, DailyWorkRecord, Employee, RawEvent, ShiftWindow, SourceKind};

use super::{ClaimStore, EmployeeDirectory, MetricsSink, RawEventSource};

/// How an [`InMemoryEventSource`] answers queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourceBehavior {
    /// Return matching records.
    #[default]
    Healthy,
    /// Fail every query.
    Unavailable,
    /// Sleep before answering.
    Slow(Duration),
}

/// A raw event source backed by a vector.
#[derive(Debug, Clone)]
pub struct InMemoryEventSource {
    kind: SourceKind,
    records: Vec<RawEvent>,
    behavior: SourceBehavior,
}

impl InMemoryEventSource {
    /// Creates a healthy source holding the given records.
    pub fn new(kind: SourceKind, records: Vec<RawEvent>) -> Self {
        Self {
            kind,
            records,
            behavior: SourceBehavior::Healthy,
        }
    }

    /// Replaces the answering behavior.
    pub fn with_behavior(mut self, behavior: SourceBehavior) -> Self {
        self.behavior = behavior;
        self
    }
}

#[async_trait]
impl RawEventSource for InMemoryEventSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn fetch(
        &self,
        employee_id: &str,
        window: &ShiftWindow,
    ) -> Result<Vec<RawEvent>, StoreError> {
        match self.behavior {
            SourceBehavior::Unavailable => {
                return Err(StoreError::Unavailable {
                    message: format!("{} source offline", self.kind),
                });
            }
            SourceBehavior::Slow(delay) => tokio::time::sleep(delay).await,
            SourceBehavior::Healthy => {}
        }

        Ok(self
            .records
            .iter()
            .filter(|r| r.employee_id == employee_id && window.contains(r.timestamp))
            .cloned()
            .collect())
    }
}

/// An employee directory backed by a map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    employees: HashMap<String, Employee>,
}

impl InMemoryDirectory {
    /// Creates a directory holding the given employees.
    pub fn new(employees: impl IntoIterator<Item = Employee>) -> Self {
        Self {
            employees: employees.into_iter().map(|e| (e.id.clone(), e)).collect(),
        }
    }
}

#[async_trait]
impl EmployeeDirectory for InMemoryDirectory {
    async fn employee(&self, employee_id: &str) -> Result<Option<Employee>, StoreError> {
        Ok(self.employees.get(employee_id).cloned())
    }
}

/// A claimed-hours store backed by a map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryClaimStore {
    claims: HashMap<(String, NaiveDate), ClaimedHours>,
}

impl InMemoryClaimStore {
    /// Creates a store holding the given claims.
    pub fn new(claims: impl IntoIterator<Item = ClaimedHours>) -> Self {
        Self {
            claims: claims
                .into_iter()
                .map(|c| ((c.employee_id.clone(), c.date), c))
                .collect(),
        }
    }
}

#[async_trait]
impl ClaimStore for InMemoryClaimStore {
    async fn claimed_hours(
        &self,
        employee_id: &str,
        date: NaiveDate,
    ) -> Result<Option<ClaimedHours>, StoreError> {
        Ok(self.claims.get(&(employee_id.to_string(), date)).cloned())
    }
}

/// A metrics sink that keeps the latest record per (employee id, date).
#[derive(Debug, Default)]
pub struct InMemoryMetricsStore {
    records: RwLock<HashMap<(String, NaiveDate), DailyWorkRecord>>,
    failures_remaining: AtomicUsize,
    writes: AtomicUsize,
}

impl InMemoryMetricsStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` upserts fail with a conflict.
    pub fn fail_next(&self, count: usize) {
        self.failures_remaining.store(count, Ordering::SeqCst);
    }

    /// Returns the stored record for a key.
    pub async fn get(&self, employee_id: &str, date: NaiveDate) -> Option<DailyWorkRecord> {
        self.records
            .read()
            .await
            .get(&(employee_id.to_string(), date))
            .cloned()
    }

    /// Number of distinct keys stored.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns true when nothing has been stored.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Number of successful upserts, overwrites included.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetricsSink for InMemoryMetricsStore {
    async fn upsert(&self, record: DailyWorkRecord) -> Result<(), StoreError> {
        let failing = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(StoreError::Conflict {
                message: "simulated write conflict".to_string(),
            });
        }

        self.records.write().await.insert(record.key(), record);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CalibratedHours, JobGroup, ShiftType, WorkMetrics};
    use chrono::{NaiveDateTime, Utc};
    use rust_decimal::Decimal;

    fn make_datetime(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    fn day_window() -> ShiftWindow {
        ShiftWindow {
            date: date(),
            shift: ShiftType::Day,
            start: make_datetime("2025-06-02 00:00:00"),
            end: make_datetime("2025-06-03 00:00:00"),
        }
    }

    fn raw(employee_id: &str, ts: &str) -> RawEvent {
        RawEvent {
            timestamp: make_datetime(ts),
            employee_id: employee_id.to_string(),
            resource_code: "WA-B1-101".to_string(),
            source: SourceKind::AccessControl,
        }
    }

    fn record(work_minutes: f64) -> DailyWorkRecord {
        DailyWorkRecord {
            shift: ShiftType::Day,
            job_group: JobGroup::Office,
            metrics: WorkMetrics {
                employee_id: "E1001".to_string(),
                date: date(),
                total_time_minutes: work_minutes,
                work_time_minutes: work_minutes,
                estimated_work_time_minutes: work_minutes,
                focus_time_minutes: 0.0,
                meeting_time_minutes: 0.0,
                meal_time_minutes: 0.0,
                transit_time_minutes: 0.0,
                rest_time_minutes: 0.0,
                work_ratio: 1.0,
                reliability_score: 100.0,
                state_minutes: Default::default(),
            },
            calibrated: CalibratedHours {
                raw_hours: work_minutes / 60.0,
                reliability_score: 100.0,
                adjustment_factor: 1.0,
                calibrated_hours: work_minutes / 60.0,
            },
            computed_at: Utc::now(),
            run_id: None,
        }
    }

    #[tokio::test]
    async fn test_source_filters_by_employee_and_window() {
        let source = InMemoryEventSource::new(
            SourceKind::AccessControl,
            vec![
                raw("E1001", "2025-06-02 08:00:00"),
                raw("E1001", "2025-06-03 08:00:00"),
                raw("E2002", "2025-06-02 09:00:00"),
            ],
        );

        let records = source.fetch("E1001", &day_window()).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].timestamp, make_datetime("2025-06-02 08:00:00"));
    }

    #[tokio::test]
    async fn test_unavailable_source_fails() {
        let source = InMemoryEventSource::new(SourceKind::Meal, vec![])
            .with_behavior(SourceBehavior::Unavailable);
        assert!(matches!(
            source.fetch("E1001", &day_window()).await,
            Err(StoreError::Unavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_claim_store_lookup() {
        let store = InMemoryClaimStore::new(vec![ClaimedHours {
            employee_id: "E1001".to_string(),
            date: date(),
            hours: Decimal::new(80, 1),
        }]);

        assert!(store.claimed_hours("E1001", date()).await.unwrap().is_some());
        assert!(store.claimed_hours("E2002", date()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_metrics_store_overwrites_on_upsert() {
        let store = InMemoryMetricsStore::new();
        store.upsert(record(480.0)).await.unwrap();
        store.upsert(record(300.0)).await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(store.write_count(), 2);
        let stored = store.get("E1001", date()).await.unwrap();
        assert_eq!(stored.metrics.work_time_minutes, 300.0);
    }

    #[tokio::test]
    async fn test_metrics_store_simulated_failures() {
        let store = InMemoryMetricsStore::new();
        store.fail_next(1);

        assert!(store.upsert(record(480.0)).await.is_err());
        assert!(store.upsert(record(480.0)).await.is_ok());
        assert_eq!(store.len().await, 1);
    }
}
