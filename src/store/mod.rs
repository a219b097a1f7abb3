//! Collaborator ports consumed by the engine.
//!
//! The engine reads raw events, employees and claimed hours through these
//! traits and writes daily records through [`MetricsSink`]. Implementations
//! must tolerate concurrent readers; the sink must upsert by
//! (employee id, date).

mod memory;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::StoreError;
use crate::models::{ClaimedHours, DailyWorkRecord, Employee, RawEvent, ShiftWindow, SourceKind};

pub use memory::{
    InMemoryClaimStore, InMemoryDirectory, InMemoryEventSource, InMemoryMetricsStore,
    SourceBehavior,
};

/// A per-source raw event store.
#[async_trait]
pub trait RawEventSource: Send + Sync {
    /// The kind of records this source holds.
    fn kind(&self) -> SourceKind;

    /// Fetches the employee's records inside the window.
    async fn fetch(
        &self,
        employee_id: &str,
        window: &ShiftWindow,
    ) -> Result<Vec<RawEvent>, StoreError>;
}

/// Employee and organization lookup.
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    /// Looks up an employee by id.
    async fn employee(&self, employee_id: &str) -> Result<Option<Employee>, StoreError>;
}

/// Self-reported hours lookup.
#[async_trait]
pub trait ClaimStore: Send + Sync {
    /// Returns the claim for the day, if one was filed.
    async fn claimed_hours(
        &self,
        employee_id: &str,
        date: NaiveDate,
    ) -> Result<Option<ClaimedHours>, StoreError>;
}

/// Output store for daily records.
#[async_trait]
pub trait MetricsSink: Send + Sync {
    /// Inserts or overwrites the record keyed by (employee id, date).
    async fn upsert(&self, record: DailyWorkRecord) -> Result<(), StoreError>;
}
