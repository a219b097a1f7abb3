//! Aggregated work-hour models.
//!
//! This module contains the per-day [`WorkMetrics`], the comparison against
//! self-reported hours, the calibrated hour figure and the record persisted
//! for each (employee, date).

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ActivityState, JobGroup, ShiftType};

/// Per-day work-hour aggregate derived from a classified timeline.
///
/// All time figures are minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkMetrics {
    /// The employee the metrics belong to.
    pub employee_id: String,
    /// The date the metrics belong to.
    pub date: NaiveDate,
    /// Total classified time.
    pub total_time_minutes: f64,
    /// Time in the work bucket.
    pub work_time_minutes: f64,
    /// Time in the buckets counted as estimated work.
    pub estimated_work_time_minutes: f64,
    /// Time in the focus bucket.
    pub focus_time_minutes: f64,
    /// Time in the meeting bucket.
    pub meeting_time_minutes: f64,
    /// Time in the meal bucket.
    pub meal_time_minutes: f64,
    /// Time in the transit bucket.
    pub transit_time_minutes: f64,
    /// Time in the rest bucket.
    pub rest_time_minutes: f64,
    /// `estimated_work_time_minutes / total_time_minutes`, 0 for an empty day.
    pub work_ratio: f64,
    /// Coverage-weighted reliability, 0 to 100.
    pub reliability_score: f64,
    /// Minutes per activity state.
    #[serde(default)]
    pub state_minutes: BTreeMap<ActivityState, f64>,
}

impl WorkMetrics {
    /// Estimated work time in hours.
    pub fn estimated_work_hours(&self) -> f64 {
        self.estimated_work_time_minutes / 60.0
    }
}

/// Self-reported hours for one employee and day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimedHours {
    /// The employee who reported the hours.
    pub employee_id: String,
    /// The day the hours were reported for.
    pub date: NaiveDate,
    /// The reported hours.
    pub hours: Decimal,
}

/// How the estimate relates to the claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimVariance {
    /// Estimate and claim differ by no more than the configured tolerance.
    WithinTolerance,
    /// The claim exceeds the estimate by more than the tolerance.
    OverClaimed,
    /// The estimate exceeds the claim by more than the tolerance.
    UnderClaimed,
}

/// Estimated hours compared with claimed hours.
///
/// # Example
///
/// ```
/// use workhour_engine::models::{ClaimVariance, ComparisonResult};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let comparison = ComparisonResult {
///     employee_id: "E1001".to_string(),
///     date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
///     claimed_hours: Decimal::new(80, 1),
///     estimated_hours: Decimal::new(792, 2),
///     difference_hours: Decimal::new(-8, 2),
///     estimate_to_claim_ratio: Some(0.99),
///     variance: ClaimVariance::WithinTolerance,
/// };
/// assert_eq!(comparison.variance, ClaimVariance::WithinTolerance);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// The employee compared.
    pub employee_id: String,
    /// The day compared.
    pub date: NaiveDate,
    /// The self-reported hours.
    pub claimed_hours: Decimal,
    /// Estimated work hours, rounded to two decimal places.
    pub estimated_hours: Decimal,
    /// `estimated_hours - claimed_hours`.
    pub difference_hours: Decimal,
    /// `estimated / claimed`; absent when the claim is zero.
    pub estimate_to_claim_ratio: Option<f64>,
    /// Classification of the difference.
    pub variance: ClaimVariance,
}

/// Ground-rules adjusted work hours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibratedHours {
    /// Raw estimated work hours.
    pub raw_hours: f64,
    /// Reliability score used for the adjustment, clamped to 0..=100.
    pub reliability_score: f64,
    /// The multiplier applied, within `[lower_bound, 1]`.
    pub adjustment_factor: f64,
    /// `raw_hours * adjustment_factor`.
    pub calibrated_hours: f64,
}

/// The row persisted for one (employee, date).
///
/// Writing a record overwrites any previous record with the same key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyWorkRecord {
    /// The shift the figures were computed for.
    pub shift: ShiftType,
    /// The job group the employee was classified into.
    pub job_group: JobGroup,
    /// The aggregated metrics.
    pub metrics: WorkMetrics,
    /// The calibrated hours.
    pub calibrated: CalibratedHours,
    /// When the record was computed.
    pub computed_at: DateTime<Utc>,
    /// The batch run that produced the record, if any.
    #[serde(default)]
    pub run_id: Option<Uuid>,
}

impl DailyWorkRecord {
    /// The upsert key.
    pub fn key(&self) -> (String, NaiveDate) {
        (self.metrics.employee_id.clone(), self.metrics.date)
    }
}
