//! Request types for the work-hour engine API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{DateRange, ShiftType};
use crate::pipeline::BatchRequest;

/// Request body for the `/units` endpoint.
///
/// When `shift` is omitted the day window is searched first and the shift
/// is detected from the events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitRequestBody {
    /// The employee to process.
    pub employee_id: String,
    /// The date to process.
    pub date: NaiveDate,
    /// The shift window to search.
    #[serde(default)]
    pub shift: Option<ShiftType>,
}

impl UnitRequestBody {
    /// The shift to search and whether to auto-detect.
    pub fn shift_plan(&self) -> (ShiftType, bool) {
        shift_plan(self.shift)
    }
}

/// Request body for the `/batches` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequestBody {
    /// Employees to process.
    pub employee_ids: Vec<String>,
    /// The first date (inclusive).
    pub start_date: NaiveDate,
    /// The last date (inclusive).
    pub end_date: NaiveDate,
    /// Write results; `false` is a dry run.
    #[serde(default)]
    pub persist: bool,
    /// The shift window to search.
    #[serde(default)]
    pub shift: Option<ShiftType>,
}

impl From<BatchRequestBody> for BatchRequest {
    fn from(body: BatchRequestBody) -> Self {
        let (shift, auto_detect_shift) = shift_plan(body.shift);
        BatchRequest {
            employee_ids: body.employee_ids,
            range: DateRange {
                start_date: body.start_date,
                end_date: body.end_date,
            },
            shift,
            auto_detect_shift,
            persist: body.persist,
        }
    }
}

fn shift_plan(shift: Option<ShiftType>) -> (ShiftType, bool) {
    match shift {
        Some(shift) => (shift, false),
        None => (ShiftType::Day, true),
    }
}
