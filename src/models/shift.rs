//! Shift type and shift window models.
//!
//! A unit of work is an (employee, date, shift) tuple. The shift decides which
//! slice of time is pulled from every source store.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Day or night shift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftType {
    /// A shift contained in the calendar day.
    #[default]
    Day,
    /// A shift that starts in the evening and ends the next morning.
    Night,
}

impl ShiftType {
    /// Returns the other shift type.
    ///
    /// ```
    /// use workhour_engine::models::ShiftType;
    ///
    /// assert_eq!(ShiftType::Day.opposite(), ShiftType::Night);
    /// ```
    pub fn opposite(self) -> Self {
        match self {
            ShiftType::Day => ShiftType::Night,
            ShiftType::Night => ShiftType::Day,
        }
    }
}

impl std::fmt::Display for ShiftType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShiftType::Day => write!(f, "day"),
            ShiftType::Night => write!(f, "night"),
        }
    }
}

/// The half-open time range `[start, end)` searched for one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftWindow {
    /// The calendar date the shift is attributed to.
    pub date: NaiveDate,
    /// The shift type.
    pub shift: ShiftType,
    /// Inclusive window start.
    pub start: NaiveDateTime,
    /// Exclusive window end.
    pub end: NaiveDateTime,
}

impl ShiftWindow {
    /// Returns true if the timestamp falls inside the window.
    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        timestamp >= self.start && timestamp < self.end
    }

    /// Returns true if the window spans midnight.
    pub fn crosses_midnight(&self) -> bool {
        self.end.date() > self.start.date() && self.end.time() != chrono::NaiveTime::MIN
    }
}
