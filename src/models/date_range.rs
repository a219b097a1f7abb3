//! Inclusive date range model.
//!
//! Batch runs cover every date of a [`DateRange`] for every requested
//! employee.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An inclusive range of calendar dates.
///
/// # Example
///
/// ```
/// use workhour_engine::models::DateRange;
/// use chrono::NaiveDate;
///
/// let range = DateRange {
///     start_date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
///     end_date: NaiveDate::from_ymd_opt(2025, 6, 4).unwrap(),
/// };
///
/// assert!(range.is_valid());
/// assert_eq!(range.days().count(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// The first date (inclusive).
    pub start_date: NaiveDate,
    /// The last date (inclusive).
    pub end_date: NaiveDate,
}

impl DateRange {
    /// Returns true if the end date is not before the start date.
    pub fn is_valid(&self) -> bool {
        self.end_date >= self.start_date
    }

    /// Iterates over every date in the range. Empty when the range is inverted.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start_date
            .iter_days()
            .take_while(move |d| *d <= self.end_date)
    }
}
