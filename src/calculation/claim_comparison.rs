//! Comparison of estimated work hours with self-reported hours.

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

use crate::models::{ClaimVariance, ClaimedHours, ComparisonResult, WorkMetrics};

/// Compares a day's estimated work hours with the claim filed for it.
///
/// Returns `None` when no claim exists; a missing claim is not an error.
/// Hour figures are decimal hours rounded to two places. The difference is
/// `estimated - claimed`, so a negative difference means more hours were
/// claimed than observed.
///
/// # Example
///
/// ```
/// use workhour_engine::calculation::compare_with_claim;
/// # use workhour_engine::models::{ClaimedHours, ClaimVariance, WorkMetrics};
/// # use chrono::NaiveDate;
/// # use rust_decimal::Decimal;
/// # use std::str::FromStr;
/// # let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
/// # let metrics = WorkMetrics {
/// #     employee_id: "E1001".to_string(), date,
/// #     total_time_minutes: 570.0, work_time_minutes: 480.0,
/// #     estimated_work_time_minutes: 480.0, focus_time_minutes: 0.0,
/// #     meeting_time_minutes: 0.0, meal_time_minutes: 30.0,
/// #     transit_time_minutes: 60.0, rest_time_minutes: 0.0,
/// #     work_ratio: 0.84, reliability_score: 100.0,
/// #     state_minutes: Default::default(),
/// # };
/// let claim = ClaimedHours {
///     employee_id: "E1001".to_string(),
///     date,
///     hours: Decimal::from_str("10.0").unwrap(),
/// };
/// let result = compare_with_claim(&metrics, Some(&claim), Decimal::from_str("0.5").unwrap())
///     .unwrap();
/// assert_eq!(result.variance, ClaimVariance::OverClaimed);
/// assert_eq!(result.difference_hours, Decimal::from_str("-2.00").unwrap());
/// ```
pub fn compare_with_claim(
    metrics: &WorkMetrics,
    claim: Option<&ClaimedHours>,
    tolerance_hours: Decimal,
) -> Option<ComparisonResult> {
    let claim = claim?;

    let estimated_hours = Decimal::from_f64(metrics.estimated_work_hours())
        .unwrap_or_default()
        .round_dp(2);
    let claimed_hours = claim.hours;
    let difference_hours = estimated_hours - claimed_hours;

    let variance = if difference_hours.abs() <= tolerance_hours {
        ClaimVariance::WithinTolerance
    } else if difference_hours < Decimal::ZERO {
        ClaimVariance::OverClaimed
    } else {
        ClaimVariance::UnderClaimed
    };

    let estimate_to_claim_ratio = if claimed_hours.is_zero() {
        None
    } else {
        (estimated_hours / claimed_hours).to_f64()
    };

    Some(ComparisonResult {
        employee_id: metrics.employee_id.clone(),
        date: metrics.date,
        claimed_hours,
        estimated_hours,
        difference_hours,
        estimate_to_claim_ratio,
        variance,
    })
}
