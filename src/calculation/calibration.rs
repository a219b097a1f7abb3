//! Ground-rules calibration of estimated work hours.
//!
//! Raw estimates are discounted by a logistic function of the day's
//! reliability score:
//!
//! ```text
//! factor = lower_bound + sigmoid(steepness * (reliability / 100 - midpoint)) * (1 - lower_bound)
//! ```
//!
//! The factor always lies in `[lower_bound, 1]`, so calibrated hours never
//! exceed the raw estimate.

use crate::config::CalibrationSettings;
use crate::models::CalibratedHours;

/// Applies the ground-rules adjustment to raw estimated hours.
///
/// The reliability score is clamped to `0..=100` before use. The factor is
/// monotone non-decreasing in reliability.
///
/// # Example
///
/// ```
/// use workhour_engine::calculation::calibrate;
/// use workhour_engine::config::CalibrationSettings;
///
/// let settings = CalibrationSettings {
///     lower_bound: 0.92,
///     steepness: 12.0,
///     midpoint: 0.65,
/// };
/// let result = calibrate(8.0, 65.0, &settings);
/// assert!((result.adjustment_factor - 0.96).abs() < 1e-9);
/// assert!((result.calibrated_hours - 7.68).abs() < 1e-9);
/// ```
pub fn calibrate(
    raw_hours: f64,
    reliability_score: f64,
    settings: &CalibrationSettings,
) -> CalibratedHours {
    let reliability_score = reliability_score.clamp(0.0, 100.0);
    let x = settings.steepness * (reliability_score / 100.0 - settings.midpoint);
    let adjustment_factor =
        settings.lower_bound + sigmoid(x) * (1.0 - settings.lower_bound);

    CalibratedHours {
        raw_hours,
        reliability_score,
        adjustment_factor,
        calibrated_hours: raw_hours * adjustment_factor,
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
