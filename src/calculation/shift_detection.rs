//! Shift window construction and day/night shift detection.
//!
//! This module turns a (date, shift) pair into the time range pulled from
//! every source, and infers from an event sequence whether it looks like a
//! night shift.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::config::ShiftSettings;
use crate::models::{EnrichedEvent, ShiftType, ShiftWindow};

/// Builds the search window for a date and shift.
///
/// Day windows cover 24 hours from `day_start_hour`. Night windows open at
/// `night_start_hour` on the date and close at `night_end_hour` the next day.
///
/// # Example
///
/// ```no_run
/// use workhour_engine::calculation::shift_window;
/// use workhour_engine::config::ConfigLoader;
/// use workhour_engine::models::ShiftType;
/// use chrono::NaiveDate;
///
/// let config = ConfigLoader::load("./config/default").unwrap().into_config();
/// let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
/// let window = shift_window(date, ShiftType::Night, &config.settings().shift);
/// assert!(window.crosses_midnight());
/// ```
pub fn shift_window(date: NaiveDate, shift: ShiftType, settings: &ShiftSettings) -> ShiftWindow {
    let (start, end) = match shift {
        ShiftType::Day => {
            let start = at_hour(date, settings.day_start_hour);
            (start, start + Duration::hours(24))
        }
        ShiftType::Night => (
            at_hour(date, settings.night_start_hour),
            at_hour(date + Duration::days(1), settings.night_end_hour),
        ),
    };

    ShiftWindow {
        date,
        shift,
        start,
        end,
    }
}

/// Infers the shift type from event timestamps.
///
/// An event is night-side when its hour is at or after
/// `night_boundary_hour` or before `morning_boundary_hour`. The sequence is
/// a night shift when night-side events are a strict majority; an empty
/// sequence is a day shift.
pub fn detect_shift_type(events: &[EnrichedEvent], settings: &ShiftSettings) -> ShiftType {
    if events.is_empty() {
        return ShiftType::Day;
    }

    let night_side = events
        .iter()
        .filter(|e| is_night_side(e.timestamp, settings))
        .count();

    if night_side * 2 > events.len() {
        ShiftType::Night
    } else {
        ShiftType::Day
    }
}

fn is_night_side(timestamp: NaiveDateTime, settings: &ShiftSettings) -> bool {
    let hour = timestamp.hour();
    hour >= settings.night_boundary_hour || hour < settings.morning_boundary_hour
}

fn at_hour(date: NaiveDate, hour: u32) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) + Duration::hours(i64::from(hour))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceKind;

    fn settings() -> ShiftSettings {
        ShiftSettings {
            day_start_hour: 0,
            night_start_hour: 17,
            night_end_hour: 12,
            night_boundary_hour: 20,
            morning_boundary_hour: 6,
        }
    }

    fn make_datetime(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn make_date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn event(ts: &str) -> EnrichedEvent {
        EnrichedEvent {
            timestamp: make_datetime(ts),
            employee_id: "E1001".to_string(),
            tag_type: SourceKind::AccessControl,
            tag_code: "G1".to_string(),
            tag_name: "Work area gate".to_string(),
        }
    }

    #[test]
    fn test_day_window_covers_calendar_day() {
        let window = shift_window(make_date("2025-06-02"), ShiftType::Day, &settings());
        assert_eq!(window.start, make_datetime("2025-06-02 00:00:00"));
        assert_eq!(window.end, make_datetime("2025-06-03 00:00:00"));
        assert_eq!(window.shift, ShiftType::Day);
    }

    #[test]
    fn test_night_window_spans_midnight() {
        let window = shift_window(make_date("2025-06-02"), ShiftType::Night, &settings());
        assert_eq!(window.start, make_datetime("2025-06-02 17:00:00"));
        assert_eq!(window.end, make_datetime("2025-06-03 12:00:00"));
        assert!(window.crosses_midnight());
    }

    #[test]
    fn test_night_window_at_month_end() {
        let window = shift_window(make_date("2025-06-30"), ShiftType::Night, &settings());
        assert_eq!(window.end, make_datetime("2025-07-01 12:00:00"));
    }

    #[test]
    fn test_shifted_day_start() {
        let mut s = settings();
        s.day_start_hour = 5;
        let window = shift_window(make_date("2025-06-02"), ShiftType::Day, &s);
        assert_eq!(window.start, make_datetime("2025-06-02 05:00:00"));
        assert_eq!(window.end, make_datetime("2025-06-03 05:00:00"));
    }

    #[test]
    fn test_detect_day_shift() {
        let events = vec![
            event("2025-06-02 08:00:00"),
            event("2025-06-02 12:00:00"),
            event("2025-06-02 17:30:00"),
        ];
        assert_eq!(detect_shift_type(&events, &settings()), ShiftType::Day);
    }

    #[test]
    fn test_detect_night_shift() {
        let events = vec![
            event("2025-06-02 20:30:00"),
            event("2025-06-02 23:00:00"),
            event("2025-06-03 02:00:00"),
            event("2025-06-03 07:00:00"),
        ];
        assert_eq!(detect_shift_type(&events, &settings()), ShiftType::Night);
    }

    #[test]
    fn test_even_split_is_day() {
        let events = vec![event("2025-06-02 21:00:00"), event("2025-06-02 10:00:00")];
        assert_eq!(detect_shift_type(&events, &settings()), ShiftType::Day);
    }

    #[test]
    fn test_empty_sequence_is_day() {
        assert_eq!(detect_shift_type(&[], &settings()), ShiftType::Day);
    }

    #[test]
    fn test_boundary_hours() {
        let s = settings();
        assert!(is_night_side(make_datetime("2025-06-02 20:00:00"), &s));
        assert!(!is_night_side(make_datetime("2025-06-02 19:59:59"), &s));
        assert!(is_night_side(make_datetime("2025-06-02 05:59:00"), &s));
        assert!(!is_night_side(make_datetime("2025-06-02 06:00:00"), &s));
    }
}
