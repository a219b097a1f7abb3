//! Timeline construction.
//!
//! Walks an ordered enriched sequence, computes each event's context and
//! classifies it. The result holds one entry per event in the same order.

use chrono::NaiveDateTime;
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{EnrichedEvent, JobGroup, ShiftWindow, TimelineEntry};

use super::state_classifier::{EventContext, classify_event, is_return_pattern};

/// Classifies every event of an ordered sequence pulled from `window`.
///
/// With `day_end_cutoff` configured, the final entry runs to the cutoff on
/// the last event's date, never past the end of the window.
///
/// # Errors
///
/// Returns [`EngineError::ConfigurationError`] when the sequence is empty or
/// not ordered by timestamp.
pub fn build_timeline(
    events: &[EnrichedEvent],
    job_group: JobGroup,
    window: &ShiftWindow,
    config: &EngineConfig,
) -> EngineResult<Vec<TimelineEntry>> {
    if events.is_empty() {
        return Err(EngineError::ConfigurationError {
            message: "cannot classify an empty sequence".to_string(),
        });
    }
    if let Some(pos) = events
        .windows(2)
        .position(|pair| pair[1].timestamp < pair[0].timestamp)
    {
        return Err(EngineError::ConfigurationError {
            message: format!(
                "event {} at {} precedes event {} at {}",
                pos + 1,
                events[pos + 1].timestamp,
                pos,
                events[pos].timestamp
            ),
        });
    }

    let first_ambiguous = events.iter().position(|e| config.is_ambiguous(&e.tag_code));
    let last_ambiguous = events.iter().rposition(|e| config.is_ambiguous(&e.tag_code));
    let day_end = day_end(&events[events.len() - 1], window, config);

    let timeline: Vec<TimelineEntry> = events
        .iter()
        .enumerate()
        .map(|(i, current)| {
            let prev = i.checked_sub(1).map(|p| &events[p]);
            let next = events.get(i + 1);
            let ctx = EventContext {
                current,
                prev,
                next,
                job_group,
                is_first_ambiguous: first_ambiguous == Some(i),
                is_last_ambiguous: last_ambiguous == Some(i),
                is_return_pattern: is_return_pattern(prev, current, next, config),
                day_end,
            };
            classify_event(&ctx, config)
        })
        .collect();

    debug!(
        employee_id = %events[0].employee_id,
        entries = timeline.len(),
        inferred = timeline.iter().filter(|e| e.assumption.is_some()).count(),
        "Built timeline"
    );

    Ok(timeline)
}

fn day_end(
    last: &EnrichedEvent,
    window: &ShiftWindow,
    config: &EngineConfig,
) -> Option<NaiveDateTime> {
    let cutoff = config.settings().classification.day_end_cutoff?;
    Some(last.timestamp.date().and_time(cutoff).min(window.end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::shift_window;
    use crate::config::{
        ConfigLoader, EngineSettings, JobGroupsConfig, SourcesConfig, TagRulesConfig,
    };
    use crate::models::{ActivityState, Assumption, ShiftType, SourceKind};
    use chrono::{NaiveDate, NaiveTime};

    fn config() -> EngineConfig {
        ConfigLoader::load("./config/default").unwrap().into_config()
    }

    fn read_default(file: &str) -> String {
        std::fs::read_to_string(format!("./config/default/{}", file)).unwrap()
    }

    fn config_with_cutoff(cutoff: &str) -> EngineConfig {
        let mut settings: EngineSettings = serde_yaml::from_str(&read_default("engine.yaml")).unwrap();
        settings.classification.day_end_cutoff =
            Some(NaiveTime::parse_from_str(cutoff, "%H:%M:%S").unwrap());
        let tag_rules: TagRulesConfig = serde_yaml::from_str(&read_default("tag_rules.yaml")).unwrap();
        let job_groups: JobGroupsConfig =
            serde_yaml::from_str(&read_default("job_groups.yaml")).unwrap();
        let sources: SourcesConfig = serde_yaml::from_str(&read_default("sources.yaml")).unwrap();
        EngineConfig::new(settings, tag_rules, job_groups, sources).unwrap()
    }

    fn window(shift: ShiftType) -> ShiftWindow {
        let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        shift_window(date, shift, &config().settings().shift)
    }

    fn day() -> ShiftWindow {
        window(ShiftType::Day)
    }

    fn make_datetime(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn event(time: &str, code: &str) -> EnrichedEvent {
        EnrichedEvent {
            timestamp: make_datetime(&format!("2025-06-02 {}", time)),
            employee_id: "E1001".to_string(),
            tag_type: if code.starts_with('M') {
                SourceKind::Meal
            } else {
                SourceKind::AccessControl
            },
            tag_code: code.to_string(),
            tag_name: code.to_string(),
        }
    }

    fn office_day() -> Vec<EnrichedEvent> {
        vec![
            event("08:00:00", "G1"),
            event("12:00:00", "M1"),
            event("12:30:00", "T1"),
            event("12:35:00", "T1"),
            event("12:40:00", "G1"),
            event("17:30:00", "T3"),
        ]
    }

    #[test]
    fn test_one_entry_per_event_in_order() {
        let events = office_day();
        let timeline = build_timeline(&events, JobGroup::Office, &day(), &config()).unwrap();

        assert_eq!(timeline.len(), events.len());
        for (entry, event) in timeline.iter().zip(&events) {
            assert_eq!(entry.timestamp, event.timestamp);
            assert_eq!(entry.tag_code, event.tag_code);
        }
    }

    #[test]
    fn test_office_day_states() {
        let timeline = build_timeline(&office_day(), JobGroup::Office, &day(), &config()).unwrap();
        let states: Vec<_> = timeline.iter().map(|e| e.state).collect();
        assert_eq!(
            states,
            vec![
                ActivityState::Work,
                ActivityState::Meal,
                ActivityState::AccessIn,
                ActivityState::Work,
                ActivityState::Work,
                ActivityState::AccessOut,
            ]
        );
        assert_eq!(
            timeline[3].assumption,
            Some(Assumption::ResolvedByReturnPattern)
        );
        assert!(timeline.iter().all(|e| e.assumption != Some(Assumption::JobGroupPrior)));
    }

    #[test]
    fn test_durations_sum_to_elapsed_time() {
        let timeline = build_timeline(&office_day(), JobGroup::Office, &day(), &config()).unwrap();
        let total: f64 = timeline.iter().map(|e| e.duration_minutes).sum();
        assert_eq!(total, 570.0);
        assert_eq!(timeline.last().unwrap().duration_minutes, 0.0);
    }

    #[test]
    fn test_return_gap_over_window_falls_back_to_prior() {
        let events = vec![
            event("08:00:00", "T1"),
            event("09:00:00", "G1"),
            event("12:30:00", "T1"),
            event("12:35:00", "T1"),
            event("13:06:00", "G1"),
            event("17:30:00", "T1"),
        ];
        let timeline = build_timeline(&events, JobGroup::Management, &day(), &config()).unwrap();

        assert_eq!(timeline[3].assumption, Some(Assumption::JobGroupPrior));
        assert_eq!(timeline[3].confidence, 0.60);
        assert_eq!(timeline[2].assumption, Some(Assumption::JobGroupPrior));
    }

    #[test]
    fn test_boundary_override_beats_high_prior() {
        let events = vec![
            event("07:55:00", "T1"),
            event("08:00:00", "G1"),
            event("17:30:00", "G1"),
            event("17:35:00", "T1"),
        ];
        let timeline = build_timeline(&events, JobGroup::Production, &day(), &config()).unwrap();
        assert_eq!(timeline[0].state, ActivityState::AccessIn);
        assert_eq!(timeline[3].state, ActivityState::AccessOut);
    }

    #[test]
    fn test_single_event_sequence() {
        let timeline =
            build_timeline(&[event("09:00:00", "T1")], JobGroup::Office, &day(), &config()).unwrap();
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].state, ActivityState::AccessIn);
        assert_eq!(timeline[0].duration_minutes, 0.0);
    }

    #[test]
    fn test_empty_sequence_is_rejected() {
        let result = build_timeline(&[], JobGroup::Office, &day(), &config());
        assert!(matches!(result, Err(EngineError::ConfigurationError { .. })));
    }

    #[test]
    fn test_unordered_sequence_is_rejected() {
        let events = vec![event("12:00:00", "G1"), event("08:00:00", "G1")];
        let result = build_timeline(&events, JobGroup::Office, &day(), &config());
        assert!(matches!(result, Err(EngineError::ConfigurationError { .. })));
    }

    #[test]
    fn test_equal_timestamps_are_accepted() {
        let events = vec![event("08:00:00", "G1"), event("08:00:00", "O")];
        let timeline = build_timeline(&events, JobGroup::Office, &day(), &config()).unwrap();
        assert_eq!(timeline[0].duration_minutes, 0.0);
    }

    #[test]
    fn test_day_shift_final_entry_runs_to_cutoff() {
        let config = config_with_cutoff("18:00:00");
        let timeline = build_timeline(&office_day(), JobGroup::Office, &day(), &config).unwrap();

        assert_eq!(timeline.last().unwrap().duration_minutes, 30.0);
        let total: f64 = timeline.iter().map(|e| e.duration_minutes).sum();
        assert_eq!(total, 600.0);
    }

    #[test]
    fn test_event_after_cutoff_has_zero_duration() {
        let config = config_with_cutoff("17:00:00");
        let timeline = build_timeline(&office_day(), JobGroup::Office, &day(), &config).unwrap();
        assert_eq!(timeline.last().unwrap().duration_minutes, 0.0);
    }

    #[test]
    fn test_night_shift_final_entry_stops_at_window_end() {
        let config = config_with_cutoff("18:00:00");
        let night = window(ShiftType::Night);
        let events = vec![
            EnrichedEvent {
                timestamp: make_datetime("2025-06-02 20:00:00"),
                ..event("00:00:00", "G1")
            },
            EnrichedEvent {
                timestamp: make_datetime("2025-06-03 05:00:00"),
                ..event("00:00:00", "T3")
            },
        ];

        let timeline = build_timeline(&events, JobGroup::Production, &night, &config).unwrap();

        assert_eq!(night.end, make_datetime("2025-06-03 12:00:00"));
        assert_eq!(timeline[0].duration_minutes, 540.0);
        assert_eq!(timeline[1].duration_minutes, 420.0);
    }
}
