//! Activity state classification for a single event.
//!
//! Classification is stateless: everything the decision depends on (the
//! neighbouring events, the boundary flags and the return-pattern flag) is
//! computed by the caller and passed in through [`EventContext`].
//!
//! Resolution order:
//! 1. Unambiguous tag codes map through the tag table.
//! 2. A return pattern forces the event to work with full confidence.
//! 3. The first and last ambiguous events of the day are site access.
//! 4. Anything else takes the job group prior.

use chrono::NaiveDateTime;

use crate::config::EngineConfig;
use crate::models::{ActivityState, Assumption, EnrichedEvent, JobGroup, TimelineEntry};

/// Everything [`classify_event`] needs to know about one event.
#[derive(Debug, Clone, Copy)]
pub struct EventContext<'a> {
    /// The event being classified.
    pub current: &'a EnrichedEvent,
    /// The preceding event, if any.
    pub prev: Option<&'a EnrichedEvent>,
    /// The following event, if any.
    pub next: Option<&'a EnrichedEvent>,
    /// The employee's job group.
    pub job_group: JobGroup,
    /// The event is the first ambiguous event of the day.
    pub is_first_ambiguous: bool,
    /// The event is the last ambiguous event of the day.
    pub is_last_ambiguous: bool,
    /// The event is the middle of an ambiguous, ambiguous, gate sequence.
    pub is_return_pattern: bool,
    /// Where the final entry of the sequence ends, if anywhere.
    pub day_end: Option<NaiveDateTime>,
}

/// Classifies one event into a [`TimelineEntry`].
///
/// The entry's duration runs to the next event. The final event of a
/// sequence lasts until `day_end` when the caller supplies one and 0 minutes
/// otherwise.
pub fn classify_event(ctx: &EventContext<'_>, config: &EngineConfig) -> TimelineEntry {
    let (state, confidence, assumption) = resolve_state(ctx, config);
    let duration_minutes = duration_minutes(ctx);

    TimelineEntry {
        timestamp: ctx.current.timestamp,
        tag_type: ctx.current.tag_type,
        tag_code: ctx.current.tag_code.clone(),
        tag_name: ctx.current.tag_name.clone(),
        duration_minutes,
        state,
        judgment: state.judgment(),
        confidence,
        assumption,
    }
}

/// Returns true when `current` sits in the middle of an out-and-back
/// excursion: an ambiguous event, then `current` (also ambiguous), then a
/// gate event no more than the configured window after `current`.
pub fn is_return_pattern(
    prev: Option<&EnrichedEvent>,
    current: &EnrichedEvent,
    next: Option<&EnrichedEvent>,
    config: &EngineConfig,
) -> bool {
    let (Some(prev), Some(next)) = (prev, next) else {
        return false;
    };

    if !config.is_ambiguous(&prev.tag_code)
        || !config.is_ambiguous(&current.tag_code)
        || !config.is_gate(&next.tag_code)
    {
        return false;
    }

    let window = config.settings().classification.return_pattern_window_minutes;
    let gap = next.timestamp - current.timestamp;
    gap.num_seconds() >= 0 && gap.num_seconds() <= window * 60
}

fn resolve_state(
    ctx: &EventContext<'_>,
    config: &EngineConfig,
) -> (ActivityState, f64, Option<Assumption>) {
    let code = ctx.current.tag_code.as_str();

    if !config.is_ambiguous(code) {
        if let Some(rule) = config.tag_rule(code) {
            return (rule.state, rule.confidence, None);
        }
    }

    if ctx.is_return_pattern {
        return (
            ActivityState::Work,
            1.0,
            Some(Assumption::ResolvedByReturnPattern),
        );
    }
    if ctx.is_first_ambiguous {
        return (
            ActivityState::AccessIn,
            1.0,
            Some(Assumption::FirstAmbiguousOfDay),
        );
    }
    if ctx.is_last_ambiguous {
        return (
            ActivityState::AccessOut,
            1.0,
            Some(Assumption::LastAmbiguousOfDay),
        );
    }

    let prior = config.prior(ctx.job_group);
    let state = if prior >= config.settings().classification.work_judgment_threshold {
        ActivityState::Work
    } else {
        ActivityState::NonWork
    };
    (state, prior, Some(Assumption::JobGroupPrior))
}

fn duration_minutes(ctx: &EventContext<'_>) -> f64 {
    let end = ctx.next.map(|next| next.timestamp).or(ctx.day_end);

    match end {
        Some(end) => ((end - ctx.current.timestamp).num_seconds().max(0)) as f64 / 60.0,
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use crate::models::{Judgment, SourceKind};

    fn config() -> EngineConfig {
        ConfigLoader::load("./config/default").unwrap().into_config()
    }

    fn make_datetime(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn event(ts: &str, code: &str) -> EnrichedEvent {
        EnrichedEvent {
            timestamp: make_datetime(ts),
            employee_id: "E1001".to_string(),
            tag_type: SourceKind::AccessControl,
            tag_code: code.to_string(),
            tag_name: code.to_string(),
        }
    }

    fn context<'a>(
        current: &'a EnrichedEvent,
        next: Option<&'a EnrichedEvent>,
        job_group: JobGroup,
    ) -> EventContext<'a> {
        EventContext {
            current,
            prev: None,
            next,
            job_group,
            is_first_ambiguous: false,
            is_last_ambiguous: false,
            is_return_pattern: false,
            day_end: None,
        }
    }

    #[test]
    fn test_gate_tag_maps_through_table() {
        let config = config();
        let current = event("2025-06-02 08:00:00", "G1");
        let next = event("2025-06-02 12:00:00", "M1");

        let entry = classify_event(&context(&current, Some(&next), JobGroup::Office), &config);

        assert_eq!(entry.state, ActivityState::Work);
        assert_eq!(entry.judgment, Judgment::Work);
        assert_eq!(entry.confidence, 1.0);
        assert_eq!(entry.assumption, None);
        assert_eq!(entry.duration_minutes, 240.0);
    }

    #[test]
    fn test_near_certain_tags_keep_table_confidence() {
        let config = config();
        let current = event("2025-06-02 10:00:00", "O");
        let entry = classify_event(&context(&current, None, JobGroup::Office), &config);
        assert_eq!(entry.state, ActivityState::FocusedWork);
        assert_eq!(entry.confidence, 0.98);
    }

    #[test]
    fn test_table_wins_over_flags() {
        let config = config();
        let current = event("2025-06-02 12:00:00", "M1");
        let mut ctx = context(&current, None, JobGroup::Production);
        ctx.is_first_ambiguous = true;
        ctx.is_return_pattern = true;

        let entry = classify_event(&ctx, &config);
        assert_eq!(entry.state, ActivityState::Meal);
        assert_eq!(entry.judgment, Judgment::NonWork);
    }

    #[test]
    fn test_return_pattern_forces_work() {
        let config = config();
        let current = event("2025-06-02 12:35:00", "T1");
        let mut ctx = context(&current, None, JobGroup::Management);
        ctx.is_return_pattern = true;
        ctx.is_last_ambiguous = true;

        let entry = classify_event(&ctx, &config);
        assert_eq!(entry.state, ActivityState::Work);
        assert_eq!(entry.confidence, 1.0);
        assert_eq!(entry.assumption, Some(Assumption::ResolvedByReturnPattern));
    }

    #[test]
    fn test_boundary_flags_produce_access_states() {
        let config = config();
        let current = event("2025-06-02 07:55:00", "T1");

        let mut first = context(&current, None, JobGroup::Production);
        first.is_first_ambiguous = true;
        let entry = classify_event(&first, &config);
        assert_eq!(entry.state, ActivityState::AccessIn);
        assert_eq!(entry.judgment, Judgment::Transit);
        assert_eq!(entry.assumption, Some(Assumption::FirstAmbiguousOfDay));

        let mut last = context(&current, None, JobGroup::Production);
        last.is_last_ambiguous = true;
        let entry = classify_event(&last, &config);
        assert_eq!(entry.state, ActivityState::AccessOut);
        assert_eq!(entry.assumption, Some(Assumption::LastAmbiguousOfDay));
    }

    #[test]
    fn test_single_ambiguous_event_is_access_in() {
        let config = config();
        let current = event("2025-06-02 07:55:00", "T1");
        let mut ctx = context(&current, None, JobGroup::Office);
        ctx.is_first_ambiguous = true;
        ctx.is_last_ambiguous = true;
        assert_eq!(classify_event(&ctx, &config).state, ActivityState::AccessIn);
    }

    #[test]
    fn test_default_resolution_uses_prior_exactly() {
        let config = config();
        let current = event("2025-06-02 14:00:00", "T1");
        for group in JobGroup::ALL {
            let entry = classify_event(&context(&current, None, group), &config);
            assert_eq!(entry.confidence, config.prior(group));
            assert_eq!(entry.state, ActivityState::Work);
            assert_eq!(entry.assumption, Some(Assumption::JobGroupPrior));
        }
    }

    #[test]
    fn test_unknown_codes_resolve_as_ambiguous() {
        let config = config();
        let current = event("2025-06-02 14:00:00", "ZZ9");
        let entry = classify_event(&context(&current, None, JobGroup::Research), &config);
        assert_eq!(entry.confidence, 0.75);
        assert_eq!(entry.assumption, Some(Assumption::JobGroupPrior));
    }

    #[test]
    fn test_final_event_has_zero_duration_without_cutoff() {
        let config = config();
        let current = event("2025-06-02 17:30:00", "T3");
        let entry = classify_event(&context(&current, None, JobGroup::Office), &config);
        assert_eq!(entry.duration_minutes, 0.0);
    }

    #[test]
    fn test_final_event_runs_to_day_end() {
        let config = config();
        let current = event("2025-06-02 17:30:00", "T3");
        let mut ctx = context(&current, None, JobGroup::Office);
        ctx.day_end = Some(make_datetime("2025-06-02 18:00:00"));
        assert_eq!(classify_event(&ctx, &config).duration_minutes, 30.0);

        ctx.day_end = Some(make_datetime("2025-06-02 17:00:00"));
        assert_eq!(classify_event(&ctx, &config).duration_minutes, 0.0);
    }

    #[test]
    fn test_day_end_ignored_when_next_event_exists() {
        let config = config();
        let current = event("2025-06-02 08:00:00", "G1");
        let next = event("2025-06-02 12:00:00", "M1");
        let mut ctx = context(&current, Some(&next), JobGroup::Office);
        ctx.day_end = Some(make_datetime("2025-06-02 18:00:00"));
        assert_eq!(classify_event(&ctx, &config).duration_minutes, 240.0);
    }

    #[test]
    fn test_classification_is_idempotent() {
        let config = config();
        let current = event("2025-06-02 14:00:00", "T1");
        let next = event("2025-06-02 14:20:00", "G1");
        let ctx = context(&current, Some(&next), JobGroup::Office);
        assert_eq!(classify_event(&ctx, &config), classify_event(&ctx, &config));
    }

    #[test]
    fn test_return_pattern_detection() {
        let config = config();
        let prev = event("2025-06-02 12:30:00", "T1");
        let current = event("2025-06-02 12:35:00", "T1");
        let gate = event("2025-06-02 12:40:00", "G1");
        let late_gate = event("2025-06-02 13:06:00", "G1");
        let exact_gate = event("2025-06-02 13:05:00", "G1");
        let meal = event("2025-06-02 12:40:00", "M1");

        assert!(is_return_pattern(Some(&prev), &current, Some(&gate), &config));
        assert!(is_return_pattern(Some(&prev), &current, Some(&exact_gate), &config));
        assert!(!is_return_pattern(Some(&prev), &current, Some(&late_gate), &config));
        assert!(!is_return_pattern(Some(&prev), &current, Some(&meal), &config));
        assert!(!is_return_pattern(None, &current, Some(&gate), &config));
        assert!(!is_return_pattern(Some(&gate), &current, Some(&gate), &config));
    }
}
