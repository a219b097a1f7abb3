//! Work-hour aggregation.
//!
//! This module folds a classified timeline into [`WorkMetrics`]: minutes per
//! bucket, the estimated work time, the work ratio and a reliability score
//! describing how much of the day was classified without the job group prior.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::config::{EngineConfig, MetricBucket};
use crate::models::{ActivityState, TimelineEntry, WorkMetrics};

/// Aggregates a timeline into daily metrics.
///
/// Every entry's duration lands in exactly one bucket. Estimated work time
/// is the sum of the buckets configured as estimated work, and the work
/// ratio is that sum over the total. Reliability is a duration-weighted
/// score from 0 to 100: entries from the tag table and from the boundary or
/// return-pattern rules weigh 1, entries resolved from the prior weigh
/// `|confidence - 0.5| * 2`. A timeline with no elapsed time scores 0.
///
/// The function is pure; equal inputs give equal metrics.
pub fn calculate_metrics(
    employee_id: &str,
    date: NaiveDate,
    timeline: &[TimelineEntry],
    config: &EngineConfig,
) -> WorkMetrics {
    let mut bucket_minutes: BTreeMap<MetricBucket, f64> = BTreeMap::new();
    let mut state_minutes: BTreeMap<ActivityState, f64> = BTreeMap::new();
    let mut total = 0.0;
    let mut backed = 0.0;

    for entry in timeline {
        let minutes = entry.duration_minutes;
        total += minutes;
        backed += minutes * evidence_weight(entry);

        *state_minutes.entry(entry.state).or_default() += minutes;
        if let Some(bucket) = config.bucket_for(entry.state) {
            *bucket_minutes.entry(bucket).or_default() += minutes;
        }
    }

    let bucket = |b: MetricBucket| bucket_minutes.get(&b).copied().unwrap_or(0.0);
    let estimated: f64 = config
        .settings()
        .metrics
        .estimated_work
        .iter()
        .map(|b| bucket(*b))
        .sum();

    let (work_ratio, reliability_score) = if total > 0.0 {
        (estimated / total, backed / total * 100.0)
    } else {
        (0.0, 0.0)
    };

    WorkMetrics {
        employee_id: employee_id.to_string(),
        date,
        total_time_minutes: total,
        work_time_minutes: bucket(MetricBucket::Work),
        estimated_work_time_minutes: estimated,
        focus_time_minutes: bucket(MetricBucket::Focus),
        meeting_time_minutes: bucket(MetricBucket::Meeting),
        meal_time_minutes: bucket(MetricBucket::Meal),
        transit_time_minutes: bucket(MetricBucket::Transit),
        rest_time_minutes: bucket(MetricBucket::Rest),
        work_ratio,
        reliability_score,
        state_minutes,
    }
}

/// Lowers a reliability score for sources that could not be queried.
///
/// Each missing source removes `penalty` of the score, clamped at 0.
pub fn degrade_reliability(reliability_score: f64, missing_sources: usize, penalty: f64) -> f64 {
    let factor = (1.0 - penalty * missing_sources as f64).max(0.0);
    reliability_score * factor
}

fn evidence_weight(entry: &TimelineEntry) -> f64 {
    match entry.assumption {
        Some(assumption) if assumption.is_probabilistic() => {
            ((entry.confidence - 0.5).abs() * 2.0).min(1.0)
        }
        _ => 1.0,
    }
}
