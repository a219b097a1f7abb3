//! Calculation logic for the work-hour inference engine.
//!
//! This module contains the pure analytical stages of the pipeline: shift
//! window construction and shift detection, event enrichment, job group
//! classification, activity state classification, timeline construction,
//! aggregation, claim comparison and ground-rules calibration.

mod aggregation;
mod calibration;
mod claim_comparison;
mod enrichment;
mod job_group;
mod shift_detection;
mod state_classifier;
mod timeline;

pub use aggregation::{calculate_metrics, degrade_reliability};
pub use calibration::calibrate;
pub use claim_comparison::compare_with_claim;
pub use enrichment::{EnrichmentOutcome, SourceBatch, enrich, merge_records};
pub use job_group::{classify_job_group, prior_probability};
pub use shift_detection::{detect_shift_type, shift_window};
pub use state_classifier::{EventContext, classify_event, is_return_pattern};
pub use timeline::build_timeline;
