//! Core data models for the Work-Hour Inference Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod date_range;
mod employee;
mod event;
mod metrics;
mod shift;
mod timeline;

pub use date_range::DateRange;
pub use employee::{Employee, JobGroup};
pub use event::{EnrichedEvent, RawEvent, SourceKind};
pub use metrics::{
    CalibratedHours, ClaimVariance, ClaimedHours, ComparisonResult, DailyWorkRecord, WorkMetrics,
};
pub use shift::{ShiftType, ShiftWindow};
pub use timeline::{ActivityState, Assumption, Judgment, TimelineEntry};
