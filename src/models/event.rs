//! Raw and enriched activity event models.
//!
//! This module defines the [`RawEvent`] records handed over by source stores
//! and the normalized [`EnrichedEvent`] the rest of the engine works on.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// The kind of sensing source an event came from.
///
/// The kind doubles as the `tag_type` of an enriched event.
///
/// # Example
///
/// ```
/// use workhour_engine::models::SourceKind;
///
/// assert_eq!(SourceKind::AccessControl.to_string(), "access_control");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Physical access / gate readers.
    AccessControl,
    /// Equipment or tool logins.
    Equipment,
    /// Collaboration tool activity (mail, approvals, meetings).
    Collaboration,
    /// Cafeteria and takeout meal transactions.
    Meal,
}

impl SourceKind {
    /// All source kinds, in declaration order.
    pub const ALL: [SourceKind; 4] = [
        SourceKind::AccessControl,
        SourceKind::Equipment,
        SourceKind::Collaboration,
        SourceKind::Meal,
    ];
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::AccessControl => write!(f, "access_control"),
            SourceKind::Equipment => write!(f, "equipment"),
            SourceKind::Collaboration => write!(f, "collaboration"),
            SourceKind::Meal => write!(f, "meal"),
        }
    }
}

/// A record exactly as a source store returned it.
///
/// Raw events are never mutated after ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawEvent {
    /// When the event was sensed.
    pub timestamp: NaiveDateTime,
    /// The employee the event belongs to.
    pub employee_id: String,
    /// The reader, terminal, tool or channel code.
    pub resource_code: String,
    /// The source the record came from.
    pub source: SourceKind,
}

/// A normalized event ready for classification.
///
/// # Example
///
/// ```
/// use workhour_engine::models::{EnrichedEvent, SourceKind};
/// use chrono::NaiveDateTime;
///
/// let event = EnrichedEvent {
///     timestamp: NaiveDateTime::parse_from_str("2025-06-02 08:00:00", "%Y-%m-%d %H:%M:%S").unwrap(),
///     employee_id: "E1001".to_string(),
///     tag_type: SourceKind::AccessControl,
///     tag_code: "G1".to_string(),
///     tag_name: "Work area gate".to_string(),
/// };
/// assert_eq!(event.tag_code, "G1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedEvent {
    /// When the event was sensed.
    pub timestamp: NaiveDateTime,
    /// The employee the event belongs to.
    pub employee_id: String,
    /// The source kind of the originating record.
    pub tag_type: SourceKind,
    /// The domain code selecting the classification rule.
    pub tag_code: String,
    /// Human-readable label for the tag.
    pub tag_name: String,
}
