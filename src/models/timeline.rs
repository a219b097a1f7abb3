//! Classified timeline models.
//!
//! This module contains the [`TimelineEntry`] produced for every enriched
//! event, along with the [`ActivityState`] it was classified into and the
//! rationale recorded when the state had to be inferred.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::SourceKind;

/// The activity state of a timeline entry.
///
/// # Example
///
/// ```
/// use workhour_engine::models::{ActivityState, Judgment};
///
/// assert_eq!(ActivityState::Meeting.judgment(), Judgment::Work);
/// assert_eq!(ActivityState::Meal.judgment(), Judgment::NonWork);
/// assert_eq!(ActivityState::AccessOut.judgment(), Judgment::Transit);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityState {
    /// General work in a work area.
    Work,
    /// Work backed by equipment or tool use.
    FocusedWork,
    /// Meeting room presence or scheduled meetings.
    Meeting,
    /// Education and training.
    Training,
    /// Meal time.
    Meal,
    /// Rest areas.
    Rest,
    /// Personal or welfare time.
    NonWork,
    /// Moving between areas.
    Transit,
    /// Arriving at the site.
    AccessIn,
    /// Leaving the site.
    AccessOut,
}

impl ActivityState {
    /// All states, in declaration order.
    pub const ALL: [ActivityState; 10] = [
        ActivityState::Work,
        ActivityState::FocusedWork,
        ActivityState::Meeting,
        ActivityState::Training,
        ActivityState::Meal,
        ActivityState::Rest,
        ActivityState::NonWork,
        ActivityState::Transit,
        ActivityState::AccessIn,
        ActivityState::AccessOut,
    ];

    /// Returns the coarse judgment for this state.
    pub fn judgment(self) -> Judgment {
        match self {
            ActivityState::Work
            | ActivityState::FocusedWork
            | ActivityState::Meeting
            | ActivityState::Training => Judgment::Work,
            ActivityState::Meal | ActivityState::Rest | ActivityState::NonWork => {
                Judgment::NonWork
            }
            ActivityState::Transit | ActivityState::AccessIn | ActivityState::AccessOut => {
                Judgment::Transit
            }
        }
    }
}

impl std::fmt::Display for ActivityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ActivityState::Work => "work",
            ActivityState::FocusedWork => "focused_work",
            ActivityState::Meeting => "meeting",
            ActivityState::Training => "training",
            ActivityState::Meal => "meal",
            ActivityState::Rest => "rest",
            ActivityState::NonWork => "non_work",
            ActivityState::Transit => "transit",
            ActivityState::AccessIn => "access_in",
            ActivityState::AccessOut => "access_out",
        };
        write!(f, "{}", label)
    }
}

/// Coarse work / non-work / transit label derived from an [`ActivityState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Judgment {
    /// Counted towards working time.
    Work,
    /// Not working.
    NonWork,
    /// Arriving, leaving or moving around.
    Transit,
}

/// Why an ambiguous event received the state it did.
///
/// Entries classified straight from the tag table carry no assumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Assumption {
    /// Out-and-back excursion followed by a gate tag inside the return window.
    ResolvedByReturnPattern,
    /// The first ambiguous tag of the day.
    FirstAmbiguousOfDay,
    /// The last ambiguous tag of the day.
    LastAmbiguousOfDay,
    /// Resolved by the job group prior probability.
    JobGroupPrior,
}

impl Assumption {
    /// Returns true when the state came from the probabilistic fallback
    /// rather than a deterministic rule.
    pub fn is_probabilistic(self) -> bool {
        matches!(self, Assumption::JobGroupPrior)
    }
}

/// One classified event.
///
/// A timeline holds exactly one entry per enriched event, in the same order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// When the event was sensed.
    pub timestamp: NaiveDateTime,
    /// The source kind of the event.
    pub tag_type: SourceKind,
    /// The tag code of the event.
    pub tag_code: String,
    /// The tag display label.
    pub tag_name: String,
    /// Minutes until the next entry; see the timeline builder for the final entry.
    pub duration_minutes: f64,
    /// The classified state.
    pub state: ActivityState,
    /// Coarse label derived from `state`.
    pub judgment: Judgment,
    /// Confidence in `state`, within `[0, 1]`.
    pub confidence: f64,
    /// Rationale for inferred states.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assumption: Option<Assumption>,
}
