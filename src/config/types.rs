//! Configuration types for work-hour inference.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files, and the aggregated
//! [`EngineConfig`] shared by every stage of the pipeline.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{EngineError, EngineResult};
use crate::models::{ActivityState, JobGroup, SourceKind};

/// Shift window and night-shift detection hours from `engine.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ShiftSettings {
    /// Hour of the date at which the day window opens; it lasts 24 hours.
    pub day_start_hour: u32,
    /// Hour of the date at which the night window opens.
    pub night_start_hour: u32,
    /// Hour of the following date at which the night window closes.
    pub night_end_hour: u32,
    /// Events at or after this hour count as night-side.
    pub night_boundary_hour: u32,
    /// Events before this hour count as night-side.
    pub morning_boundary_hour: u32,
}

/// Classifier thresholds from `engine.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassificationSettings {
    /// Maximum gap between the second ambiguous event and the gate tag.
    pub return_pattern_window_minutes: i64,
    /// Prior at or above which an ambiguous tag is judged as work.
    pub work_judgment_threshold: f64,
    /// Time of day the final entry of a timeline is clipped to.
    /// When absent the final entry lasts zero minutes.
    #[serde(default)]
    pub day_end_cutoff: Option<NaiveTime>,
}

/// Aggregation buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricBucket {
    /// General work.
    Work,
    /// Focused work.
    Focus,
    /// Meetings.
    Meeting,
    /// Meals.
    Meal,
    /// Transit, arrival and departure.
    Transit,
    /// Rest and personal time.
    Rest,
}

/// Aggregation settings from `engine.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricSettings {
    /// Bucket membership of every activity state.
    pub buckets: BTreeMap<MetricBucket, Vec<ActivityState>>,
    /// Buckets summed into estimated work time.
    pub estimated_work: Vec<MetricBucket>,
    /// Reliability fraction removed per unavailable source.
    pub missing_source_penalty: f64,
    /// Maximum estimate/claim difference still considered a match.
    pub claim_tolerance_hours: Decimal,
}

/// Source query settings from `engine.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceQuerySettings {
    /// Timeout applied to every per-source query.
    pub query_timeout_ms: u64,
}

/// Ground-rules calibration constants from `engine.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct CalibrationSettings {
    /// Smallest adjustment factor, reached for unreliable days.
    pub lower_bound: f64,
    /// Steepness of the logistic curve.
    pub steepness: f64,
    /// Reliability fraction at the curve's midpoint.
    pub midpoint: f64,
}

/// The contents of `engine.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    /// Shift windows.
    pub shift: ShiftSettings,
    /// Classifier thresholds.
    pub classification: ClassificationSettings,
    /// Aggregation settings.
    pub metrics: MetricSettings,
    /// Source query settings.
    pub sources: SourceQuerySettings,
    /// Calibration constants.
    pub calibration: CalibrationSettings,
}

/// The state an unambiguous tag code maps to.
#[derive(Debug, Clone, Deserialize)]
pub struct TagRule {
    /// Display name of the tag.
    pub name: String,
    /// The activity state.
    pub state: ActivityState,
    /// Confidence of the mapping.
    pub confidence: f64,
}

/// The contents of `tag_rules.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct TagRulesConfig {
    /// Unambiguous tag code table.
    pub tags: HashMap<String, TagRule>,
    /// Codes that do not by themselves indicate work or non-work.
    pub ambiguous: Vec<String>,
    /// Codes tied to a specific work area.
    pub gates: Vec<String>,
}

/// The organizational attribute a job group rule inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrgField {
    /// The department name.
    Department,
    /// The team name.
    Team,
    /// The position or title.
    Position,
    /// The HR job family code.
    JobFamily,
    /// Any segment of the organization path.
    OrgPath,
}

/// One job group matching rule.
#[derive(Debug, Clone, Deserialize)]
pub struct JobGroupRule {
    /// The group assigned on match.
    pub group: JobGroup,
    /// The attribute inspected.
    pub field: OrgField,
    /// Case-insensitive substrings, any of which matches.
    pub contains: Vec<String>,
}

/// The contents of `job_groups.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct JobGroupsConfig {
    /// Prior probability per group that an ambiguous tag is work.
    pub priors: HashMap<JobGroup, f64>,
    /// Rules evaluated in order; the first match wins.
    pub rules: Vec<JobGroupRule>,
}

/// A tag assigned to records of one source.
#[derive(Debug, Clone, Deserialize)]
pub struct TagAssignment {
    /// Tag code.
    pub code: String,
    /// Tag display name.
    pub name: String,
}

/// Resource-code prefix mapping.
#[derive(Debug, Clone, Deserialize)]
pub struct TagMapping {
    /// Resource-code prefix.
    pub prefix: String,
    /// Tag assigned on match.
    #[serde(flatten)]
    pub tag: TagAssignment,
}

/// Field mapping for one source kind.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceMapping {
    /// Tie-break priority for equal timestamps; lower sorts first.
    pub priority: u32,
    /// Tag used when no prefix matches.
    pub default_tag: TagAssignment,
    /// Prefix mappings, evaluated in order.
    #[serde(default)]
    pub mappings: Vec<TagMapping>,
}

impl SourceMapping {
    /// Returns the tag for a resource code.
    pub fn tag_for(&self, resource_code: &str) -> &TagAssignment {
        self.mappings
            .iter()
            .find(|m| resource_code.starts_with(&m.prefix))
            .map(|m| &m.tag)
            .unwrap_or(&self.default_tag)
    }
}

/// The contents of `sources.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    /// Mapping per source kind.
    pub sources: HashMap<SourceKind, SourceMapping>,
}

/// The complete engine configuration loaded from YAML files.
///
/// Immutable once built; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    settings: EngineSettings,
    tag_rules: TagRulesConfig,
    job_groups: JobGroupsConfig,
    sources: SourcesConfig,
    bucket_index: HashMap<ActivityState, MetricBucket>,
}

impl EngineConfig {
    /// Creates a validated configuration from its component parts.
    pub fn new(
        settings: EngineSettings,
        tag_rules: TagRulesConfig,
        job_groups: JobGroupsConfig,
        sources: SourcesConfig,
    ) -> EngineResult<Self> {
        let mut bucket_index = HashMap::new();
        for (bucket, states) in &settings.metrics.buckets {
            for state in states {
                if bucket_index.insert(*state, *bucket).is_some() {
                    return Err(invalid(
                        "metrics.buckets",
                        format!("state '{}' belongs to more than one bucket", state),
                    ));
                }
            }
        }

        let config = Self {
            settings,
            tag_rules,
            job_groups,
            sources,
            bucket_index,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> EngineResult<()> {
        for state in ActivityState::ALL {
            if !self.bucket_index.contains_key(&state) {
                return Err(invalid(
                    "metrics.buckets",
                    format!("state '{}' is not assigned to a bucket", state),
                ));
            }
        }

        let metrics = &self.settings.metrics;
        check_unit_interval("metrics.missing_source_penalty", metrics.missing_source_penalty)?;
        if metrics.claim_tolerance_hours < Decimal::ZERO {
            return Err(invalid("metrics.claim_tolerance_hours", "must not be negative"));
        }

        let classification = &self.settings.classification;
        check_unit_interval(
            "classification.work_judgment_threshold",
            classification.work_judgment_threshold,
        )?;
        if classification.return_pattern_window_minutes < 0 {
            return Err(invalid(
                "classification.return_pattern_window_minutes",
                "must not be negative",
            ));
        }

        let calibration = &self.settings.calibration;
        check_unit_interval("calibration.lower_bound", calibration.lower_bound)?;
        check_unit_interval("calibration.midpoint", calibration.midpoint)?;
        if calibration.steepness <= 0.0 || !calibration.steepness.is_finite() {
            return Err(invalid("calibration.steepness", "must be a positive number"));
        }

        let shift = &self.settings.shift;
        for (field, hour) in [
            ("shift.day_start_hour", shift.day_start_hour),
            ("shift.night_start_hour", shift.night_start_hour),
            ("shift.night_end_hour", shift.night_end_hour),
            ("shift.night_boundary_hour", shift.night_boundary_hour),
            ("shift.morning_boundary_hour", shift.morning_boundary_hour),
        ] {
            if hour > 23 {
                return Err(invalid(field, "must be an hour between 0 and 23"));
            }
        }

        for (code, rule) in &self.tag_rules.tags {
            check_unit_interval(&format!("tags.{}.confidence", code), rule.confidence)?;
            if self.tag_rules.ambiguous.contains(code) {
                return Err(invalid(
                    "ambiguous",
                    format!("tag '{}' is both mapped and ambiguous", code),
                ));
            }
        }

        for group in JobGroup::ALL {
            match self.job_groups.priors.get(&group) {
                Some(prior) => check_unit_interval(&format!("priors.{}", group), *prior)?,
                None => {
                    return Err(invalid(
                        "priors",
                        format!("no prior configured for job group '{}'", group),
                    ));
                }
            }
        }

        let mut priorities: Vec<u32> = self.sources.sources.values().map(|s| s.priority).collect();
        priorities.sort_unstable();
        priorities.dedup();
        if priorities.len() != self.sources.sources.len() {
            return Err(invalid("sources", "source priorities must be unique"));
        }

        Ok(())
    }

    /// Returns the `engine.yaml` settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Returns the tag rule for an unambiguous code.
    pub fn tag_rule(&self, code: &str) -> Option<&TagRule> {
        self.tag_rules.tags.get(code)
    }

    /// Returns true when a code needs contextual resolution.
    ///
    /// Codes missing from the tag table are treated as ambiguous.
    pub fn is_ambiguous(&self, code: &str) -> bool {
        self.tag_rules.ambiguous.iter().any(|c| c == code) || !self.tag_rules.tags.contains_key(code)
    }

    /// Returns true when a code is a work-area gate tag.
    pub fn is_gate(&self, code: &str) -> bool {
        self.tag_rules.gates.iter().any(|c| c == code)
    }

    /// Returns the job group rules.
    pub fn job_group_rules(&self) -> &[JobGroupRule] {
        &self.job_groups.rules
    }

    /// Returns the configured prior for a job group.
    pub fn prior(&self, group: JobGroup) -> f64 {
        // every group is checked at construction
        self.job_groups.priors.get(&group).copied().unwrap_or_default()
    }

    /// Returns the bucket a state is aggregated into.
    pub fn bucket_for(&self, state: ActivityState) -> Option<MetricBucket> {
        self.bucket_index.get(&state).copied()
    }

    /// Returns the mapping for a source kind, if the source is configured.
    pub fn source_mapping(&self, kind: SourceKind) -> Option<&SourceMapping> {
        self.sources.sources.get(&kind)
    }

    /// Returns the tie-break priority of a source kind.
    ///
    /// Unconfigured kinds sort after every configured one.
    pub fn source_priority(&self, kind: SourceKind) -> u32 {
        self.source_mapping(kind)
            .map(|m| m.priority)
            .unwrap_or(u32::MAX)
    }
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> EngineError {
    EngineError::ConfigInvalid {
        field: field.into(),
        message: message.into(),
    }
}

fn check_unit_interval(field: &str, value: f64) -> EngineResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, format!("{} is outside [0, 1]", value)))
    }
}
