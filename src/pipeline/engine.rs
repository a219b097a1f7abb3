//! Single-unit processing.
//!
//! An [`Engine`] runs the full pipeline for one (employee, date, shift)
//! unit: enrichment, job group classification, timeline construction,
//! aggregation, claim comparison and calibration.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::calculation::{
    EnrichmentOutcome, build_timeline, calculate_metrics, calibrate, classify_job_group,
    compare_with_claim, degrade_reliability, detect_shift_type, enrich,
};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    CalibratedHours, ComparisonResult, DailyWorkRecord, EnrichedEvent, JobGroup, ShiftType,
    SourceKind, TimelineEntry, WorkMetrics,
};
use crate::store::{ClaimStore, EmployeeDirectory, RawEventSource};

/// Everything produced for one unit of work.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitResult {
    /// The employee processed.
    pub employee_id: String,
    /// The date processed.
    pub date: NaiveDate,
    /// The shift window the events were taken from.
    pub shift: ShiftType,
    /// The employee's job group.
    pub job_group: JobGroup,
    /// The merged event sequence.
    pub events: Vec<EnrichedEvent>,
    /// One classified entry per event.
    pub timeline: Vec<TimelineEntry>,
    /// The day's aggregate.
    pub metrics: WorkMetrics,
    /// Ground-rules adjusted hours.
    pub calibrated: CalibratedHours,
    /// Comparison with the filed claim, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ComparisonResult>,
    /// Sources that could not be queried.
    pub unavailable_sources: Vec<SourceKind>,
    /// Records skipped as malformed.
    pub malformed_records: usize,
}

impl UnitResult {
    /// Builds the persisted row for this unit.
    pub fn to_record(&self, run_id: Option<Uuid>) -> DailyWorkRecord {
        DailyWorkRecord {
            shift: self.shift,
            job_group: self.job_group,
            metrics: self.metrics.clone(),
            calibrated: self.calibrated,
            computed_at: Utc::now(),
            run_id,
        }
    }
}

/// Runs the pipeline for single units.
///
/// Holds the immutable configuration and the collaborator ports. Cheap to
/// share behind an `Arc` across workers.
pub struct Engine {
    config: Arc<EngineConfig>,
    sources: Vec<Arc<dyn RawEventSource>>,
    directory: Arc<dyn EmployeeDirectory>,
    claims: Arc<dyn ClaimStore>,
}

impl Engine {
    /// Creates an engine over the given configuration and collaborators.
    pub fn new(
        config: Arc<EngineConfig>,
        sources: Vec<Arc<dyn RawEventSource>>,
        directory: Arc<dyn EmployeeDirectory>,
        claims: Arc<dyn ClaimStore>,
    ) -> Self {
        Self {
            config,
            sources,
            directory,
            claims,
        }
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Processes one (employee, date, shift) unit.
    ///
    /// With `auto_detect_shift`, the unit is enriched a second time with the
    /// detected shift window when the events look like the other shift, or
    /// with the opposite window when the requested one holds no data. Only
    /// one retry is made and the first result is kept if the retry finds no
    /// data.
    ///
    /// # Errors
    ///
    /// - [`EngineError::EmployeeNotFound`] when the directory has no record
    /// - [`EngineError::DataUnavailable`] when no source has data
    /// - [`EngineError::ConfigurationError`] when the event sequence is unusable
    /// - [`EngineError::Store`] when the directory fails
    #[instrument(skip(self))]
    pub async fn process_unit(
        &self,
        employee_id: &str,
        date: NaiveDate,
        shift: ShiftType,
        auto_detect_shift: bool,
    ) -> EngineResult<UnitResult> {
        let employee = self
            .directory
            .employee(employee_id)
            .await?
            .ok_or_else(|| EngineError::EmployeeNotFound {
                employee_id: employee_id.to_string(),
            })?;
        let job_group = classify_job_group(&employee, &self.config);

        let outcome = self
            .enrich_with_retry(employee_id, date, shift, auto_detect_shift)
            .await?;

        let timeline = build_timeline(&outcome.events, job_group, &outcome.window, &self.config)?;

        let mut metrics = calculate_metrics(employee_id, date, &timeline, &self.config);
        metrics.reliability_score = degrade_reliability(
            metrics.reliability_score,
            outcome.unavailable_sources.len(),
            self.config.settings().metrics.missing_source_penalty,
        );

        let calibrated = calibrate(
            metrics.estimated_work_hours(),
            metrics.reliability_score,
            &self.config.settings().calibration,
        );

        let claim = match self.claims.claimed_hours(employee_id, date).await {
            Ok(claim) => claim,
            Err(err) => {
                warn!(error = %err, "Claim lookup failed, skipping comparison");
                None
            }
        };
        let comparison = compare_with_claim(
            &metrics,
            claim.as_ref(),
            self.config.settings().metrics.claim_tolerance_hours,
        );

        info!(
            shift = %outcome.window.shift,
            %job_group,
            events = outcome.events.len(),
            estimated_work_minutes = metrics.estimated_work_time_minutes,
            reliability = metrics.reliability_score,
            calibrated_hours = calibrated.calibrated_hours,
            "Processed unit"
        );

        Ok(UnitResult {
            employee_id: employee_id.to_string(),
            date,
            shift: outcome.window.shift,
            job_group,
            events: outcome.events,
            timeline,
            metrics,
            calibrated,
            comparison,
            unavailable_sources: outcome.unavailable_sources,
            malformed_records: outcome.malformed_records,
        })
    }

    async fn enrich_with_retry(
        &self,
        employee_id: &str,
        date: NaiveDate,
        shift: ShiftType,
        auto_detect_shift: bool,
    ) -> EngineResult<EnrichmentOutcome> {
        let first = enrich(employee_id, date, shift, &self.sources, &self.config).await;
        if !auto_detect_shift {
            return first;
        }

        let retry_shift = match &first {
            Ok(outcome) => {
                let detected = detect_shift_type(&outcome.events, &self.config.settings().shift);
                (detected != shift).then_some(detected)
            }
            Err(EngineError::DataUnavailable { .. }) => Some(shift.opposite()),
            Err(_) => None,
        };
        let Some(retry_shift) = retry_shift else {
            return first;
        };

        info!(from = %shift, to = %retry_shift, "Retrying enrichment with other shift window");
        match enrich(employee_id, date, retry_shift, &self.sources, &self.config).await {
            Ok(outcome) => Ok(outcome),
            Err(EngineError::DataUnavailable { .. }) => first,
            Err(err) => Err(err),
        }
    }
}
