//! Event enrichment: merging per-source raw records into one ordered sequence.
//!
//! Every configured source is queried for the unit's shift window under a
//! bounded timeout. Records are mapped to tag codes through the per-source
//! mapping table and merge-sorted by timestamp, with equal timestamps ordered
//! by source priority and then by store order.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use futures::future::join_all;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult, StoreError};
use crate::models::{EnrichedEvent, RawEvent, ShiftType, ShiftWindow, SourceKind};
use crate::store::RawEventSource;

use super::shift_detection::shift_window;

/// Raw records returned by one source.
#[derive(Debug, Clone)]
pub struct SourceBatch {
    /// The source kind that produced the records.
    pub kind: SourceKind,
    /// The records, in store order.
    pub records: Vec<RawEvent>,
}

/// The result of enriching one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentOutcome {
    /// The window that was searched.
    pub window: ShiftWindow,
    /// The merged, ordered events.
    pub events: Vec<EnrichedEvent>,
    /// Sources that failed or timed out.
    pub unavailable_sources: Vec<SourceKind>,
    /// Records skipped as malformed.
    pub malformed_records: usize,
}

/// Pulls every source for the unit and merges the records.
///
/// Individual source failures and timeouts are recorded in
/// [`EnrichmentOutcome::unavailable_sources`]. The call fails with
/// [`EngineError::DataUnavailable`] only when no usable record exists in the
/// window.
pub async fn enrich(
    employee_id: &str,
    date: NaiveDate,
    shift: ShiftType,
    sources: &[Arc<dyn RawEventSource>],
    config: &EngineConfig,
) -> EngineResult<EnrichmentOutcome> {
    let window = shift_window(date, shift, &config.settings().shift);
    let timeout = Duration::from_millis(config.settings().sources.query_timeout_ms);

    let fetches = sources.iter().map(|source| async move {
        let kind = source.kind();
        let result = tokio::time::timeout(timeout, source.fetch(employee_id, &window)).await;
        (kind, result)
    });

    let mut batches = Vec::with_capacity(sources.len());
    let mut unavailable_sources = Vec::new();

    for (kind, result) in join_all(fetches).await {
        match result {
            Ok(Ok(records)) => batches.push(SourceBatch { kind, records }),
            Ok(Err(err)) => {
                warn!(
                    employee_id,
                    %date,
                    source = %kind,
                    error = %err,
                    "Source unavailable, continuing with remaining sources"
                );
                unavailable_sources.push(kind);
            }
            Err(_) => {
                let err = StoreError::Timeout {
                    millis: timeout.as_millis() as u64,
                };
                warn!(
                    employee_id,
                    %date,
                    source = %kind,
                    error = %err,
                    "Source query timed out, continuing with remaining sources"
                );
                unavailable_sources.push(kind);
            }
        }
    }

    let (events, malformed_records) = merge_records(employee_id, &window, batches, config);

    if events.is_empty() {
        return Err(EngineError::DataUnavailable {
            employee_id: employee_id.to_string(),
            date,
            shift: shift.to_string(),
        });
    }

    debug!(
        employee_id,
        %date,
        %shift,
        events = events.len(),
        unavailable = unavailable_sources.len(),
        malformed = malformed_records,
        "Enriched unit events"
    );

    Ok(EnrichmentOutcome {
        window,
        events,
        unavailable_sources,
        malformed_records,
    })
}

/// Maps and merges source batches into one ordered event sequence.
///
/// Returns the events and the number of malformed records skipped. Records
/// outside the window and byte-identical repeats from the same source are
/// dropped silently; duplicates across sources are kept.
pub fn merge_records(
    employee_id: &str,
    window: &ShiftWindow,
    batches: Vec<SourceBatch>,
    config: &EngineConfig,
) -> (Vec<EnrichedEvent>, usize) {
    let mut keyed: Vec<(u32, EnrichedEvent)> = Vec::new();
    let mut malformed = 0;

    for batch in &batches {
        let priority = config.source_priority(batch.kind);
        let mut seen: HashSet<&RawEvent> = HashSet::new();

        for record in &batch.records {
            if !window.contains(record.timestamp) {
                continue;
            }
            if !seen.insert(record) {
                debug!(employee_id, source = %batch.kind, "Dropped repeated record");
                continue;
            }

            match map_record(employee_id, batch.kind, record, config) {
                Ok(event) => keyed.push((priority, event)),
                Err(err) => {
                    warn!(employee_id, error = %err, "Skipping malformed record");
                    malformed += 1;
                }
            }
        }
    }

    // stable: equal (timestamp, priority) keeps batch then store order
    keyed.sort_by(|(pa, a), (pb, b)| a.timestamp.cmp(&b.timestamp).then(pa.cmp(pb)));

    (keyed.into_iter().map(|(_, e)| e).collect(), malformed)
}

fn map_record(
    employee_id: &str,
    kind: SourceKind,
    record: &RawEvent,
    config: &EngineConfig,
) -> EngineResult<EnrichedEvent> {
    let malformed = |message: String| EngineError::MalformedRecord {
        source_kind: kind.to_string(),
        message,
    };

    if record.source != kind {
        return Err(malformed(format!(
            "record tagged as {} returned by {} source",
            record.source, kind
        )));
    }
    if record.employee_id != employee_id {
        return Err(malformed(format!(
            "record belongs to '{}', expected '{}'",
            record.employee_id, employee_id
        )));
    }

    let resource_code = record.resource_code.trim();
    let needs_code = matches!(kind, SourceKind::AccessControl | SourceKind::Meal);
    if needs_code && resource_code.is_empty() {
        return Err(malformed("blank resource code".to_string()));
    }

    let mapping = config
        .source_mapping(kind)
        .ok_or_else(|| malformed("no mapping configured for source".to_string()))?;
    let tag = mapping.tag_for(resource_code);

    Ok(EnrichedEvent {
        timestamp: record.timestamp,
        employee_id: record.employee_id.clone(),
        tag_type: kind,
        tag_code: tag.code.clone(),
        tag_name: tag.name.clone(),
    })
}
