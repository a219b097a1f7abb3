//! Error types for the Work-Hour Inference Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure a unit of work can hit, plus the narrower [`StoreError`]
//! returned by collaborator stores.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised by collaborator stores (event sources, directories, sinks).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store could not be reached or refused the request.
    #[error("Store unavailable: {message}")]
    Unavailable {
        /// A description of the failure.
        message: String,
    },

    /// The store did not answer within the allotted time.
    #[error("Store query timed out after {millis}ms")]
    Timeout {
        /// The timeout that elapsed, in milliseconds.
        millis: u64,
    },

    /// A write was rejected because of a conflicting concurrent write.
    #[error("Store write conflict: {message}")]
    Conflict {
        /// A description of the conflict.
        message: String,
    },
}

/// The main error type for the Work-Hour Inference Engine.
///
/// # Example
///
/// ```
/// use workhour_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/engine.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/engine.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but holds values outside their allowed range.
    #[error("Invalid configuration value '{field}': {message}")]
    ConfigInvalid {
        /// The offending field.
        field: String,
        /// Why the value was rejected.
        message: String,
    },

    /// No source had any record for the unit's window.
    #[error("No activity data for employee '{employee_id}' on {date} ({shift} shift)")]
    DataUnavailable {
        /// The employee of the unit.
        employee_id: String,
        /// The date of the unit.
        date: NaiveDate,
        /// The shift window that was searched.
        shift: String,
    },

    /// A single raw record could not be mapped.
    #[error("Malformed {source_kind} record: {message}")]
    MalformedRecord {
        /// The source kind the record came from.
        source_kind: String,
        /// What was wrong with the record.
        message: String,
    },

    /// The classifier was handed a sequence it cannot work with.
    #[error("Invalid event sequence: {message}")]
    ConfigurationError {
        /// A description of the defect.
        message: String,
    },

    /// The employee directory has no record for the requested id.
    #[error("Employee not found: {employee_id}")]
    EmployeeNotFound {
        /// The id that was looked up.
        employee_id: String,
    },

    /// A request was rejected before processing.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Why the request was rejected.
        message: String,
    },

    /// A collaborator store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The unit was abandoned because its run was cancelled.
    #[error("Processing cancelled")]
    Cancelled,
}

impl EngineError {
    /// Short machine-readable code used in batch error lists and API bodies.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::ConfigInvalid { .. } => "CONFIG_ERROR",
            EngineError::DataUnavailable { .. } => "DATA_UNAVAILABLE",
            EngineError::MalformedRecord { .. } => "MALFORMED_RECORD",
            EngineError::ConfigurationError { .. } => "INVALID_SEQUENCE",
            EngineError::EmployeeNotFound { .. } => "EMPLOYEE_NOT_FOUND",
            EngineError::InvalidRequest { .. } => "INVALID_REQUEST",
            EngineError::Store(_) => "STORE_ERROR",
            EngineError::Cancelled => "CANCELLED",
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
