//! Response types for the work-hour engine API.
//!
//! This module defines the error body and the mapping from engine errors to
//! HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 400 response for an unparseable body.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let status = match &error {
            EngineError::EmployeeNotFound { .. } => StatusCode::NOT_FOUND,
            EngineError::DataUnavailable { .. } | EngineError::ConfigurationError { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            EngineError::InvalidRequest { .. } | EngineError::MalformedRecord { .. } => {
                StatusCode::BAD_REQUEST
            }
            EngineError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            EngineError::Cancelled => StatusCode::CONFLICT,
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::ConfigInvalid { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let api_error = match &error {
            EngineError::DataUnavailable { .. } => ApiError::with_details(
                error.code(),
                error.to_string(),
                "No source holds records for the requested window",
            ),
            _ => ApiError::new(error.code(), error.to_string()),
        };

        ApiErrorResponse {
            status,
            error: api_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"message\":\"Test message\""));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_employee_not_found_is_404() {
        let response: ApiErrorResponse = EngineError::EmployeeNotFound {
            employee_id: "E9".to_string(),
        }
        .into();
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.error.code, "EMPLOYEE_NOT_FOUND");
    }

    #[test]
    fn test_data_unavailable_is_422() {
        let response: ApiErrorResponse = EngineError::DataUnavailable {
            employee_id: "E1".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            shift: "day".to_string(),
        }
        .into();
        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(response.error.details.is_some());
    }

    #[test]
    fn test_invalid_request_is_400() {
        let response: ApiErrorResponse = EngineError::InvalidRequest {
            message: "bad range".to_string(),
        }
        .into();
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error.code, "INVALID_REQUEST");
    }
}
