//! HTTP request handlers for the work-hour engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use super::request::{BatchRequestBody, UnitRequestBody};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/units", post(unit_handler))
        .route("/batches", post(batch_handler))
        .with_state(state)
}

/// Handler for POST /units.
///
/// Runs the pipeline for a single (employee, date, shift) unit.
async fn unit_handler(
    State(state): State<AppState>,
    payload: Result<Json<UnitRequestBody>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing unit request");

    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let (shift, auto_detect) = request.shift_plan();
    let start_time = Instant::now();
    match state
        .engine()
        .process_unit(&request.employee_id, request.date, shift, auto_detect)
        .await
    {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                employee_id = %result.employee_id,
                date = %result.date,
                calibrated_hours = result.calibrated.calibrated_hours,
                duration_us = start_time.elapsed().as_micros(),
                "Unit completed successfully"
            );
            json_response(StatusCode::OK, &result)
        }
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Unit failed");
            error_response(err.into())
        }
    }
}

/// Handler for POST /batches.
///
/// Runs a batch to completion and returns the report. Unit failures are
/// listed in the report; only request-level problems produce an error status.
async fn batch_handler(
    State(state): State<AppState>,
    payload: Result<Json<BatchRequestBody>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing batch request");

    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match state
        .coordinator()
        .process_batch(request.into(), CancellationToken::new())
        .await
    {
        Ok(report) => {
            info!(
                correlation_id = %correlation_id,
                run_id = %report.run_id,
                processed = report.summary.processed,
                failed = report.summary.failed,
                "Batch completed"
            );
            json_response(StatusCode::OK, &report)
        }
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Batch rejected");
            error_response(err.into())
        }
    }
}

fn parse_body<T: DeserializeOwned>(
    correlation_id: Uuid,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, Response> {
    let rejection = match payload {
        Ok(Json(request)) => return Ok(request),
        Err(rejection) => rejection,
    };

    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(correlation_id = %correlation_id, error = %body_text, "JSON data error");
            if body_text.contains("missing field") {
                ApiError::new("VALIDATION_ERROR", body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "JSON syntax error");
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };

    Err(error_response(ApiErrorResponse::bad_request(error)))
}

fn json_response<T: serde::Serialize>(status: StatusCode, body: &T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(error: ApiErrorResponse) -> Response {
    json_response(error.status, &error.error)
}
