//! HTTP API module for the work-hour engine.
//!
//! Exposes unit and batch processing as JSON endpoints.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{BatchRequestBody, UnitRequestBody};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
