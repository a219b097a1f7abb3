//! Application state for the work-hour engine API.

use std::sync::Arc;

use crate::pipeline::{BatchCoordinator, Engine};

/// Shared application state.
///
/// Holds the unit engine and the batch coordinator shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    coordinator: Arc<BatchCoordinator>,
}

impl AppState {
    /// Creates application state around a coordinator.
    pub fn new(coordinator: Arc<BatchCoordinator>) -> Self {
        Self { coordinator }
    }

    /// Returns the unit engine.
    pub fn engine(&self) -> &Engine {
        self.coordinator.engine()
    }

    /// Returns the batch coordinator.
    pub fn coordinator(&self) -> &BatchCoordinator {
        &self.coordinator
    }
}
