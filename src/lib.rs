//! Work-hour inference engine.
//!
//! This crate estimates actual working time from multi-source activity
//! records (access-control tags, equipment logins, collaboration activity
//! and meal transactions). Events are merged into one timeline, classified
//! into activity states, aggregated into daily metrics and calibrated
//! against their reliability.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod store;
