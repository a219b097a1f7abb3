//! Configuration loading and management for the Work-Hour Inference Engine.
//!
//! This module loads the classification tables, job group priors, source
//! mappings and thresholds from YAML files. Everything is read once and
//! shared immutably by every worker.
//!
//! # Example
//!
//! ```no_run
//! use workhour_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap().into_config();
//! println!("Return window: {} min", config.settings().classification.return_pattern_window_minutes);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    CalibrationSettings, ClassificationSettings, EngineConfig, EngineSettings, JobGroupRule,
    JobGroupsConfig, MetricBucket, MetricSettings, OrgField, ShiftSettings, SourceMapping,
    SourceQuerySettings, SourcesConfig, TagAssignment, TagMapping, TagRule, TagRulesConfig,
};
