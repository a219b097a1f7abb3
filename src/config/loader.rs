//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! configurations from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{EngineConfig, EngineSettings, JobGroupsConfig, SourcesConfig, TagRulesConfig};

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── engine.yaml      # Shift windows, thresholds, buckets, calibration
/// ├── tag_rules.yaml   # Tag code table, ambiguous and gate codes
/// ├── job_groups.yaml  # Job group priors and matching rules
/// └── sources.yaml     # Per-source priority and field mapping
/// ```
///
/// # Example
///
/// ```no_run
/// use workhour_engine::config::ConfigLoader;
/// use workhour_engine::models::JobGroup;
///
/// let loader = ConfigLoader::load("./config/default")?;
/// println!("Office prior: {}", loader.config().prior(JobGroup::Office));
/// # Ok::<(), workhour_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if any file is missing, contains invalid YAML, or
    /// holds values that fail validation.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let settings = Self::load_yaml::<EngineSettings>(&path.join("engine.yaml"))?;
        let tag_rules = Self::load_yaml::<TagRulesConfig>(&path.join("tag_rules.yaml"))?;
        let job_groups = Self::load_yaml::<JobGroupsConfig>(&path.join("job_groups.yaml"))?;
        let sources = Self::load_yaml::<SourcesConfig>(&path.join("sources.yaml"))?;

        let config = EngineConfig::new(settings, tag_rules, job_groups, sources)?;

        tracing::debug!(path = %path.display(), "Engine configuration loaded");
        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the underlying engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> EngineConfig {
        self.config
    }
}
