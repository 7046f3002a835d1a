//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the ledger
//! policy from a YAML file.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::LedgerConfig;

/// Name of the policy file inside a configuration directory.
pub const CONFIG_FILE_NAME: &str = "ledger.yaml";

/// Loads and provides access to ledger configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// └── ledger.yaml   # Attendance, settlement and promotion policy
/// ```
///
/// # Example
///
/// ```no_run
/// use site_ledger::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// println!("Ledger: {}", loader.config().ledger.name);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: LedgerConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - `ledger.yaml` is missing
    /// - The file contains invalid YAML or is missing a required field
    /// - A setting is out of range, such as an entry window above
    ///   [`MAX_WINDOW_DAYS`](super::types::MAX_WINDOW_DAYS)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let config = Self::load_yaml::<LedgerConfig>(&path.as_ref().join(CONFIG_FILE_NAME))?;
        config.validate()?;
        Ok(Self { config })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: LedgerConfig) -> Self {
        Self { config }
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

    /// Returns the loaded configuration.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Consumes the loader and returns the configuration.
    pub fn into_config(self) -> LedgerConfig {
        self.config
    }
}
