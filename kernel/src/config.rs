// Store Configuration
//
// Where the tables live, which currency the ledger is kept in, and how
// often the machine jams. Loaded from JSON; every field has a default.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::failure::RandomFailure;
use crate::money::Currency;

/// Default storage directory, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = "v1_database";

/// Default probability that a dispense jams.
pub const DEFAULT_FAILURE_RATE: f64 = 0.05;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config {path}: {message}")]
    Io { path: String, message: String },

    #[error("could not parse config {path}: {message}")]
    Parse { path: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Directory holding the catalog and ledger records.
    pub data_dir: PathBuf,

    /// Ledger currency for this store instance.
    pub currency: Currency,

    /// Probability in `[0, 1]` that a dispense fails.
    pub failure_rate: f64,

    /// Fixed RNG seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            currency: Currency::jpy(),
            failure_rate: DEFAULT_FAILURE_RATE,
            seed: None,
        }
    }
}

impl StoreConfig {
    pub fn from_json_str(data: &str, origin: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(data).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&data, &path.display().to_string())
    }

    /// Failure source described by this configuration.
    pub fn failure_source(&self) -> RandomFailure {
        match self.seed {
            Some(seed) => RandomFailure::seeded(seed, self.failure_rate),
            None => RandomFailure::from_entropy(self.failure_rate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let config = StoreConfig::from_json_str("{}", "inline").unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.data_dir, PathBuf::from("v1_database"));
        assert_eq!(config.currency.code(), "JPY");
    }

    #[test]
    fn fields_override_defaults() {
        let config = StoreConfig::from_json_str(
            r#"{ "data_dir": "/tmp/vendor", "currency": "usd", "failure_rate": 0.5, "seed": 9 }"#,
            "inline",
        )
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/vendor"));
        assert_eq!(config.currency.code(), "USD");
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.failure_source().rate(), 0.5);
    }

    #[test]
    fn bad_config_is_reported() {
        let err = StoreConfig::from_json_str(r#"{ "currency": "yen!" }"#, "inline").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));

        let err = StoreConfig::from_json_str(r#"{ "colour": "red" }"#, "inline").unwrap_err();
        assert!(err.to_string().contains("inline"));

        let err = StoreConfig::from_json_path("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
