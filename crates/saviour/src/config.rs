//! Configuration management for saviour.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::collections::HashSet;
use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "saviour";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "storage.db";

/// Upper bound accepted for `registry.demo_target`.
const MAX_DEMO_TARGET: usize = 100_000;

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `SAVIOUR_`, sections split on `__`)
/// 2. TOML config file at `~/.config/saviour/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Registry configuration.
    pub registry: RegistryConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/saviour/storage.db`
    pub database_path: Option<PathBuf>,
    /// Key holding the donor registry.
    pub donors_key: String,
    /// Key holding the signed-up user profile.
    pub user_key: String,
    /// Key holding the logged-in session profile.
    pub session_key: String,
    /// Key holding saved search criteria.
    pub filters_key: String,
    /// Key holding pending donation requests.
    pub requests_key: String,
}

/// Where synthetic donors go relative to stored ones when seeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedPlacement {
    /// Synthetic records are placed ahead of stored records.
    #[default]
    Prepend,
    /// Synthetic records are placed after stored records.
    Append,
}

/// Registry-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Minimum number of donors shown; shortfall is filled with demo data.
    pub demo_target: usize,
    /// Placement of demo donors relative to stored donors.
    pub seed_placement: SeedPlacement,
    /// Fixed seed for the demo generator. Random when unset.
    pub demo_seed: Option<u64>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None, // Will be resolved to default at runtime
            donors_key: "saviour_donors".to_string(),
            user_key: "saviour_user".to_string(),
            session_key: "saviour_logged".to_string(),
            filters_key: "saviour_filters".to_string(),
            requests_key: "saviour_requests".to_string(),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            demo_target: 100,
            seed_placement: SeedPlacement::Prepend,
            demo_seed: None,
        }
    }
}

impl StorageConfig {
    fn keys(&self) -> [(&'static str, &str); 5] {
        [
            ("donors_key", &self.donors_key),
            ("user_key", &self.user_key),
            ("session_key", &self.session_key),
            ("filters_key", &self.filters_key),
            ("requests_key", &self.requests_key),
        ]
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("SAVIOUR_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for (name, key) in self.storage.keys() {
            if key.trim().is_empty() {
                return Err(Error::ConfigValidation {
                    message: format!("storage.{name} must not be empty"),
                });
            }
            if !seen.insert(key) {
                return Err(Error::ConfigValidation {
                    message: format!("storage.{name} duplicates another storage key: {key}"),
                });
            }
        }

        if self.registry.demo_target > MAX_DEMO_TARGET {
            return Err(Error::ConfigValidation {
                message: format!(
                    "demo_target ({}) cannot be greater than {MAX_DEMO_TARGET}",
                    self.registry.demo_target
                ),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_storage_config() {
        let storage = StorageConfig::default();

        assert!(storage.database_path.is_none());
        assert_eq!(storage.donors_key, "saviour_donors");
        assert_eq!(storage.user_key, "saviour_user");
        assert_eq!(storage.session_key, "saviour_logged");
        assert_eq!(storage.filters_key, "saviour_filters");
        assert_eq!(storage.requests_key, "saviour_requests");
    }

    #[test]
    fn test_default_registry_config() {
        let registry = RegistryConfig::default();

        assert_eq!(registry.demo_target, 100);
        assert_eq!(registry.seed_placement, SeedPlacement::Prepend);
        assert!(registry.demo_seed.is_none());
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_key() {
        let mut config = Config::default();
        config.storage.user_key = "  ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("user_key"));
    }

    #[test]
    fn test_validate_duplicate_key() {
        let mut config = Config::default();
        config.storage.session_key = config.storage.user_key.clone();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("session_key"));
        assert!(err.contains("duplicates"));
    }

    #[test]
    fn test_validate_demo_target_too_large() {
        let mut config = Config::default();
        config.registry.demo_target = MAX_DEMO_TARGET + 1;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("demo_target"));
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        assert!(config
            .database_path()
            .to_string_lossy()
            .contains("storage.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("saviour"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let path = std::env::temp_dir().join(format!("saviour_config_{}.toml", std::process::id()));
        std::fs::write(
            &path,
            "[registry]\ndemo_target = 12\nseed_placement = \"append\"\ndemo_seed = 7\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path.clone())).unwrap();
        assert_eq!(config.registry.demo_target, 12);
        assert_eq!(config.registry.seed_placement, SeedPlacement::Append);
        assert_eq!(config.registry.demo_seed, Some(7));
        assert_eq!(config.storage, StorageConfig::default());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_seed_placement_serialize() {
        let json = serde_json::to_string(&SeedPlacement::Append).unwrap();
        assert_eq!(json, "\"append\"");
    }

    #[test]
    fn test_registry_config_deserialize() {
        let json = r#"{"demo_target": 5}"#;
        let registry: RegistryConfig = serde_json::from_str(json).unwrap();
        assert_eq!(registry.demo_target, 5);
        assert_eq!(registry.seed_placement, SeedPlacement::Prepend);
    }
}
