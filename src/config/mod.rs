use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub rules: IntegrityRules,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path of the SQLite database file (created when missing)
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
    /// Pool size. One connection keeps every call on a single transaction lane.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

fn default_database_path() -> PathBuf {
    PathBuf::from("./data/inventarioBaru.db")
}

fn default_max_connections() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Application-level integrity rules.
///
/// All default to off, which matches how existing databases were written:
/// duplicate emails and serials exist, and assignments may point at serials
/// that were never registered.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
pub struct IntegrityRules {
    /// Reject enrolling an email that already has a login row
    #[serde(default)]
    pub unique_login_email: bool,
    /// Reject registering a serial that already exists
    #[serde(default)]
    pub unique_asset_serial: bool,
    /// Reject assignments whose serial has no asset row
    #[serde(default)]
    pub require_existing_asset: bool,
    /// Reject assets whose manufacturer or model name is not in the catalog
    #[serde(default)]
    pub require_catalog_references: bool,
}

impl IntegrityRules {
    /// Every rule switched on
    pub fn strict() -> Self {
        Self {
            unique_login_email: true,
            unique_asset_serial: true,
            require_existing_asset: true,
            require_catalog_references: true,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::from_toml(&content)
        } else {
            info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse configuration file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.database.path, PathBuf::from("./data/inventarioBaru.db"));
        assert_eq!(config.database.max_connections, 1);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.rules, IntegrityRules::default());
        assert!(!config.rules.unique_login_email);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [database]
            path = "/tmp/inv.db"

            [rules]
            unique_asset_serial = true
            "#,
        )
        .unwrap();

        assert_eq!(config.database.path, PathBuf::from("/tmp/inv.db"));
        assert_eq!(config.database.max_connections, 1);
        assert_eq!(config.logging.level, "info");
        assert!(config.rules.unique_asset_serial);
        assert!(!config.rules.require_existing_asset);
    }

    #[test]
    fn test_empty_toml() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_toml() {
        assert!(Config::from_toml("[database\npath = 3").is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.database.max_connections, 1);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventario.toml");
        std::fs::write(&path, "[logging]\nlevel = \"debug\"\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_strict_rules() {
        let rules = IntegrityRules::strict();
        assert!(rules.unique_login_email);
        assert!(rules.unique_asset_serial);
        assert!(rules.require_existing_asset);
        assert!(rules.require_catalog_references);
    }
}
