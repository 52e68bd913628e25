//! Configuration management with file persistence

use crate::domain::{EmailMatch, IdStrategy};
use crate::storage::{DatabaseConfig, database::DEFAULT_MAX_CONNECTIONS, default_database_path};
use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "JOBSEEKER_CONFIG_DIR";

const DEFAULT_QUERY_TIMEOUT_MS: u64 = 5_000;

/// Jobseeker configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseSettings,
    pub store: StoreSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Database file. Unset means the platform config directory.
    pub path: Option<PathBuf>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub id_strategy: IdStrategy,
    pub email_match: EmailMatch,
    /// Per-operation deadline in milliseconds, 0 disables it
    pub query_timeout_ms: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            id_strategy: IdStrategy::default(),
            email_match: EmailMatch::default(),
            query_timeout_ms: DEFAULT_QUERY_TIMEOUT_MS,
        }
    }
}

impl DatabaseSettings {
    /// Database file to open
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(default_database_path)
    }

    /// Build the connection options for these settings
    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig::with_path(self.resolved_path()).max_connections(self.max_connections)
    }
}

impl StoreSettings {
    pub fn query_timeout(&self) -> Option<Duration> {
        (self.query_timeout_ms > 0).then(|| Duration::from_millis(self.query_timeout_ms))
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var(CONFIG_DIR_ENV) {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("jobseeker")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, or the defaults if it doesn't exist
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config = Self::from_toml(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        self.validate()?;

        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

        let path = Self::config_path()?;
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database.max_connections == 0 {
            return Err(anyhow!("database.max_connections must be at least 1"));
        }
        Ok(())
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        match key {
            "database.path" => Ok(self.database.resolved_path().display().to_string()),
            "database.max_connections" => Ok(self.database.max_connections.to_string()),
            "store.id_strategy" => Ok(self.store.id_strategy.as_str().to_string()),
            "store.email_match" => Ok(self.store.email_match.as_str().to_string()),
            "store.query_timeout_ms" => Ok(self.store.query_timeout_ms.to_string()),
            _ => Err(anyhow!(
                "Unknown configuration key: {}. Use `jobseeker config list` to see available keys.",
                key
            )),
        }
    }

    /// Set a configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "database.path" => {
                if value.trim().is_empty() {
                    self.database.path = None;
                } else {
                    self.database.path = Some(PathBuf::from(value));
                }
            }
            "database.max_connections" => {
                let max: u32 = value
                    .parse()
                    .with_context(|| format!("Invalid max_connections value: {}", value))?;
                if max == 0 {
                    return Err(anyhow!("max_connections must be at least 1"));
                }
                self.database.max_connections = max;
            }
            "store.id_strategy" => {
                self.store.id_strategy = IdStrategy::parse(value).ok_or_else(|| {
                    anyhow!("Invalid id strategy: {}. Valid options: store, client", value)
                })?;
            }
            "store.email_match" => {
                self.store.email_match = EmailMatch::parse(value).ok_or_else(|| {
                    anyhow!(
                        "Invalid email match: {}. Valid options: exact, case_insensitive",
                        value
                    )
                })?;
            }
            "store.query_timeout_ms" => {
                self.store.query_timeout_ms = value
                    .parse()
                    .with_context(|| format!("Invalid query_timeout_ms value: {}", value))?;
            }
            _ => {
                return Err(anyhow!(
                    "Unknown configuration key: {}. Use `jobseeker config list` to see available keys.",
                    key
                ));
            }
        }
        Ok(())
    }

    /// List all configuration keys and their values
    pub fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        let keys = [
            "database.path",
            "database.max_connections",
            "store.id_strategy",
            "store.email_match",
            "store.query_timeout_ms",
        ];

        keys.into_iter()
            .map(|key| Ok((key.to_string(), self.get(key)?)))
            .collect()
    }

    /// Reset configuration to defaults
    pub fn reset() -> anyhow::Result<()> {
        let path = Self::config_path()?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove config file: {}", path.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert!(config.database.path.is_none());
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.store.id_strategy, IdStrategy::Store);
        assert_eq!(config.store.email_match, EmailMatch::Exact);
        assert_eq!(config.store.query_timeout_ms, 5_000);
        assert_eq!(
            config.store.query_timeout(),
            Some(Duration::from_millis(5_000))
        );
    }

    #[test]
    fn test_zero_timeout_disables_deadline() {
        let store = StoreSettings {
            query_timeout_ms: 0,
            ..Default::default()
        };
        assert_eq!(store.query_timeout(), None);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml(
            r#"
            [store]
            email_match = "case_insensitive"
            "#,
        )
        .unwrap();

        assert_eq!(config.store.email_match, EmailMatch::CaseInsensitive);
        assert_eq!(config.store.id_strategy, IdStrategy::Store);
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = Config::default();
        config.set("database.path", "/var/lib/jobseeker/seekers.db").unwrap();
        config.set("store.id_strategy", "client").unwrap();

        let text = toml::to_string_pretty(&config).unwrap();
        let parsed = Config::from_toml(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_invalid_toml_values_rejected() {
        assert!(Config::from_toml("[store]\nid_strategy = \"database\"").is_err());
        assert!(Config::from_toml("[database]\nmax_connections = 0").is_err());
    }

    #[test]
    fn test_get_set_values() {
        let mut config = Config::default();

        config.set("store.email_match", "case_insensitive").unwrap();
        assert_eq!(config.get("store.email_match").unwrap(), "case_insensitive");

        config.set("store.query_timeout_ms", "250").unwrap();
        assert_eq!(config.get("store.query_timeout_ms").unwrap(), "250");

        config.set("database.max_connections", "8").unwrap();
        assert_eq!(config.database.max_connections, 8);

        config.set("database.path", "seekers.db").unwrap();
        assert_eq!(config.get("database.path").unwrap(), "seekers.db");
        assert_eq!(
            config.database.database_config().path,
            PathBuf::from("seekers.db")
        );

        config.set("database.path", "").unwrap();
        assert!(config.database.path.is_none());
    }

    #[test]
    fn test_set_invalid_values() {
        let mut config = Config::default();

        assert!(config.set("store.id_strategy", "database").is_err());
        assert!(config.set("store.email_match", "fuzzy").is_err());
        assert!(config.set("store.query_timeout_ms", "soon").is_err());
        assert!(config.set("database.max_connections", "0").is_err());
        assert!(config.set("unknown.key", "x").is_err());
        assert!(config.get("unknown.key").is_err());
    }

    #[test]
    fn test_list_covers_all_keys() {
        let items = Config::default().list().unwrap();
        let keys: Vec<&str> = items.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "database.path",
                "database.max_connections",
                "store.id_strategy",
                "store.email_match",
                "store.query_timeout_ms",
            ]
        );
    }
}
