//! Configuration for tagcache.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cache::DEFAULT_CAPACITY;
use crate::{TagCacheError, TagCacheResult};

/// Accepted log levels.
pub const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Accepted log formats.
pub const LOG_FORMATS: &[&str] = &["text", "json"];

/// Main configuration for tagcache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

/// Tag function cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Soft capacity shared by both caches (0 disables caching).
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,

    /// How deferred reduction passes are run.
    #[serde(default)]
    pub scheduler: SchedulerKind,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            scheduler: SchedulerKind::default(),
        }
    }
}

fn default_cache_capacity() -> usize {
    DEFAULT_CAPACITY
}

/// Available reduction schedulers.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerKind {
    /// Spawns the pass on the current tokio runtime.
    #[default]
    Tokio,
    /// Runs the pass right after the triggering insertion.
    Inline,
}

impl std::fmt::Display for SchedulerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchedulerKind::Tokio => write!(f, "tokio"),
            SchedulerKind::Inline => write!(f, "inline"),
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> TagCacheResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that the TOML types alone cannot constrain.
    pub fn validate(&self) -> TagCacheResult<()> {
        if !LOG_LEVELS.contains(&self.general.log_level.as_str()) {
            return Err(TagCacheError::config(format!(
                "log_level '{}' inválido (esperado: {})",
                self.general.log_level,
                LOG_LEVELS.join(", ")
            )));
        }
        if !LOG_FORMATS.contains(&self.general.log_format.as_str()) {
            return Err(TagCacheError::config(format!(
                "log_format '{}' inválido (esperado: {})",
                self.general.log_format,
                LOG_FORMATS.join(", ")
            )));
        }
        Ok(())
    }

    /// Saves configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> TagCacheResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Creates default configuration.
    pub fn default_config() -> Self {
        Self {
            general: GeneralConfig::default(),
            cache: CacheConfig::default(),
        }
    }

    /// Loads `path` if it exists, otherwise returns the default configuration.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> TagCacheResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default_config())
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default_config();
        assert_eq!(config.cache.capacity, 100);
        assert_eq!(config.cache.scheduler, SchedulerKind::Tokio);
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[cache]\ncapacity = 20\n").unwrap();
        assert_eq!(config.cache.capacity, 20);
        assert_eq!(config.cache.scheduler, SchedulerKind::Tokio);
        assert_eq!(config.general.log_format, "text");
    }

    #[test]
    fn test_negative_capacity_rejected() {
        let parsed: Result<Config, _> = toml::from_str("[cache]\ncapacity = -5\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.cache.capacity, 100);
    }

    #[test]
    fn test_invalid_log_format_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tagcache.toml");
        std::fs::write(&path, "[general]\nlog_format = \"xml\"\n").unwrap();

        let err = Config::load_or_default(&path).unwrap_err();
        assert!(matches!(err, TagCacheError::Config(ref msg) if msg.contains("xml")));
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let mut config = Config::default_config();
        config.general.log_level = "loud".to_string();
        assert!(matches!(config.validate(), Err(TagCacheError::Config(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tagcache.toml");

        let mut config = Config::default_config();
        config.cache.capacity = 0;
        config.cache.scheduler = SchedulerKind::Inline;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.cache.capacity, 0);
        assert_eq!(loaded.cache.scheduler, SchedulerKind::Inline);
    }
}
