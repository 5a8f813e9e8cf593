//! Configuration module for tagscope
//!
//! Settings live in `<config_dir>/tagscope/config.toml`. Any field can be
//! overridden from the environment with a `TAGSCOPE_` prefix, nested fields
//! separated by `__` (`TAGSCOPE_MIN_COUNT=2`, `TAGSCOPE_PATTERNS__NESTING=false`).

use std::fs;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::patterns::{PatternConfig, PatternSettings};
use crate::source::DEFAULT_PAGE_SIZE;
use crate::source::fs::DEFAULT_DOCUMENT_GLOB;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "TAGSCOPE";

/// Application configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct TagscopeConfig {
    /// Tag matching and scanning behavior
    pub patterns: PatternSettings,

    /// Tags with fewer literal occurrences are hidden from tag listings
    pub min_count: usize,

    /// Default document root
    pub vault: Option<PathBuf>,

    /// Glob selecting documents below the root
    pub document_glob: String,

    /// Documents fetched per page while syncing
    pub page_size: usize,

    /// Scanning threads; 0 uses one per core
    pub index_threads: usize,

    /// Log filter used when `RUST_LOG` is not set
    pub log_level: String,

    /// Suppress informational output by default
    pub quiet: bool,
}

impl Default for TagscopeConfig {
    fn default() -> Self {
        Self {
            patterns: PatternSettings::default(),
            min_count: 1,
            vault: None,
            document_glob: DEFAULT_DOCUMENT_GLOB.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            index_threads: 0,
            log_level: "warn".to_string(),
            quiet: false,
        }
    }
}

impl TagscopeConfig {
    /// Get the path to the config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::Message("Could not determine config directory".to_string()))?;

        Ok(config_dir.join("tagscope").join("config.toml"))
    }

    /// Load the user's configuration with environment overrides
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file or an override cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from a specific file with environment overrides
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file or an override cannot be parsed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::build(Some(path), environment())
    }

    fn build(path: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }

        let settings = builder.add_source(env).build()?;
        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Message("page_size must be at least 1".to_string()));
        }
        if self.document_glob.trim().is_empty() {
            return Err(ConfigError::Message("document_glob must not be empty".to_string()));
        }
        Ok(())
    }

    /// Save configuration to the user's config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config directory cannot be created, the configuration
    /// cannot be serialized to TOML, or the file cannot be written.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save configuration to `path`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the directory cannot be created, the configuration
    /// cannot be serialized to TOML, or the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Message(format!("Failed to create config directory: {e}")))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Message(format!("Failed to serialize config: {e}")))?;

        fs::write(path, toml_string)
            .map_err(|e| ConfigError::Message(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Compile the pattern settings
    #[must_use]
    pub fn pattern_config(&self) -> PatternConfig {
        PatternConfig::new(&self.patterns)
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
