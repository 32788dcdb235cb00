//! Core configuration.
//!
//! # Responsibility
//! - Describe database, logging and query defaults in one TOML document.
//! - Reject inconsistent values before they reach the storage layer.
//!
//! # Invariants
//! - Every section has a usable `Default`; an empty document is valid.
//! - `0 < default_page_size <= max_page_size`.

use crate::model::sort::NullPlacement;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_PAGE_SIZE: u32 = 20;
const MAX_PAGE_SIZE: u32 = 200;

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config document: {err}"),
            Self::Invalid(message) => write!(f, "invalid config value: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub query: QueryConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database file. `None` opens an in-memory database.
    pub path: Option<PathBuf>,
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Absolute log directory. `None` leaves logging uninitialized.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: crate::logging::default_log_level().to_string(),
            dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
    /// Null placement used by callers that do not pick one per term.
    pub default_null_placement: NullPlacement,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
            default_null_placement: NullPlacement::Last,
        }
    }
}

impl CoreConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let query = &self.query;
        if query.default_page_size == 0 {
            return Err(ConfigError::Invalid(
                "query.default_page_size must be positive".to_string(),
            ));
        }
        if query.default_page_size > query.max_page_size {
            return Err(ConfigError::Invalid(format!(
                "query.default_page_size {} exceeds query.max_page_size {}",
                query.default_page_size, query.max_page_size
            )));
        }
        if let Some(dir) = self.logging.dir.as_deref() {
            if !dir.is_absolute() {
                return Err(ConfigError::Invalid(format!(
                    "logging.dir must be absolute, got `{}`",
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}
