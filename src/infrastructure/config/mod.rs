//! Application configuration.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "stridelog";
const APP_QUALIFIER: &str = "com";
const APP_ORGANIZATION: &str = "tecknian";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Image cache pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum decoded images held in memory.
    #[serde(default = "default_memory_capacity")]
    pub memory_capacity: usize,

    /// Disk tier byte cap.
    #[serde(default = "default_disk_max_bytes")]
    pub disk_max_bytes: u64,

    /// Disk tier directory. Defaults to the platform cache dir.
    #[serde(default)]
    pub disk_dir: Option<PathBuf>,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            memory_capacity: default_memory_capacity(),
            disk_max_bytes: default_disk_max_bytes(),
            disk_dir: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl CacheConfig {
    /// Returns the effective disk cache directory.
    #[must_use]
    pub fn effective_disk_dir(&self) -> PathBuf {
        self.disk_dir.clone().unwrap_or_else(default_cache_dir)
    }
}

/// Object storage endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Upload endpoint receiving PUT requests.
    #[serde(default = "default_storage_endpoint")]
    pub endpoint: String,

    /// Public base URL under which uploaded objects resolve.
    #[serde(default = "default_public_base")]
    pub public_base: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: default_storage_endpoint(),
            public_base: default_public_base(),
        }
    }
}

/// Top-level application configuration, loaded from TOML with CLI overrides.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Log file path. `None` logs to stderr.
    #[serde(default)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Cache pipeline settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Object storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Loads configuration from `path`, or from the default location when
    /// `path` is `None`. A missing file yields the defaults.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let effective = path
            .map(Path::to_path_buf)
            .or_else(Self::default_config_path);

        let Some(effective) = effective else {
            return Ok(Self::default());
        };

        if !effective.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(&effective).map_err(|e| ConfigError::Io {
            path: effective.clone(),
            message: e.to_string(),
        })?;

        toml::from_str(&raw).map_err(|e| ConfigError::Parse {
            path: effective,
            message: e.to_string(),
        })
    }

    /// Returns the default config directory.
    #[must_use]
    pub fn default_config_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns the default config file path.
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        Self::default_config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Returns the default log file path.
    #[must_use]
    pub fn default_log_path() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.data_dir().join("stridelog.log"))
    }

    /// Returns the effective log path.
    #[must_use]
    pub fn effective_log_path(&self) -> Option<PathBuf> {
        self.log_path.clone().or_else(Self::default_log_path)
    }
}

/// Configuration loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {message}")]
    Io {
        /// Offending path.
        path: PathBuf,
        /// Underlying error text.
        message: String,
    },
    /// The file is not valid TOML for this schema.
    #[error("failed to parse config {path}: {message}")]
    Parse {
        /// Offending path.
        path: PathBuf,
        /// Underlying error text.
        message: String,
    },
}

/// Returns the default disk cache directory.
fn default_cache_dir() -> PathBuf {
    ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME).map_or_else(
        || {
            std::env::temp_dir()
                .join("stridelog")
                .join("cache")
                .join("images")
        },
        |dirs| dirs.cache_dir().join("images"),
    )
}

fn default_memory_capacity() -> usize {
    50
}

fn default_disk_max_bytes() -> u64 {
    200 * 1024 * 1024
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_storage_endpoint() -> String {
    "https://storage.stridelog.app/upload".to_string()
}

fn default_public_base() -> String {
    "https://cdn.stridelog.app".to_string()
}
