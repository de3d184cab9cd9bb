//! Configuration management.
//!
//! Settings resolve in three layers: built-in defaults, then an optional
//! `cairn.toml` in the platform config directory, then `CAIRN_*`
//! environment variables.

use serde::Deserialize;
use std::path::PathBuf;

use chrono_tz::Tz;

use crate::{Error, Result};

/// Environment variable overriding the data directory.
pub const ENV_DATA_DIR: &str = "CAIRN_DATA_DIR";
/// Environment variable overriding the timezone.
pub const ENV_TIMEZONE: &str = "CAIRN_TIMEZONE";
/// Environment variable overriding the log filter.
pub const ENV_LOG: &str = "CAIRN_LOG";
/// Environment variable overriding the log format.
pub const ENV_LOG_FORMAT: &str = "CAIRN_LOG_FORMAT";

const CONFIG_FILE_NAME: &str = "cairn.toml";

const DEFAULT_ENTITY_TYPES: [&str; 4] = ["person", "company", "project", "topic"];

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable line format.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parses a format string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Main configuration for cairn.
#[derive(Debug, Clone)]
pub struct CairnConfig {
    /// Root directory holding blobs and workspace indexes.
    pub data_dir: PathBuf,
    /// Workspace used when the caller does not name one.
    pub default_workspace: String,
    /// IANA timezone daily notes resolve "today" in.
    pub timezone: String,
    /// Entity types suggested for organizing notes under `entities/`.
    pub entity_types: Vec<String>,
    /// Log level filter.
    pub log: String,
    /// Log output format.
    pub log_format: LogFormat,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Data directory.
    pub data_dir: Option<String>,
    /// Default workspace.
    pub default_workspace: Option<String>,
    /// IANA timezone name.
    pub timezone: Option<String>,
    /// Entity types.
    pub entity_types: Option<Vec<String>>,
    /// Log filter.
    pub log: Option<String>,
    /// Log format: "text" or "json".
    pub log_format: Option<String>,
}

impl Default for CairnConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            default_workspace: "default".to_string(),
            timezone: "UTC".to_string(),
            entity_types: DEFAULT_ENTITY_TYPES.map(String::from).to_vec(),
            log: "info".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl CairnConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from the default file location (when present)
    /// and the environment, then validates it.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing config file cannot be read or
    /// parsed, or the resolved settings fail validation.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_file_path() {
            Some(path) if path.exists() => Self::load_from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &std::path::Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: e.to_string(),
        })?;

        let file: ConfigFile = toml::from_str(&contents).map_err(|e| Error::OperationFailed {
            operation: "parse_config_file".to_string(),
            cause: e.to_string(),
        })?;

        Ok(Self::from_config_file(file))
    }

    /// Returns the default config file location, typically
    /// `~/.config/cairn/cairn.toml` on Linux.
    #[must_use]
    pub fn config_file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "cairn")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Converts a `ConfigFile` to `CairnConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(data_dir) = file.data_dir {
            config.data_dir = PathBuf::from(data_dir);
        }
        if let Some(workspace) = file.default_workspace {
            config.default_workspace = workspace;
        }
        if let Some(timezone) = file.timezone {
            config.timezone = timezone;
        }
        if let Some(entity_types) = file.entity_types {
            config.entity_types = entity_types;
        }
        if let Some(log) = file.log {
            config.log = log;
        }
        if let Some(format) = file.log_format {
            config.log_format = LogFormat::parse(&format);
        }

        config
    }

    fn apply_env(&mut self) {
        if let Ok(dir) = std::env::var(ENV_DATA_DIR)
            && !dir.is_empty()
        {
            self.data_dir = PathBuf::from(dir);
        }
        if let Ok(timezone) = std::env::var(ENV_TIMEZONE)
            && !timezone.is_empty()
        {
            self.timezone = timezone;
        }
        if let Ok(log) = std::env::var(ENV_LOG)
            && !log.is_empty()
        {
            self.log = log;
        }
        if let Ok(format) = std::env::var(ENV_LOG_FORMAT)
            && !format.is_empty()
        {
            self.log_format = LogFormat::parse(&format);
        }
    }

    /// Checks the resolved settings for contradictions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an unknown timezone or an
    /// unusable default workspace name.
    pub fn validate(&self) -> Result<()> {
        self.timezone()?;
        if !crate::storage::is_safe_segment_path(&self.default_workspace) {
            return Err(Error::Validation(format!(
                "invalid default workspace name: {}",
                self.default_workspace
            )));
        }
        Ok(())
    }

    /// Resolves the configured timezone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the name is not a known IANA
    /// timezone.
    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| Error::Validation(format!("unknown timezone: {}", self.timezone)))
    }

    /// Root directory for document blobs.
    #[must_use]
    pub fn blob_root(&self) -> PathBuf {
        self.data_dir.join("blobs")
    }

    /// Root directory for per-workspace index databases.
    #[must_use]
    pub fn index_root(&self) -> PathBuf {
        self.data_dir.join("index")
    }

    /// Sets the data directory.
    #[must_use]
    pub fn with_data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_dir = path.into();
        self
    }

    /// Sets the default workspace.
    #[must_use]
    pub fn with_default_workspace(mut self, workspace: impl Into<String>) -> Self {
        self.default_workspace = workspace.into();
        self
    }

    /// Sets the timezone.
    #[must_use]
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }
}

fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "cairn").map_or_else(
        || PathBuf::from(".cairn"),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}
