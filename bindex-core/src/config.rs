//! Configuration for a bindex run.
//!
//! Loaded once from a TOML file and passed by reference to every stage.
//! All fields are required unless explicitly marked optional.

use crate::error::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides `source.password`.
pub const PASSWORD_ENV: &str = "BINDEX_DB_PASSWORD";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    pub params: ParamConfig,
    pub source: SourceConfig,
    pub output: OutputConfig,
    pub throttle: ThrottleConfig,
}

/// Where the parameter file lives.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamConfig {
    pub file: PathBuf,
    /// Fallback directory; `file` is resolved against it when it does not
    /// exist as given.
    pub base_dir: Option<PathBuf>,
}

#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    pub driver: String,
    pub url: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub query: String,
    /// Statement timeout in seconds; 0 disables it.
    pub timeout_secs: u64,
}

impl fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceConfig")
            .field("driver", &self.driver)
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("query", &self.query)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Configured output base; the run directory is inserted before its
    /// file name.
    pub file: PathBuf,
    pub delimiter: String,
    pub max_rows_per_file: usize,
    /// Zero-padding width of the rotation suffix.
    pub suffix_width: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThrottleConfig {
    /// Whole seconds to wait between parameter tuples.
    pub sleep_secs: u64,
}

impl SourceConfig {
    pub fn statement_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ThrottleConfig {
    pub fn sleep(&self) -> Duration {
        Duration::from_secs(self.sleep_secs)
    }
}

impl ExportConfig {
    /// Read, apply environment overrides, and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_path(path)?;
        if let Ok(password) = std::env::var(PASSWORD_ENV) {
            config.source.password = Some(password);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: ExportConfig = toml::from_str(contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.params.file.as_os_str().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "params.file",
            });
        }
        if self.source.driver.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "source.driver",
            });
        }
        if self.source.url.trim().is_empty() {
            return Err(ConfigError::MissingRequired { field: "source.url" });
        }
        if self.source.query.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "source.query",
            });
        }
        if self.output.file.as_os_str().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "output.file",
            });
        }
        if self.output.file.file_name().is_none() {
            return Err(ConfigError::InvalidValue {
                field: "output.file",
                reason: "must end in a file name".to_string(),
            });
        }
        if self.output.delimiter.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "output.delimiter",
                reason: "must not be empty".to_string(),
            });
        }
        if self.output.max_rows_per_file == 0 {
            return Err(ConfigError::InvalidValue {
                field: "output.max_rows_per_file",
                reason: "must be > 0".to_string(),
            });
        }
        if self.output.suffix_width == 0 {
            return Err(ConfigError::InvalidValue {
                field: "output.suffix_width",
                reason: "must be > 0".to_string(),
            });
        }
        Ok(())
    }
}
