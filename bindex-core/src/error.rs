//! Error types for bindex runs

use crate::ParameterTuple;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or BINDEX_CONFIG)")]
    MissingConfigPath,

    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: &'static str },

    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Coarse classification of a failed run, for callers that branch on outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Failed before the first query; nothing was written.
    Setup,
    /// The relational source failed (connect, bind, query or close).
    Source,
    /// An output file could not be written.
    Output,
    /// The inter-tuple pause was interrupted.
    Interrupted,
}

/// Every way a run can stop. All of them are fatal to the run.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Parameter file does not exist (tried: {})", display_paths(tried))]
    ParamFileNotFound { tried: Vec<PathBuf> },

    #[error("Failed to read parameter file {path}: {reason}")]
    ParamRead { path: PathBuf, reason: String },

    #[error("Unsupported database driver: {driver}")]
    DriverLoad { driver: String },

    #[error("Failed to prepare output path {path}: {reason}")]
    Path { path: PathBuf, reason: String },

    #[error("Connection failed for parameters ({params}): {reason}")]
    Connection {
        params: ParameterTuple,
        reason: String,
    },

    #[error("Query failed for parameters ({params}): {reason}")]
    Query {
        params: ParameterTuple,
        reason: String,
    },

    #[error("Query expects {expected} parameters but ({params}) has {got}")]
    Bind {
        params: ParameterTuple,
        expected: usize,
        got: usize,
    },

    #[error("Failed to close connection for parameters ({params}): {reason}")]
    Close {
        params: ParameterTuple,
        reason: String,
    },

    #[error("Failed to write {path}: {reason}")]
    Write { path: PathBuf, reason: String },

    #[error("Sleep interrupted after parameter tuple {completed} of {total}")]
    SleepInterrupted { completed: usize, total: usize },
}

impl ExportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExportError::Config(_)
            | ExportError::ParamFileNotFound { .. }
            | ExportError::ParamRead { .. }
            | ExportError::DriverLoad { .. }
            | ExportError::Path { .. } => ErrorKind::Setup,
            ExportError::Connection { .. }
            | ExportError::Query { .. }
            | ExportError::Bind { .. }
            | ExportError::Close { .. } => ErrorKind::Source,
            ExportError::Write { .. } => ErrorKind::Output,
            ExportError::SleepInterrupted { .. } => ErrorKind::Interrupted,
        }
    }

    /// True when the run stopped before any output could have been produced.
    pub fn is_setup(&self) -> bool {
        self.kind() == ErrorKind::Setup
    }

    /// The parameter tuple being processed when the error occurred, if any.
    pub fn params(&self) -> Option<&ParameterTuple> {
        match self {
            ExportError::Connection { params, .. }
            | ExportError::Query { params, .. }
            | ExportError::Bind { params, .. }
            | ExportError::Close { params, .. } => Some(params),
            _ => None,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        ExportError::Write {
            path: path.into(),
            reason: err.to_string(),
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias for bindex operations.
pub type ExportResult<T> = Result<T, ExportError>;

// =============================================================================
// TESTS
// =============================================================================
