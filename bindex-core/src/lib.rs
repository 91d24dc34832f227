//! bindex Core - Export Engine
//!
//! Binds each line of a tab-separated parameter file into one query, runs it
//! against a relational source, and appends the rows as delimited text to
//! output files that rotate at a fixed row count.
//!
//! The relational driver lives behind [`QueryRunner`]; `bindex-pg` provides
//! the PostgreSQL implementation.

pub mod config;
pub mod error;
pub mod naming;
pub mod orchestrator;
pub mod params;
pub mod runner;
pub mod types;
pub mod writer;

pub use config::{ExportConfig, OutputConfig, ParamConfig, SourceConfig, ThrottleConfig};
pub use error::{ConfigError, ErrorKind, ExportError, ExportResult};
pub use naming::{
    current_file, last_existing_suffix, next_file, next_missing_suffix, prepare_run_base,
    run_directory_name, suffixed_path,
};
pub use orchestrator::ExportOrchestrator;
pub use params::ParamSource;
pub use runner::{Pause, PauseInterrupted, QueryRunner, TokioPause};
pub use types::{OutputTarget, ParameterTuple, ResultRow, RunCounters};
pub use writer::{RecordWriter, WriteProgress};
