//! Configuration file discovery.

use bindex_core::ConfigError;
use std::path::PathBuf;

pub const CONFIG_ENV: &str = "BINDEX_CONFIG";

/// `--config <path>` (or `--config=<path>`) wins over `BINDEX_CONFIG`.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    resolve_config_path(std::env::args().skip(1), std::env::var(CONFIG_ENV).ok())
}

pub fn resolve_config_path<I>(args: I, env_value: Option<String>) -> Result<PathBuf, ConfigError>
where
    I: IntoIterator<Item = String>,
{
    config_path_from_args(args)
        .or_else(|| env_value.filter(|v| !v.trim().is_empty()).map(PathBuf::from))
        .ok_or(ConfigError::MissingConfigPath)
}

fn config_path_from_args<I>(args: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(PathBuf::from(path));
        }
    }
    None
}
