//! Parameter file loading.
//!
//! One tuple per line, fields separated by tabs. Blank lines are kept as
//! empty tuples so that tuple positions always match line numbers.

use crate::error::{ExportError, ExportResult};
use crate::types::ParameterTuple;
use std::path::{Path, PathBuf};

pub struct ParamSource;

impl ParamSource {
    /// Resolve the parameter file and parse it.
    ///
    /// `path` is used as given when it exists; otherwise it is resolved
    /// against `base_dir`.
    pub fn load(path: &Path, base_dir: Option<&Path>) -> ExportResult<Vec<ParameterTuple>> {
        let resolved = Self::resolve(path, base_dir)?;
        tracing::debug!(path = %resolved.display(), "Reading parameter list file");

        let bytes = std::fs::read(&resolved).map_err(|e| ExportError::ParamRead {
            path: resolved.clone(),
            reason: e.to_string(),
        })?;
        let contents = String::from_utf8(bytes).map_err(|e| ExportError::ParamRead {
            path: resolved.clone(),
            reason: format!("not valid UTF-8: {}", e),
        })?;

        Ok(Self::parse(&contents))
    }

    pub fn resolve(path: &Path, base_dir: Option<&Path>) -> ExportResult<PathBuf> {
        if path.exists() {
            return Ok(path.to_path_buf());
        }

        let mut tried = vec![path.to_path_buf()];
        if let Some(base) = base_dir {
            let fallback = base.join(path);
            if fallback.exists() {
                tracing::debug!(
                    configured = %path.display(),
                    fallback = %fallback.display(),
                    "Using base-directory parameter file"
                );
                return Ok(fallback);
            }
            tried.push(fallback);
        }

        Err(ExportError::ParamFileNotFound { tried })
    }

    pub fn parse(contents: &str) -> Vec<ParameterTuple> {
        contents.lines().map(parse_line).collect()
    }
}

fn parse_line(line: &str) -> ParameterTuple {
    if line.is_empty() {
        return ParameterTuple::default();
    }
    ParameterTuple::new(line.split('\t').map(str::to_string).collect())
}
