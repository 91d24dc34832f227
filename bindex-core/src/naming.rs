//! Output file naming: rotation suffixes and the per-run directory.
//!
//! Rotated files are named `<stem>_<NNN>.<ext>` beside the base path. The
//! scans over existing suffixes are plain functions of an existence
//! predicate so they can be exercised without touching the file system.

use crate::error::{ExportError, ExportResult};
use chrono::{DateTime, TimeZone};
use std::ffi::OsString;
use std::fmt::Display;
use std::path::{Path, PathBuf};

/// `strftime` pattern of the run directory name.
pub const RUN_DIR_FORMAT: &str = "%Y%m%d%H%M%S";

/// Insert `_<index>` (zero-padded to `width`) before the extension of `base`.
pub fn suffixed_path(base: &Path, index: usize, width: usize) -> PathBuf {
    let mut name = OsString::new();
    if let Some(stem) = base.file_stem() {
        name.push(stem);
    }
    name.push(format!("_{:0width$}", index, width = width));
    if let Some(ext) = base.extension() {
        name.push(".");
        name.push(ext);
    }
    base.with_file_name(name)
}

/// Lowest suffix for which `exists` is false, scanning up from 0.
pub fn next_missing_suffix<F>(mut exists: F) -> usize
where
    F: FnMut(usize) -> bool,
{
    let mut index = 0;
    while exists(index) {
        index += 1;
    }
    index
}

/// Last suffix of the contiguous run of existing suffixes starting at 0.
/// `None` when suffix 0 does not exist.
pub fn last_existing_suffix<F>(exists: F) -> Option<usize>
where
    F: FnMut(usize) -> bool,
{
    next_missing_suffix(exists).checked_sub(1)
}

/// The file currently receiving rows: the highest existing suffixed file,
/// or `base` itself when no suffixed file exists yet.
pub fn current_file(base: &Path, width: usize) -> PathBuf {
    match last_existing_suffix(|i| suffixed_path(base, i, width).exists()) {
        Some(index) => suffixed_path(base, index, width),
        None => base.to_path_buf(),
    }
}

/// The file to rotate into: the lowest suffixed file that does not exist.
pub fn next_file(base: &Path, width: usize) -> PathBuf {
    let index = next_missing_suffix(|i| suffixed_path(base, i, width).exists());
    suffixed_path(base, index, width)
}

/// Name of the run directory for a run started at `started`.
pub fn run_directory_name<Tz>(started: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    started.format(RUN_DIR_FORMAT).to_string()
}

/// Insert the run directory before the file name of `configured` and
/// create it. Returns the base path the run writes to.
pub fn prepare_run_base<Tz>(configured: &Path, started: &DateTime<Tz>) -> ExportResult<PathBuf>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let file_name = configured.file_name().ok_or_else(|| ExportError::Path {
        path: configured.to_path_buf(),
        reason: "output path has no file name".to_string(),
    })?;
    let parent = configured.parent().unwrap_or_else(|| Path::new(""));
    let run_dir = parent.join(run_directory_name(started));

    std::fs::create_dir_all(&run_dir).map_err(|e| ExportError::Path {
        path: run_dir.clone(),
        reason: e.to_string(),
    })?;

    Ok(run_dir.join(file_name))
}
