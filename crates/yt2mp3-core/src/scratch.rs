//! Batch subdirectories inside the scratch directory.
//!
//! The web application creates one unique batch directory per conversion run
//! and removes it when the run finishes. A crash mid-run leaves the batch
//! behind, so the launcher offers a cleanup pass over stale batches.

use crate::config::Config;
use crate::error::Result;
use crate::io;
use crate::paths;
use std::path::{Path, PathBuf};

/// Create a unique `batch-*` subdirectory inside the scratch directory.
/// The scratch directory itself is created first if needed.
pub fn create_batch_dir(cfg: &Config, root: &Path) -> Result<PathBuf> {
    let base = paths::scratch_dir(root, &cfg.scratch_dir);
    io::ensure_dir(&base)?;
    let dir = tempfile::Builder::new()
        .prefix(paths::BATCH_PREFIX)
        .tempdir_in(&base)?
        .keep();
    Ok(dir)
}

/// Remove leftover `batch-*` subdirectories. Returns how many were removed.
/// Anything else in the scratch directory is left alone.
pub fn clean_stale_batches(cfg: &Config, root: &Path) -> Result<usize> {
    let base = paths::scratch_dir(root, &cfg.scratch_dir);
    if !base.exists() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in std::fs::read_dir(&base)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with(paths::BATCH_PREFIX) {
            continue;
        }
        std::fs::remove_dir_all(entry.path())?;
        removed += 1;
    }
    Ok(removed)
}
