use crate::error::{LauncherError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// File and directory constants
// ---------------------------------------------------------------------------

/// Scratch directory for transient audio batches. This name is a contract
/// shared with the downstream web application; it must never be duplicated
/// as a literal anywhere else.
pub const SCRATCH_DIR: &str = "temp_audio_batches";

/// Prefix for per-run batch subdirectories inside the scratch directory.
pub const BATCH_PREFIX: &str = "batch-";

pub const CONFIG_FILE: &str = "yt2mp3.yaml";
pub const APP_SCRIPT: &str = "app.py";
pub const REQUIREMENTS_FILE: &str = "requirements.txt";

pub const USER_DIR: &str = ".yt2mp3";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn scratch_dir(root: &Path, name: &str) -> PathBuf {
    root.join(name)
}

pub fn app_script_path(root: &Path, script: &str) -> PathBuf {
    root.join(script)
}

pub fn manifest_path(root: &Path, manifest: &str) -> PathBuf {
    root.join(manifest)
}

/// `~/.yt2mp3`, holding one launch record per project.
pub fn user_record_dir() -> Result<PathBuf> {
    let home = home::home_dir().ok_or(LauncherError::HomeNotFound)?;
    Ok(home.join(USER_DIR))
}

pub fn user_record_path(project: &str) -> Result<PathBuf> {
    Ok(user_record_dir()?.join(format!("{project}.yaml")))
}

// ---------------------------------------------------------------------------
// Package name validation
// ---------------------------------------------------------------------------

static PKG_RE: OnceLock<Regex> = OnceLock::new();

fn pkg_re() -> &'static Regex {
    // Debian package naming: at least two chars, starts with alnum,
    // then lowercase alnum plus '+', '-', '.'.
    PKG_RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9+\-.]+$").unwrap())
}

pub fn validate_package_name(name: &str) -> Result<()> {
    if name.len() < 2 || name.len() > 64 || !pkg_re().is_match(name) {
        return Err(LauncherError::InvalidPackageName(name.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_package_names() {
        for name in ["ffmpeg", "libavcodec-dev", "g++", "python3.11"] {
            validate_package_name(name).unwrap_or_else(|_| panic!("expected valid: {name}"));
        }
    }

    #[test]
    fn invalid_package_names() {
        for name in ["", "f", "FFMPEG", "has space", "-leading-dash", "semi;colon"] {
            assert!(validate_package_name(name).is_err(), "expected invalid: {name}");
        }
    }

    #[test]
    fn path_helpers() {
        let root = Path::new("/srv/app");
        assert_eq!(config_path(root), PathBuf::from("/srv/app/yt2mp3.yaml"));
        assert_eq!(
            scratch_dir(root, SCRATCH_DIR),
            PathBuf::from("/srv/app/temp_audio_batches")
        );
        assert_eq!(
            manifest_path(root, REQUIREMENTS_FILE),
            PathBuf::from("/srv/app/requirements.txt")
        );
        assert_eq!(
            app_script_path(root, APP_SCRIPT),
            PathBuf::from("/srv/app/app.py")
        );
    }
}
