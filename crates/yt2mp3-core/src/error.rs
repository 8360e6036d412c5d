use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LauncherError {
    #[error("not initialized: run 'yt2mp3 init'")]
    NotInitialized,

    #[error("system package '{package}' failed to install: {detail}")]
    PackageInstall { package: String, detail: String },

    #[error("dependency install from '{manifest}' failed: {detail}")]
    DepsInstall { manifest: String, detail: String },

    #[error("dependency manifest not found: {0}")]
    ManifestNotFound(PathBuf),

    #[error("app script not found: {0}")]
    AppScriptNotFound(PathBuf),

    #[error("failed to spawn '{program}': {detail}")]
    SpawnFailed { program: String, detail: String },

    #[error("could not create scratch directory '{path}': {detail}")]
    ScratchDir { path: PathBuf, detail: String },

    #[error("invalid package name '{0}': must be lowercase alphanumeric with + - .")]
    InvalidPackageName(String),

    #[error("home directory not found: set HOME environment variable")]
    HomeNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, LauncherError>;
