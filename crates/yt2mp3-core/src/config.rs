use crate::error::{LauncherError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// InstallPolicy
// ---------------------------------------------------------------------------

/// What to do when the system package install fails.
///
/// The deployed startup scripts disagreed on this, so it is an explicit
/// choice rather than a hardcoded behavior. `Fatal` is the default: the
/// conversion feature cannot work without ffmpeg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InstallPolicy {
    #[default]
    Fatal,
    Warn,
}

impl InstallPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstallPolicy::Fatal => "fatal",
            InstallPolicy::Warn => "warn",
        }
    }
}

// ---------------------------------------------------------------------------
// SystemConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    /// OS package required by the audio pipeline.
    #[serde(default = "default_package")]
    pub package: String,
    #[serde(default)]
    pub policy: InstallPolicy,
}

fn default_package() -> String {
    "ffmpeg".to_string()
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            package: default_package(),
            policy: InstallPolicy::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// DepsConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepsConfig {
    #[serde(default = "default_manifest")]
    pub manifest: String,
    /// Forces a fresh resolve/install on every boot.
    #[serde(default = "default_no_cache")]
    pub no_cache: bool,
}

fn default_manifest() -> String {
    paths::REQUIREMENTS_FILE.to_string()
}

fn default_no_cache() -> bool {
    true
}

impl Default for DepsConfig {
    fn default() -> Self {
        Self {
            manifest: default_manifest(),
            no_cache: default_no_cache(),
        }
    }
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

/// Invocation contract for the Streamlit server.
///
/// `enable_cors` and `enable_xsrf_protection` default to off. That is the
/// contract the single-tenant deployment runs with; turning them on changes
/// observable behavior and is surfaced by `Config::validate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_app_script")]
    pub app_script: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_headless")]
    pub headless: bool,
    #[serde(default)]
    pub enable_cors: bool,
    #[serde(default)]
    pub enable_xsrf_protection: bool,
}

fn default_app_script() -> String {
    paths::APP_SCRIPT.to_string()
}

fn default_port() -> u16 {
    9000
}

fn default_headless() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            app_script: default_app_script(),
            port: default_port(),
            headless: default_headless(),
            enable_cors: false,
            enable_xsrf_protection: false,
        }
    }
}

// ---------------------------------------------------------------------------
// ProjectConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub project: ProjectConfig,
    #[serde(default)]
    pub system: SystemConfig,
    #[serde(default)]
    pub deps: DepsConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: String,
}

fn default_version() -> u32 {
    1
}

fn default_scratch_dir() -> String {
    paths::SCRATCH_DIR.to_string()
}

impl Config {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            version: 1,
            project: ProjectConfig {
                name: project_name.into(),
                description: None,
            },
            system: SystemConfig::default(),
            deps: DepsConfig::default(),
            server: ServerConfig::default(),
            scratch_dir: default_scratch_dir(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(LauncherError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if let Err(e) = paths::validate_package_name(&self.system.package) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: e.to_string(),
            });
        }

        if self.server.port == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "server.port is 0; the downstream UI expects a fixed port".into(),
            });
        }

        if self.server.enable_cors || self.server.enable_xsrf_protection {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "CORS/XSRF protection enabled: the stock web UI is deployed \
                          with both off; enabling them changes its behavior"
                    .into(),
            });
        }

        if !self.deps.manifest.ends_with(".txt") {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "deps.manifest '{}' does not look like a pip requirements file",
                    self.deps.manifest
                ),
            });
        }

        if self.scratch_dir.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "scratch_dir must not be empty".into(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
