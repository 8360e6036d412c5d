//! Subprocess invocation behind a narrow command-runner seam.
//!
//! The bootstrap sequence shells out to the OS package manager, pip, and
//! Streamlit. All of it goes through the [`CommandRunner`] trait so the
//! sequencing logic is testable without a real package manager: tests
//! inject a fake runner that records invocations and scripts their outcomes.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{LauncherError, Result};

// ---------------------------------------------------------------------------
// CommandSpec / RunStatus
// ---------------------------------------------------------------------------

/// A fully-rendered external command, ready to spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|s| s.to_string()).collect(),
            cwd: None,
        }
    }

    pub fn with_cwd(mut self, cwd: &Path) -> Self {
        self.cwd = Some(cwd.to_path_buf());
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Observed outcome of a finished command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStatus {
    pub success: bool,
    /// Exit code, when the process exited normally (None on signal death).
    pub code: Option<i32>,
}

impl RunStatus {
    pub fn ok() -> Self {
        Self {
            success: true,
            code: Some(0),
        }
    }

    pub fn failed(code: i32) -> Self {
        Self {
            success: false,
            code: Some(code),
        }
    }
}

// ---------------------------------------------------------------------------
// CommandRunner
// ---------------------------------------------------------------------------

pub trait CommandRunner {
    /// Spawn the command with stdio inherited (output streams to the
    /// terminal) and block until it exits.
    fn run(&self, spec: &CommandSpec) -> Result<RunStatus>;
}

/// Production runner backed by `std::process`.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<RunStatus> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);
        if let Some(cwd) = &spec.cwd {
            cmd.current_dir(cwd);
        }
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::inherit());
        cmd.stderr(Stdio::inherit());

        let status = cmd.status().map_err(|e| LauncherError::SpawnFailed {
            program: spec.program.clone(),
            detail: e.to_string(),
        })?;

        Ok(RunStatus {
            success: status.success(),
            code: status.code(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tool detection
// ---------------------------------------------------------------------------

/// The pip executables we know how to drive, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipFlavor {
    Pip3,
    Pip,
}

impl PipFlavor {
    pub fn program(&self) -> &'static str {
        match self {
            PipFlavor::Pip3 => "pip3",
            PipFlavor::Pip => "pip",
        }
    }
}

/// Detect the best available pip executable.
/// Returns None if neither `pip3` nor `pip` is on PATH.
pub fn detect_pip() -> Option<PipFlavor> {
    if which::which("pip3").is_ok() {
        return Some(PipFlavor::Pip3);
    }
    if which::which("pip").is_ok() {
        return Some(PipFlavor::Pip);
    }
    None
}

/// True if `tool` resolves on PATH.
pub fn tool_available(tool: &str) -> bool {
    which::which(tool).is_ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
