//! The bootstrap sequence: system package → Python dependencies → scratch
//! directory → server handoff.
//!
//! Every step is attempt-once; there are no retries. Step 1's failure policy
//! is configurable (`system.policy`), step 2 and 3 failures are always
//! fatal, and step 4 blocks for the server's lifetime and propagates its
//! exit status.

use std::path::Path;

use crate::config::{Config, InstallPolicy};
use crate::error::{LauncherError, Result};
use crate::io;
use crate::paths;
use crate::runner::{detect_pip, CommandRunner, CommandSpec, PipFlavor, RunStatus};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct BootstrapOptions {
    /// Skip the system package step (deployments that preinstall ffmpeg).
    pub skip_system: bool,
}

// ---------------------------------------------------------------------------
// Command rendering
// ---------------------------------------------------------------------------

/// The two package-manager invocations for step 1, in order.
pub fn package_commands(cfg: &Config) -> Vec<CommandSpec> {
    vec![
        CommandSpec::new("apt-get", &["update"]),
        CommandSpec::new("apt-get", &["install", "-y", &cfg.system.package]),
    ]
}

/// The pip invocation for step 2.
pub fn deps_command(cfg: &Config, pip: PipFlavor) -> CommandSpec {
    let mut args = vec!["install".to_string(), "-r".to_string(), cfg.deps.manifest.clone()];
    if cfg.deps.no_cache {
        args.push("--no-cache-dir".to_string());
    }
    CommandSpec {
        program: pip.program().to_string(),
        args,
        cwd: None,
    }
}

/// The server invocation for step 4. Always the same shape: fixed port,
/// headless, CORS and XSRF toggles rendered from config.
pub fn server_command(cfg: &Config) -> CommandSpec {
    CommandSpec {
        program: "streamlit".to_string(),
        args: vec![
            "run".to_string(),
            cfg.server.app_script.clone(),
            "--server.port".to_string(),
            cfg.server.port.to_string(),
            "--server.headless".to_string(),
            cfg.server.headless.to_string(),
            "--server.enableCORS".to_string(),
            cfg.server.enable_cors.to_string(),
            "--server.enableXsrfProtection".to_string(),
            cfg.server.enable_xsrf_protection.to_string(),
        ],
        cwd: None,
    }
}

/// The full ordered command sequence, without executing anything.
/// Backs `yt2mp3 up --dry-run`.
pub fn plan(cfg: &Config, opts: &BootstrapOptions) -> Vec<CommandSpec> {
    let mut cmds = Vec::new();
    if !opts.skip_system {
        cmds.extend(package_commands(cfg));
    }
    let pip = detect_pip().unwrap_or(PipFlavor::Pip3);
    cmds.push(deps_command(cfg, pip));
    cmds.push(server_command(cfg));
    cmds
}

// ---------------------------------------------------------------------------
// Step 1: system package
// ---------------------------------------------------------------------------

/// Distinguish a permissions problem from index/network trouble without
/// parsing apt output: apt needs write access to the dpkg lock.
fn classify_apt_failure() -> &'static str {
    match std::fs::OpenOptions::new()
        .write(true)
        .open("/var/lib/dpkg/lock")
    {
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            "insufficient permissions; run as root or under sudo"
        }
        _ => "package index refresh or download failed; check network access",
    }
}

pub fn install_system_package(runner: &dyn CommandRunner, cfg: &Config) -> Result<()> {
    paths::validate_package_name(&cfg.system.package)?;

    tracing::info!(package = %cfg.system.package, "installing system package");

    for spec in package_commands(cfg) {
        let outcome = match runner.run(&spec) {
            Ok(status) if status.success => continue,
            Ok(status) => format!(
                "'{spec}' exited with code {} ({})",
                status.code.map_or_else(|| "signal".into(), |c| c.to_string()),
                classify_apt_failure()
            ),
            Err(e) => format!("'{spec}' could not be spawned: {e}"),
        };

        return match cfg.system.policy {
            InstallPolicy::Fatal => Err(LauncherError::PackageInstall {
                package: cfg.system.package.clone(),
                detail: outcome,
            }),
            InstallPolicy::Warn => {
                tracing::warn!(
                    package = %cfg.system.package,
                    "{outcome}; continuing, but audio conversion will fail \
                     until the package is installed"
                );
                Ok(())
            }
        };
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Step 2: Python dependencies
// ---------------------------------------------------------------------------

pub fn install_python_deps(runner: &dyn CommandRunner, cfg: &Config, root: &Path) -> Result<()> {
    let manifest = paths::manifest_path(root, &cfg.deps.manifest);
    if !manifest.exists() {
        return Err(LauncherError::ManifestNotFound(manifest));
    }

    // Prefer pip3 when both are present; fall back to pip3 blindly so the
    // spawn error surfaces the missing tool.
    let pip = detect_pip().unwrap_or(PipFlavor::Pip3);
    let spec = deps_command(cfg, pip).with_cwd(root);

    tracing::info!(manifest = %cfg.deps.manifest, pip = pip.program(), "installing Python dependencies");

    let status = runner.run(&spec)?;
    if !status.success {
        return Err(LauncherError::DepsInstall {
            manifest: cfg.deps.manifest.clone(),
            detail: format!(
                "'{spec}' exited with code {}",
                status.code.map_or_else(|| "signal".into(), |c| c.to_string())
            ),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Step 3: scratch directory
// ---------------------------------------------------------------------------

pub fn prepare_scratch_dir(cfg: &Config, root: &Path) -> Result<()> {
    let dir = paths::scratch_dir(root, &cfg.scratch_dir);
    io::ensure_dir(&dir).map_err(|e| LauncherError::ScratchDir {
        path: dir.clone(),
        detail: e.to_string(),
    })?;
    tracing::info!(dir = %dir.display(), "scratch directory ready");
    Ok(())
}

// ---------------------------------------------------------------------------
// Step 4: server handoff
// ---------------------------------------------------------------------------

/// Launch the server and block until it exits. Issues exactly one terminal
/// invocation; the returned status is the server's own exit status.
pub fn launch_server(runner: &dyn CommandRunner, cfg: &Config, root: &Path) -> Result<RunStatus> {
    let script = paths::app_script_path(root, &cfg.server.app_script);
    if !script.exists() {
        return Err(LauncherError::AppScriptNotFound(script));
    }

    if !cfg.server.enable_cors || !cfg.server.enable_xsrf_protection {
        tracing::warn!(
            "CORS and/or XSRF protection is disabled; do not expose this \
             port publicly"
        );
    }

    let spec = server_command(cfg).with_cwd(root);
    tracing::info!(port = cfg.server.port, "handing off to {spec}");
    runner.run(&spec)
}

// ---------------------------------------------------------------------------
// Full sequence
// ---------------------------------------------------------------------------

/// Run steps 1–4 in order. Returns the server's exit status on a completed
/// handoff; any earlier fatal failure short-circuits and later steps are
/// never attempted.
pub fn run(
    runner: &dyn CommandRunner,
    cfg: &Config,
    root: &Path,
    opts: &BootstrapOptions,
) -> Result<RunStatus> {
    if opts.skip_system {
        tracing::info!("skipping system package step");
    } else {
        install_system_package(runner, cfg)?;
    }
    install_python_deps(runner, cfg, root)?;
    prepare_scratch_dir(cfg, root)?;
    launch_server(runner, cfg, root)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// Records every invocation and replays scripted statuses per program.
    struct FakeRunner {
        calls: RefCell<Vec<CommandSpec>>,
        fail_programs: Vec<&'static str>,
    }

    impl FakeRunner {
        fn new() -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                fail_programs: Vec::new(),
            }
        }

        fn failing(programs: &[&'static str]) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                fail_programs: programs.to_vec(),
            }
        }

        fn calls(&self) -> Vec<CommandSpec> {
            self.calls.borrow().clone()
        }

        fn programs_called(&self) -> Vec<String> {
            self.calls().iter().map(|c| c.program.clone()).collect()
        }
    }

    impl CommandRunner for FakeRunner {
        fn run(&self, spec: &CommandSpec) -> Result<RunStatus> {
            self.calls.borrow_mut().push(spec.clone());
            if self.fail_programs.contains(&spec.program.as_str()) {
                Ok(RunStatus::failed(100))
            } else {
                Ok(RunStatus::ok())
            }
        }
    }

    /// A project root with the files the happy path expects.
    fn project_root() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("requirements.txt"), "streamlit\nyt-dlp\n").unwrap();
        std::fs::write(dir.path().join("app.py"), "# web ui\n").unwrap();
        dir
    }

    fn test_config() -> Config {
        Config::new("yt2mp3")
    }

    #[test]
    fn happy_path_runs_all_steps_in_order() {
        let dir = project_root();
        let cfg = test_config();
        let runner = FakeRunner::new();

        let status = run(&runner, &cfg, dir.path(), &BootstrapOptions::default()).unwrap();
        assert!(status.success);

        let programs = runner.programs_called();
        let pip = detect_pip().unwrap_or(PipFlavor::Pip3).program();
        assert_eq!(programs, vec!["apt-get", "apt-get", pip, "streamlit"]);
        assert!(dir.path().join("temp_audio_batches").is_dir());
    }

    #[test]
    fn server_invocation_is_the_single_terminal_command() {
        let dir = project_root();
        let cfg = test_config();
        let runner = FakeRunner::new();

        run(&runner, &cfg, dir.path(), &BootstrapOptions::default()).unwrap();

        let calls = runner.calls();
        let server_calls: Vec<_> = calls.iter().filter(|c| c.program == "streamlit").collect();
        assert_eq!(server_calls.len(), 1);
        assert_eq!(calls.last().unwrap().program, "streamlit");
    }

    #[test]
    fn server_args_match_the_documented_contract() {
        let cfg = test_config();
        let spec = server_command(&cfg);
        assert_eq!(spec.program, "streamlit");
        assert_eq!(
            spec.args,
            vec![
                "run",
                "app.py",
                "--server.port",
                "9000",
                "--server.headless",
                "true",
                "--server.enableCORS",
                "false",
                "--server.enableXsrfProtection",
                "false",
            ]
        );
    }

    #[test]
    fn server_args_identical_across_policies() {
        let mut fatal = test_config();
        fatal.system.policy = InstallPolicy::Fatal;
        let mut warn = test_config();
        warn.system.policy = InstallPolicy::Warn;
        assert_eq!(server_command(&fatal), server_command(&warn));
    }

    #[test]
    fn deps_failure_is_fatal_and_server_never_starts() {
        let dir = project_root();
        let cfg = test_config();
        let pip = detect_pip().unwrap_or(PipFlavor::Pip3).program();
        let runner = FakeRunner::failing(&[pip]);

        let err = run(&runner, &cfg, dir.path(), &BootstrapOptions::default()).unwrap_err();
        assert!(matches!(err, LauncherError::DepsInstall { .. }));
        assert!(!runner.programs_called().contains(&"streamlit".to_string()));
    }

    #[test]
    fn fatal_policy_stops_before_deps() {
        let dir = project_root();
        let mut cfg = test_config();
        cfg.system.policy = InstallPolicy::Fatal;
        let runner = FakeRunner::failing(&["apt-get"]);

        let err = run(&runner, &cfg, dir.path(), &BootstrapOptions::default()).unwrap_err();
        assert!(matches!(err, LauncherError::PackageInstall { .. }));
        // Only the first apt-get invocation happened; nothing after it.
        assert_eq!(runner.programs_called(), vec!["apt-get"]);
    }

    #[test]
    fn warn_policy_continues_to_deps_and_server() {
        let dir = project_root();
        let mut cfg = test_config();
        cfg.system.policy = InstallPolicy::Warn;
        let runner = FakeRunner::failing(&["apt-get"]);

        let status = run(&runner, &cfg, dir.path(), &BootstrapOptions::default()).unwrap();
        assert!(status.success);
        let programs = runner.programs_called();
        assert!(programs.contains(&"streamlit".to_string()));
        // The failing update is the only apt-get call; install is not retried.
        assert_eq!(programs.iter().filter(|p| *p == "apt-get").count(), 1);
    }

    #[test]
    fn missing_manifest_fails_before_any_pip_call() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("app.py"), "# web ui\n").unwrap();
        let cfg = test_config();
        let runner = FakeRunner::new();

        let opts = BootstrapOptions { skip_system: true };
        let err = run(&runner, &cfg, dir.path(), &opts).unwrap_err();
        assert!(matches!(err, LauncherError::ManifestNotFound(_)));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn missing_app_script_fails_the_handoff() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("requirements.txt"), "streamlit\n").unwrap();
        let cfg = test_config();
        let runner = FakeRunner::new();

        let opts = BootstrapOptions { skip_system: true };
        let err = run(&runner, &cfg, dir.path(), &opts).unwrap_err();
        assert!(matches!(err, LauncherError::AppScriptNotFound(_)));
        assert!(!runner.programs_called().contains(&"streamlit".to_string()));
    }

    #[test]
    fn skip_system_omits_package_manager_calls() {
        let dir = project_root();
        let cfg = test_config();
        let runner = FakeRunner::new();

        let opts = BootstrapOptions { skip_system: true };
        run(&runner, &cfg, dir.path(), &opts).unwrap();
        assert!(!runner.programs_called().contains(&"apt-get".to_string()));
    }

    #[test]
    fn no_cache_flag_follows_config() {
        let mut cfg = test_config();
        assert!(deps_command(&cfg, PipFlavor::Pip3)
            .args
            .contains(&"--no-cache-dir".to_string()));

        cfg.deps.no_cache = false;
        assert!(!deps_command(&cfg, PipFlavor::Pip)
            .args
            .contains(&"--no-cache-dir".to_string()));
    }

    #[test]
    fn plan_lists_commands_in_bootstrap_order() {
        let cfg = test_config();
        let cmds = plan(&cfg, &BootstrapOptions::default());
        assert_eq!(cmds.len(), 4);
        assert_eq!(cmds[0].to_string(), "apt-get update");
        assert_eq!(cmds[1].to_string(), "apt-get install -y ffmpeg");
        assert!(cmds[2].to_string().contains("install -r requirements.txt --no-cache-dir"));
        assert!(cmds[3].to_string().starts_with("streamlit run app.py"));
    }

    #[test]
    fn plan_respects_skip_system() {
        let cfg = test_config();
        let opts = BootstrapOptions { skip_system: true };
        let cmds = plan(&cfg, &opts);
        assert_eq!(cmds.len(), 2);
        assert!(cmds.iter().all(|c| c.program != "apt-get"));
    }

    #[test]
    fn invalid_package_name_rejected_before_spawning() {
        let mut cfg = test_config();
        cfg.system.package = "ffmpeg; rm -rf /".into();
        let runner = FakeRunner::new();
        let err = install_system_package(&runner, &cfg).unwrap_err();
        assert!(matches!(err, LauncherError::InvalidPackageName(_)));
        assert!(runner.calls().is_empty());
    }
}
