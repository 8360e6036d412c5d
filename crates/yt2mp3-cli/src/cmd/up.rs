use anyhow::{anyhow, Context};
use std::path::Path;
use yt2mp3_core::bootstrap::{self, BootstrapOptions};
use yt2mp3_core::config::Config;
use yt2mp3_core::registry::{self, LaunchRecord};
use yt2mp3_core::runner::SystemRunner;

pub fn run(root: &Path, dry_run: bool, skip_system: bool) -> anyhow::Result<()> {
    let cfg = Config::load(root).map_err(|e| anyhow!("{e}"))?;
    let opts = BootstrapOptions { skip_system };

    if dry_run {
        println!("Planned bootstrap sequence for '{}':", cfg.project.name);
        for spec in bootstrap::plan(&cfg, &opts) {
            println!("  {spec}");
        }
        println!("  (scratch dir: {}/)", cfg.scratch_dir);
        return Ok(());
    }

    let name = cfg.project.name.clone();

    // Prune stale records; refuse to double-launch.
    if let Some(record) = registry::find_by_name(&name).map_err(|e| anyhow!("{e}"))? {
        if registry::is_pid_alive(record.pid) {
            return Err(anyhow!(
                "'{}' is already running at {} (PID {})\n\
                 Run `yt2mp3 kill {}` to stop it first.",
                name,
                record.url,
                record.pid,
                name
            ));
        }
        // Stale record — remove silently.
        let _ = record.remove();
    }

    let record = LaunchRecord {
        project: name.clone(),
        root: root.to_path_buf(),
        pid: std::process::id(),
        port: cfg.server.port,
        url: format!("http://localhost:{}", cfg.server.port),
        started_at: chrono::Utc::now(),
    };
    record.write().map_err(|e| anyhow!("{e}"))?;

    println!("yt2mp3 '{name}' → {}  (PID {})", record.url, record.pid);

    let result = bootstrap::run(&SystemRunner, &cfg, root, &opts);
    let _ = record.remove();

    let status = result.context("bootstrap failed")?;
    if !status.success {
        return Err(anyhow!(
            "server exited with code {}",
            status.code.map_or_else(|| "signal".into(), |c| c.to_string())
        ));
    }
    Ok(())
}
