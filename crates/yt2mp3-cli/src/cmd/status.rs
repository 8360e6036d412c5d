use crate::output::{print_json, print_table};
use anyhow::anyhow;
use std::path::Path;
use yt2mp3_core::config::Config;
use yt2mp3_core::registry;

pub fn run(json: bool) -> anyhow::Result<()> {
    let mut records = registry::read_all().map_err(|e| anyhow!("{e}"))?;

    // Prune stale records silently.
    records.retain(|r| {
        if registry::is_pid_alive(r.pid) {
            true
        } else {
            let _ = r.remove();
            false
        }
    });

    if json {
        print_json(&records)?;
        return Ok(());
    }

    if records.is_empty() {
        println!("No running launcher instances.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            vec![
                r.project.clone(),
                r.port.to_string(),
                r.pid.to_string(),
                r.url.clone(),
                r.started_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            ]
        })
        .collect();

    print_table(&["PROJECT", "PORT", "PID", "URL", "STARTED"], rows);
    Ok(())
}

pub fn kill(name: Option<&str>, root: &Path) -> anyhow::Result<()> {
    let name = resolve_name(name, root)?;

    let record = registry::find_by_name(&name)
        .map_err(|e| anyhow!("{e}"))?
        .ok_or_else(|| anyhow!("No launch record found for '{name}'"))?;

    if !registry::is_pid_alive(record.pid) {
        let _ = record.remove();
        return Err(anyhow!(
            "'{name}' is not running (stale record removed)"
        ));
    }

    registry::kill_pid(record.pid).map_err(|e| anyhow!("{e}"))?;
    let _ = record.remove();

    println!("Stopped '{name}' (PID {})", record.pid);
    Ok(())
}

fn resolve_name(name: Option<&str>, root: &Path) -> anyhow::Result<String> {
    if let Some(n) = name {
        return Ok(n.to_string());
    }
    let config = Config::load(root).map_err(|e| anyhow!("{e}"))?;
    Ok(config.project.name)
}
