use anyhow::Context;
use std::path::Path;
use yt2mp3_core::{config::Config, io, paths};

pub fn run(root: &Path) -> anyhow::Result<()> {
    let project_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "yt2mp3".to_string());

    println!("Initializing launcher in: {}", root.display());

    // 1. Write yt2mp3.yaml if missing
    let config_path = paths::config_path(root);
    if !config_path.exists() {
        let cfg = Config::new(&project_name);
        cfg.save(root).context("failed to write yt2mp3.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
    } else {
        println!("  exists:  {}", paths::CONFIG_FILE);
    }

    // 2. Create the scratch directory the web UI shares
    let cfg = Config::load(root).context("failed to load config")?;
    let scratch = paths::scratch_dir(root, &cfg.scratch_dir);
    io::ensure_dir(&scratch)
        .with_context(|| format!("failed to create {}", scratch.display()))?;
    println!("  ready:   {}/", cfg.scratch_dir);

    // 3. Keep transient audio out of version control
    io::ensure_gitignore_entry(root, &format!("{}/", cfg.scratch_dir))
        .context("failed to update .gitignore")?;
    println!("  ignored: {}/ (.gitignore)", cfg.scratch_dir);

    Ok(())
}
