use anyhow::anyhow;
use std::path::Path;
use yt2mp3_core::config::Config;
use yt2mp3_core::scratch;

pub fn run(root: &Path) -> anyhow::Result<()> {
    let cfg = Config::load(root).map_err(|e| anyhow!("{e}"))?;
    let removed = scratch::clean_stale_batches(&cfg, root).map_err(|e| anyhow!("{e}"))?;

    if removed == 0 {
        println!("No stale batch directories in {}/.", cfg.scratch_dir);
    } else {
        println!(
            "Removed {removed} stale batch director{} from {}/.",
            if removed == 1 { "y" } else { "ies" },
            cfg.scratch_dir
        );
    }
    Ok(())
}
