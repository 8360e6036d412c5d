use crate::output::print_json;
use anyhow::anyhow;
use clap::Subcommand;
use std::path::Path;
use yt2mp3_core::config::{Config, WarnLevel};

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Check the configuration for problems
    Validate,
    /// Print the effective configuration
    Show,
}

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    let cfg = Config::load(root).map_err(|e| anyhow!("{e}"))?;

    match subcmd {
        ConfigSubcommand::Validate => validate(&cfg, json),
        ConfigSubcommand::Show => show(&cfg, json),
    }
}

fn validate(cfg: &Config, json: bool) -> anyhow::Result<()> {
    let warnings = cfg.validate();

    if json {
        print_json(&warnings)?;
    } else if warnings.is_empty() {
        println!("Configuration OK.");
    } else {
        for w in &warnings {
            let tag = match w.level {
                WarnLevel::Error => "error",
                WarnLevel::Warning => "warning",
            };
            println!("{tag}: {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        return Err(anyhow!("configuration has errors"));
    }
    Ok(())
}

fn show(cfg: &Config, json: bool) -> anyhow::Result<()> {
    if json {
        print_json(cfg)?;
    } else {
        print!("{}", serde_yaml::to_string(cfg)?);
    }
    Ok(())
}
