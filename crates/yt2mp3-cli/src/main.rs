mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "yt2mp3",
    about = "Bootstrap launcher for the YouTube to MP3 converter web UI",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from yt2mp3.yaml or .git/)
    #[arg(long, global = true, env = "YT2MP3_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold yt2mp3.yaml, the scratch directory, and a gitignore entry
    Init,

    /// Run the bootstrap sequence and hand off to the web UI server
    Up {
        /// Print the planned commands without executing anything
        #[arg(long)]
        dry_run: bool,

        /// Skip the system package step (ffmpeg already installed)
        #[arg(long)]
        skip_system: bool,
    },

    /// Report which required tools and files are present
    Check,

    /// Inspect or validate the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// List running launcher instances
    Status,

    /// Stop a running launcher instance
    Kill {
        /// Project name (defaults to the current project)
        name: Option<String>,
    },

    /// Remove stale batch directories from the scratch dir
    Clean,
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Up { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root_path = cli.root.as_deref();
    let root = root::resolve_root(root_path);

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Up {
            dry_run,
            skip_system,
        } => cmd::up::run(&root, dry_run, skip_system),
        Commands::Check => cmd::check::run(&root, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
        Commands::Status => cmd::status::run(cli.json),
        Commands::Kill { name } => cmd::status::kill(name.as_deref(), &root),
        Commands::Clean => cmd::clean::run(&root),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
