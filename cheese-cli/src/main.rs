use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod catalog;
mod commands;
mod prompter;

#[derive(Parser)]
#[command(name = "cheese", about = "Take a snapshot every time you commit")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Plugin configuration file (defaults to ~/.config/cheese/plugins.toml)
    #[arg(long, global = true, env = "CHEESE_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture a snapshot for a commit
    Capture(commands::capture::CaptureArgs),
    /// Manage plugins
    Plugin(commands::plugin::PluginArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let host_config = catalog::host_config(cli.config);

    match cli.command {
        Commands::Capture(args) => commands::capture::run(args, host_config),
        Commands::Plugin(args) => commands::plugin::run(args, host_config),
    }
}
