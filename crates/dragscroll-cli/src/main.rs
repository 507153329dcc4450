use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dragscroll_core::AppConfig;

mod commands;

use commands::simulate::SimulateArgs;

#[derive(Parser)]
#[command(name = "dragscroll")]
#[command(author, version, about = "Edge-proximity autoscroll for drag and drop")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file (defaults to ~/.config/dragscroll/config.toml)
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the drag-to-reorder demo
    Run,
    /// Replay a drag against an in-memory page and report the scrolling
    Simulate(SimulateArgs),
    /// Print the effective configuration
    Config {
        /// Write it to the configuration file instead
        #[arg(long)]
        write: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.clone().unwrap_or_else(AppConfig::config_path);
    let config = AppConfig::load_from(&config_path)?;

    // Initialize logging; stderr keeps stdout free for traces and JSON
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    tracing::debug!(path = %config_path.display(), "Configuration loaded");

    match cli.command {
        Some(Commands::Run) | None => commands::run::run(&config).await,
        Some(Commands::Simulate(args)) => commands::simulate::run(&config, &args),
        Some(Commands::Config { write }) => commands::config::run(&config, &config_path, write),
    }
}
