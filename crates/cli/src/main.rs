//! Group throttle CLI - gt command

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cmd;
mod script;
mod util;

/// gt - coalesce keyed updates into delayed batches
#[derive(Parser)]
#[command(name = "gt")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read add/remove/flush commands from stdin and print each batch as JSON
    Run {
        /// Quiescence window in milliseconds (overrides config file)
        #[arg(long)]
        delay_ms: Option<u64>,
        /// TOML config file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Deliver batches on a Tokio runtime instead of threads
        #[arg(long)]
        tokio: bool,
        /// Flush pending items at end of input instead of dropping them
        #[arg(long)]
        flush_on_exit: bool,
    },
    /// Print the effective configuration
    Config {
        /// Quiescence window in milliseconds (overrides config file)
        #[arg(long)]
        delay_ms: Option<u64>,
        /// TOML config file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Deliver batches on a Tokio runtime instead of threads
        #[arg(long)]
        tokio: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Stdout carries batches only
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { delay_ms, config, tokio: use_tokio, flush_on_exit } => {
            let config = util::resolve_config(config.as_deref(), delay_ms, use_tokio)?;
            tokio::task::spawn_blocking(move || cmd::run::run(&config, flush_on_exit)).await?
        }
        Commands::Config { delay_ms, config, tokio: use_tokio } => {
            let config = util::resolve_config(config.as_deref(), delay_ms, use_tokio)?;
            cmd::config::run(&config)
        }
    }
}
