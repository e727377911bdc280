//! Capgate CLI - HTTP gateway in front of local AI backends.
//!
//! Capgate exposes image classification, text generation, an agent and OCR
//! behind a handful of multipart endpoints under `/api/ai`.
//!
//! # Usage
//!
//! ```bash
//! # Start the gateway on the configured address
//! capgate serve
//!
//! # Override the port and use a specific config file
//! capgate --config ./capgate.toml serve --port 8080
//!
//! # See which backends are reachable
//! capgate check
//!
//! # View configuration
//! capgate config show
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod cli;
mod logging;
mod server;

/// Capgate - HTTP gateway for AI capability dispatch.
#[derive(Parser, Debug)]
#[command(name = "capgate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "CAPGATE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway
    Serve(cli::serve::ServeArgs),

    /// Report which AI backends are available
    Check,

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = cli::load_config(cli.config.as_deref())?;
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Capgate v{}", capgate_core::VERSION);

    match cli.command {
        Commands::Serve(args) => cli::serve::execute(config, args).await,
        Commands::Check => cli::check::execute(&config).await,
        Commands::Config(args) => cli::config::execute(cli.config.as_deref(), args).await,
    }
}
