// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Herald - multi-channel notification dispatch service.
//!
//! This is the binary entry point: it loads configuration, initializes
//! logging, and wires the components together.

mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Herald - multi-channel notification dispatch service.
#[derive(Parser, Debug)]
#[command(name = "herald", version, about, long_about = None)]
struct Cli {
    /// Path to a config file (defaults to the XDG hierarchy).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the periodic scheduler until interrupted.
    Serve,
    /// Process due jobs once and exit.
    ProcessNow,
    /// Print delivery analytics and exit.
    Stats,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => herald_config::load_config_from_path(path),
        None => herald_config::load_config(),
    };
    let config = match config {
        Ok(config) => config,
        Err(err) => {
            eprintln!("herald: invalid configuration: {err}");
            std::process::exit(1);
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.service.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match cli.command {
        Some(Commands::Serve) => serve::run(config).await,
        Some(Commands::ProcessNow) => serve::process_now(config).await,
        Some(Commands::Stats) => serve::stats(config).await,
        None => {
            println!("herald: use --help for available commands");
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("herald: {err}");
        std::process::exit(1);
    }
}
