//! ratchetctl - inspect and maintain a ratchet record store.
//!
//! Opens the store described by the configuration (or `--path`), runs one
//! command and closes it again. Binary key material is printed as hex.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ratchet_store::ProtocolStore;

mod commands;
mod config_bridge;
mod formatter;
mod theme;

use commands::{RecordKind, records, stats, wipe};
use formatter::OutputFormat;
use theme::{Outcome, Theme};

/// ratchetctl - ratchet record store maintenance
#[derive(Parser)]
#[command(name = "ratchetctl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, env = "RATCHET_CONFIG")]
    config: Option<PathBuf>,

    /// Store directory; overrides the configured backend
    #[arg(short, long, global = true)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format: pretty (default) or json
    #[arg(long, global = true, default_value = "pretty")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show record counts per kind
    Stats,

    /// List every record of a kind
    List {
        /// Record kind
        kind: RecordKind,
    },

    /// Show one record
    Get {
        /// Record kind
        kind: RecordKind,
        /// Record id
        id: String,
    },

    /// Remove one record
    Remove {
        /// Record kind
        kind: RecordKind,
        /// Record id
        id: String,
    },

    /// Remove every record of a kind
    Clear {
        /// Record kind
        kind: RecordKind,
    },

    /// Remove every entry in the store, all kinds included
    Wipe {
        /// Confirm the wipe
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run(Cli::parse()).await {
        eprintln!("{}", Theme::outcome(Outcome::Failed, &format!("{e:#}")));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let resolved = ratchet_config::Config::load(cli.config.as_deref())
        .context("failed to load configuration")?;
    let config = resolved.config;

    let log_config = config_bridge::to_log_config(&config, cli.verbose);
    if let Err(e) = ratchet_telemetry::setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }
    for file in &resolved.loaded_files {
        tracing::debug!(path = %file, "using config file");
    }

    let options = config_bridge::to_open_options(&config, cli.path.as_deref());
    let store = ProtocolStore::open(&options).context("failed to open record store")?;
    let format = OutputFormat::from_flag(&cli.format);

    let result = dispatch(&store, cli.command, format).await;
    store.close().await?;
    result
}

async fn dispatch(store: &ProtocolStore, command: Commands, format: OutputFormat) -> Result<()> {
    match command {
        Commands::Stats => stats::run(store, format).await,
        Commands::List { kind } => records::list(store, kind, format).await,
        Commands::Get { kind, id } => records::get(store, kind, &id, format).await,
        Commands::Remove { kind, id } => records::remove(store, kind, &id).await,
        Commands::Clear { kind } => records::clear(store, kind).await,
        Commands::Wipe { yes } => wipe::run(store, yes).await,
    }
}
