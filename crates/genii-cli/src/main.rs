//! Operator CLI for the Genii trust ledger
//!
//! Offline verification of exported entries, canonical encoding of payloads,
//! and inspection of the configured capability registry.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use genii_cli::commands::{encode, registry, verify};
use genii_ledger::LedgerConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "genii-ledger")]
#[command(about = "Genii - Triple-Entry Trust Ledger tooling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path
    #[arg(short, long, global = true, default_value = "genii-ledger.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify newline-delimited entry records
    Verify {
        /// NDJSON file of exported entries
        entries: PathBuf,
    },

    /// Print the canonical encoding and digest of a payload
    Encode {
        /// JSON object file
        payload: PathBuf,
    },

    /// Show agents, grants and auditor assignments
    Registry {
        /// Emit the snapshot as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Verify { entries } => {
            let config = LedgerConfig::load_from_file(&cli.config)?;
            let file = File::open(&entries)
                .with_context(|| format!("failed to open {}", entries.display()))?;
            let summary = verify::run(&config, BufReader::new(file), &mut out)?;
            if !summary.all_passed() {
                return Ok(ExitCode::FAILURE);
            }
        }

        Commands::Encode { payload } => {
            encode::run(&payload, &mut out)?;
        }

        Commands::Registry { json } => {
            let config = LedgerConfig::load_from_file(&cli.config)?;
            registry::run(&config, json, &mut out)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
