//! tap-redash: Singer tap for a single Redash query
//!
//! Usage:
//!   # Print the catalog for the configured query
//!   tap-redash --config config.json --discover
//!
//!   # Emit SCHEMA + RECORD messages, inferring the schema
//!   tap-redash --config config.json
//!
//!   # Emit using a catalog from a previous discovery run
//!   tap-redash --config config.json --properties catalog.json
//!
//! Logs go to stderr; set RUST_LOG to change the level (default: warn).

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{stdout, BufWriter};
use std::path::PathBuf;
use tap_redash::{run, Mode, RedashClient, SuppliedCatalog, TapConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tap-redash")]
#[command(about = "Singer tap for a single Redash query", long_about = None)]
struct Args {
    /// Config file with BASE_URL, API_KEY and QUERY_ID
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// Print the catalog instead of syncing
    #[arg(short, long)]
    discover: bool,

    /// Catalog from a previous discovery run
    #[arg(short, long, value_name = "FILE")]
    properties: Option<PathBuf>,

    /// Same as --properties
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// State file; accepted for compatibility, always ignored
    #[arg(short, long, value_name = "FILE")]
    state: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    let config = TapConfig::load(&args.config)
        .with_context(|| format!("Failed to load config {}", args.config.display()))?;

    if let Some(state) = &args.state {
        tracing::debug!(path = %state.display(), "ignoring state file; every run is a full sync");
    }

    let mode = if args.discover {
        Mode::Discover
    } else {
        Mode::Sync(SuppliedCatalog::load(args.properties.or(args.catalog)))
    };

    let client = RedashClient::new(&config).context("Failed to create HTTP client")?;

    let stdout = stdout();
    run(&config, &client, mode, BufWriter::new(stdout.lock()))?;

    Ok(())
}
