use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vendor_kernel::{StoreConfig, VendorService, VendorStore};

mod commands;

use commands::{execute, Command};

/// Vending machine record store CLI
#[derive(Parser, Debug)]
#[command(name = "vendor")]
#[command(about = "Vending machine catalog, stock and accounting", long_about = None)]
struct Cli {
    /// Path to store config JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the catalog and ledger records
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Probability in [0, 1] that a dispense jams
    #[arg(long)]
    failure_rate: Option<f64>,

    /// Seed for reproducible dispense failures
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("vendor=info,vendor_kernel=info")),
        )
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    // ----------------------------
    // Load config
    // ----------------------------
    let mut config = match &cli.config {
        Some(path) => StoreConfig::from_json_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => StoreConfig::default(),
    };

    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(rate) = cli.failure_rate {
        config.failure_rate = rate;
    }
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }

    // ----------------------------
    // Open store
    // ----------------------------
    let store = VendorStore::from_config(&config, config.failure_source());
    let mut service = VendorService::with_store(store);

    // ----------------------------
    // Run command
    // ----------------------------
    info!(command = ?cli.command, data_dir = %config.data_dir.display(), "running command");
    let lines = execute(&mut service, &cli.command, &config.currency);
    service.deactivate();

    for line in lines? {
        println!("{line}");
    }

    Ok(())
}
