//! # pharmalife
//!
//! Operator CLI for the PharmaLife local store.
//!
//! ## Usage
//! ```text
//! pharmalife stats
//! pharmalife alerts --json
//! pharmalife export --out /mnt/usb
//! pharmalife restore pharmalife-backup-2024-06-01.json
//! pharmalife reset --yes
//! pharmalife --data-dir /srv/pharmalife branches
//! ```
//!
//! Every command waits for the store to finish loading from the primary
//! backend, and flushes pending writes before exiting.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use pharmalife_core::{AlertKind, StoreStats};
use pharmalife_store::{InitOutcome, LocalStore, StoreConfig};
use serde::Serialize;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

// =============================================================================
// Arguments
// =============================================================================

#[derive(Parser, Debug)]
#[command(name = "pharmalife", about = "Inspect and maintain the PharmaLife local store")]
struct Args {
    /// Path to store.toml (defaults to the platform config directory).
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Overrides the data directory from the config file.
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dashboard statistics.
    Stats,
    /// Licenses that are expired or expire within 30 days.
    Alerts,
    /// List branches.
    Branches,
    /// Write a backup file.
    Export {
        /// Target directory (defaults to the configured backup dir).
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
    /// Replace all data with the contents of a backup file.
    Restore {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Discard all data and reinstall the default dataset.
    Reset {
        /// Confirm the reset.
        #[arg(long)]
        yes: bool,
    },
    /// Check a username and password against the stored users.
    Login {
        username: String,
        #[arg(long, env = "PHARMALIFE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Print the resolved configuration, or write it to the config file.
    Config {
        #[arg(long)]
        write: bool,
    },
}

// =============================================================================
// Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = StoreConfig::load(args.config.clone()).context("loading store config")?;
    if let Some(dir) = args.data_dir.clone() {
        config = config.with_data_dir(dir);
    }

    if let Command::Config { write } = &args.command {
        return show_config(&config, args.config.clone(), *write);
    }

    let store = LocalStore::open_with_config(&config)
        .await
        .with_context(|| format!("opening store in {}", config.storage.data_dir.display()))?;

    match store.wait_for_init().await {
        InitOutcome::Degraded => {
            warn!("Primary database unavailable; changes may only reach the legacy file")
        }
        outcome => info!(?outcome, "Store ready"),
    }

    let result = run(&store, &config, &args).await;
    store.flush().await;

    let persisted = store.persist_stats();
    if persisted.failed_writes > 0 {
        warn!(failed = persisted.failed_writes, "Some changes were not persisted");
    }

    result
}

/// Sets up logging to stderr so stdout stays clean for `--json`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("warn,pharmalife_store=info,pharmalife_cli=info,sqlx=warn")
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::TRACE)
        .with_writer(std::io::stderr)
        .init();
}

// =============================================================================
// Commands
// =============================================================================

async fn run(store: &LocalStore, config: &StoreConfig, args: &Args) -> Result<()> {
    match &args.command {
        Command::Stats => {
            let stats = store.stats();
            if args.json {
                print_json(&stats)
            } else {
                print_stats(&stats);
                Ok(())
            }
        }
        Command::Alerts => {
            let alerts = store.license_alerts();
            if args.json {
                return print_json(&alerts);
            }
            if alerts.is_empty() {
                println!("No license alerts.");
            }
            for alert in &alerts {
                let when = match alert.kind {
                    AlertKind::Expired => format!("expired {} days ago", -alert.days_left),
                    _ => format!("expires in {} days", alert.days_left),
                };
                println!(
                    "{:<8} {} ({}), {}: {}",
                    if alert.kind.is_critical() { "CRITICAL" } else { "notice" },
                    alert.license_name,
                    alert.license_number,
                    alert.branch_name,
                    when
                );
            }
            Ok(())
        }
        Command::Branches => {
            let branches = store.branches().all();
            if args.json {
                return print_json(&branches);
            }
            for branch in &branches {
                println!(
                    "{:<38} {:<24} {:<8} {:>14}",
                    branch.id,
                    branch.name,
                    if branch.status.is_active() { "active" } else { "inactive" },
                    branch.monthly_sales.to_string()
                );
            }
            Ok(())
        }
        Command::Export { out } => {
            let dir = out.clone().unwrap_or_else(|| config.backup_dir());
            let path = store
                .export_backup_to_dir(&dir)
                .await
                .with_context(|| format!("exporting backup to {}", dir.display()))?;
            println!("{}", path.display());
            Ok(())
        }
        Command::Restore { file } => {
            store
                .restore_backup_file(file)
                .await
                .with_context(|| format!("restoring {}", file.display()))?;
            println!("Restored {}", file.display());
            Ok(())
        }
        Command::Reset { yes } => {
            if !yes {
                bail!("reset discards all data; pass --yes to confirm");
            }
            store.reset_to_defaults();
            println!("Store reset to default data");
            Ok(())
        }
        Command::Login { username, password } => match store.authenticate(username, password) {
            Some(user) => {
                println!("{} ({:?})", user.name, user.role);
                Ok(())
            }
            None => bail!("invalid username or password"),
        },
        Command::Config { .. } => Ok(()),
    }
}

fn show_config(config: &StoreConfig, path: Option<PathBuf>, write: bool) -> Result<()> {
    if write {
        config.save(path).context("writing config file")?;
    }

    println!("database: {}", config.database_path().display());
    println!("legacy:   {}", config.legacy_dir().display());
    println!("backups:  {}", config.backup_dir().display());
    Ok(())
}

fn print_stats(stats: &StoreStats) {
    println!("Branches        {} active / {}", stats.active_branches, stats.total_branches);
    println!("Suppliers       {} active / {}", stats.active_suppliers, stats.total_suppliers);
    println!("Employees       {} active", stats.active_employees);
    println!("Monthly sales   {}", stats.total_sales);
    println!("Monthly payroll {}", stats.monthly_payroll);
    println!(
        "Licenses        {} total, {} expiring, {} expired",
        stats.total_licenses, stats.expiring_licenses, stats.expired_licenses
    );
    println!(
        "Products        {} low stock, {} out of stock",
        stats.low_stock_products, stats.out_of_stock_products
    );
    println!("Pending orders  {}", stats.pending_orders);
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
