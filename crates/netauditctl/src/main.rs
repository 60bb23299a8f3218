//! netaudit command line tool.
//!
//! Validates playbooks, lists reachable networks, runs audits, and exports
//! device inventories.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use netaudit_core::engine::Executor;
use netaudit_core::playbook::load_playbook;
use netaudit_core::report::{write_device_inventory, ReportBuilder};
use netaudit_core::topology::{NetworkRecord, TopologyCache};
use netaudit_core::{AuditConfig, HttpDashboardClient, ProgressObserver};

#[derive(Parser)]
#[command(name = "netaudit")]
#[command(version, about = "Dashboard API audit playbook runner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and validate a playbook without touching the network
    Validate {
        /// Path to the playbook YAML file
        playbook: PathBuf,
    },

    /// List every network reachable with the configured API key
    Networks,

    /// Run a playbook and write a report
    Run {
        /// Path to the playbook YAML file
        playbook: PathBuf,

        /// Network names to audit (repeatable)
        #[arg(short, long = "network", value_name = "NAME")]
        networks: Vec<String>,

        /// Audit every reachable network
        #[arg(long, conflicts_with = "networks")]
        all_networks: bool,

        /// Report directory name (defaults to the playbook name)
        #[arg(long)]
        report_name: Option<String>,
    },

    /// Export a device inventory CSV for the selected networks
    Inventory {
        /// Network names to include (repeatable)
        #[arg(short, long = "network", value_name = "NAME")]
        networks: Vec<String>,

        /// Include every reachable network
        #[arg(long, conflicts_with = "networks")]
        all_networks: bool,
    },
}

/// Observer that mirrors engine progress into the log stream.
struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_progress(&self, percent: f64) {
        tracing::info!("Progress: {:.0}%", percent);
    }

    fn on_status(&self, status: &str) {
        tracing::info!("{}", status);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { playbook } => validate(&playbook),
        Commands::Networks => networks().await,
        Commands::Run {
            playbook,
            networks,
            all_networks,
            report_name,
        } => run(&playbook, networks, all_networks, report_name).await,
        Commands::Inventory {
            networks,
            all_networks,
        } => inventory(networks, all_networks).await,
    }
}

fn validate(path: &PathBuf) -> Result<()> {
    let playbook = load_playbook(path)
        .with_context(|| format!("Failed to load playbook {}", path.display()))?;

    // Resolving endpoints here surfaces unknown capability paths before any
    // run is attempted.
    netaudit_core::client::registry::resolve_playbook(&playbook)?;

    println!("{}: valid ({} steps)", playbook.name(), playbook.api_calls.len());
    Ok(())
}

async fn networks() -> Result<()> {
    let client = connect().await?;
    let networks = client.load_networks().await?;

    if networks.is_empty() {
        println!("No networks visible to this API key");
        return Ok(());
    }

    for network in &networks {
        println!("{}\t{}", network.id, network.name);
    }
    Ok(())
}

async fn run(
    path: &PathBuf,
    selected: Vec<String>,
    all_networks: bool,
    report_name: Option<String>,
) -> Result<()> {
    let playbook = load_playbook(path)
        .with_context(|| format!("Failed to load playbook {}", path.display()))?;

    let config = AuditConfig::from_env().context("Failed to load configuration")?;
    let client = connect_with(&config).await?;
    let networks = select_networks(&client, selected, all_networks).await?;

    let observer = LogProgress;
    let mut cache = TopologyCache::new();
    let run = Executor::new(&client)
        .with_observer(&observer)
        .execute(&playbook, &networks, &mut cache)
        .await?;

    let report_name = report_name.unwrap_or_else(|| playbook.name().to_string());
    let report_dir = ReportBuilder::new(&config.reports_root).build(&run, &report_name)?;

    println!("Report written to {}", report_dir.display());
    Ok(())
}

async fn inventory(selected: Vec<String>, all_networks: bool) -> Result<()> {
    let config = AuditConfig::from_env().context("Failed to load configuration")?;
    let client = connect_with(&config).await?;
    let networks = select_networks(&client, selected, all_networks).await?;

    let mut cache = TopologyCache::new();
    for network in &networks {
        if let Err(e) = cache.ensure_devices(&client, network).await {
            tracing::warn!(network = %network.name, error = %e, "Device discovery failed");
        }
    }

    let path = write_device_inventory(&networks, &cache, Path::new(&config.reports_root))?;
    println!("Inventory written to {}", path.display());
    Ok(())
}

async fn connect() -> Result<HttpDashboardClient> {
    let config = AuditConfig::from_env().context("Failed to load configuration")?;
    connect_with(&config).await
}

/// Build the live client and verify the key before doing anything else.
async fn connect_with(config: &AuditConfig) -> Result<HttpDashboardClient> {
    let client = HttpDashboardClient::new(config)?;
    if !client.verify_key().await? {
        bail!("Dashboard rejected the configured API key");
    }
    Ok(client)
}

/// Resolve the user's network selection against what the key can see.
async fn select_networks(
    client: &HttpDashboardClient,
    selected: Vec<String>,
    all_networks: bool,
) -> Result<Vec<NetworkRecord>> {
    if selected.is_empty() && !all_networks {
        bail!("Select networks with --network or pass --all-networks");
    }

    let available = client.load_networks().await?;
    if all_networks {
        if available.is_empty() {
            bail!("No networks visible to this API key");
        }
        return Ok(available);
    }

    let networks: Vec<NetworkRecord> = available
        .into_iter()
        .filter(|n| selected.iter().any(|s| s == &n.name))
        .collect();

    let found: Vec<&str> = networks.iter().map(|n| n.name.as_str()).collect();
    for name in &selected {
        if !found.contains(&name.as_str()) {
            tracing::warn!(network = %name, "Requested network not found; skipping");
        }
    }

    if networks.is_empty() {
        bail!("None of the requested networks were found");
    }
    Ok(networks)
}
