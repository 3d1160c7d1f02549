//! COVID-19 Dashboard Server
//!
//! Run with: cargo run -- [--config PATH] [--data-file PATH] [--debug]
//!
//! # Configuration
//!
//! Settings come from the config file (see `--print-config`), then
//! environment variables, then command-line flags:
//! - `COVID_DASHBOARD_DATA_URL`: Dataset URL
//! - `COVID_DASHBOARD_DATA_FILE`: Local CSV instead of the URL
//! - `COVID_DASHBOARD_HOST` / `COVID_DASHBOARD_PORT`: Bind address
//! - `COVID_DASHBOARD_LOG_LEVEL` / `COVID_DASHBOARD_LOG_FORMAT`: Logging
//! - `RUST_LOG`: Overrides the log filter entirely

use anyhow::Context;
use clap::Parser;
use covid_dashboard::api::{serve, AppState};
use covid_dashboard::config::{generate_default_config, Config, LoggingConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "covid-dashboard")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "COVID-19 interactive dashboard server")]
struct Cli {
    /// Config file (default: search standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Load the dataset from a local CSV instead of the network
    #[arg(long)]
    data_file: Option<PathBuf>,

    /// Verbose logging
    #[arg(long)]
    debug: bool,

    /// Print a default config file and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", generate_default_config());
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load_default(),
    };

    if let Some(host) = cli.host {
        config.api.host = host;
    }
    if let Some(port) = cli.port {
        config.api.port = port;
    }
    if let Some(file) = cli.data_file {
        config.dataset.file = Some(file);
    }
    if cli.debug {
        config.logging.level = "debug".to_string();
    }

    init_tracing(&config.logging);

    tracing::info!("Starting COVID-19 dashboard v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(countries = ?config.dataset.countries, "Country whitelist");

    // No dashboard without data: any load failure aborts startup
    let dataset = covid_dashboard::dataset::load(&config.dataset)
        .await
        .context("failed to load COVID-19 dataset")?;

    if let Some((min, max)) = dataset.date_bounds() {
        tracing::info!(rows = dataset.len(), from = %min, to = %max, "Dataset loaded");
    }

    let state = AppState::new(Arc::new(dataset), config.api.clone());
    serve(state, &config.api).await?;

    tracing::info!("COVID-19 dashboard stopped");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "covid_dashboard={level},tower_http={level}",
            level = logging.level
        )
        .into()
    });

    let registry = tracing_subscriber::registry().with(filter);

    if logging.format.eq_ignore_ascii_case("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
