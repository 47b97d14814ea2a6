use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inventario::cli::{self, Cli};
use inventario::config::Config;
use inventario::{Inventory, Store};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration. `config check` reports parse errors itself.
    let mut config = if cli.needs_store() {
        Config::load(&cli.config)?
    } else {
        Config::default()
    };
    if let Some(path) = &cli.database {
        config.database.path = path.clone();
    }

    // Initialize logging. Stdout is reserved for command output.
    let log_level = cli
        .log_level
        .as_ref()
        .unwrap_or(&config.logging.level)
        .clone();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Starting Inventario v{}", env!("CARGO_PKG_VERSION"));

    if !cli.needs_store() {
        return cli::run_offline(&cli);
    }

    let store = Store::open(&config.database.path, config.database.max_connections)
        .await
        .with_context(|| {
            format!(
                "Failed to open database at {}",
                config.database.path.display()
            )
        })?;

    let inventory = Inventory::new(store.clone(), config.rules);

    let failed = inventory.ensure_schema().await;
    if !failed.is_empty() {
        tracing::warn!(
            tables = ?failed,
            "Some tables are unavailable; features depending on them will fail"
        );
    }

    let result = cli::run_command(&cli, &inventory).await;
    if let Err(err) = &result {
        cli::report_error(err);
    }

    store.close().await;
    result
}
