use anyhow::Context;
use buildvault::{clock, web, Config, RecordStore, Sweeper};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Initialize logging (RUST_LOG overrides, INFO by default)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        error!("BuildVault failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    info!("BuildVault starting...");

    let config = Config::from_env().context("Failed to load configuration")?;
    info!("Data file: {}", config.data_file.display());
    info!("Record lifetime: {}", clock::humanize(config.record_lifetime));
    info!("Cleanup interval: {}", clock::humanize(config.sweep_interval));

    let store = Arc::new(RecordStore::new(&config));
    store
        .ensure_file()
        .await
        .context("Failed to initialize data file")?;

    // Shared with the web server; the first tick also cleans up at startup
    let sweeper = Sweeper::start(store.clone());

    let addr = config.bind_addr();
    let served = web::run_web_server(&addr, store, shutdown_signal()).await;

    sweeper.shutdown().await;
    served.map_err(|e| anyhow::anyhow!("Web server error on {}: {}", addr, e))?;

    info!("BuildVault stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
