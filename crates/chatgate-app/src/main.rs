//! chatgate binary - composition root.
//!
//! 1. Parse CLI args and load configuration from TOML
//! 2. Build the shared duplicate filter, thread store and message router
//! 3. Start the optional periodic sweep
//! 4. Serve the axum API on localhost

mod cli;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use chatgate_api::state::AppState;
use chatgate_chat::{MessageRouter, ThreadStore};
use chatgate_core::config::ChatgateConfig;
use chatgate_dedup::SharedFilter;

use cli::CliArgs;

/// Periodically evict expired history for actors that went quiet.
async fn sweep_loop(filter: SharedFilter, interval_secs: u64) {
    tracing::info!(interval_secs, "Sweep loop started");

    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    // The first tick completes immediately; nothing has expired yet.
    interval.tick().await;

    loop {
        interval.tick().await;
        match filter.sweep() {
            Ok(report) if report.entries_removed > 0 || report.actors_removed > 0 => {
                tracing::debug!(
                    entries_removed = report.entries_removed,
                    actors_removed = report.actors_removed,
                    "Swept expired history"
                );
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!(error = %e, "Sweep failed, stopping sweep loop");
                return;
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config is read before tracing starts so its log level can apply.
    let config_file = args.resolve_config_path();
    let (mut config, load_error) = if config_file.exists() {
        match ChatgateConfig::load(&config_file) {
            Ok(c) => (c, None),
            Err(e) => (ChatgateConfig::default(), Some(e)),
        }
    } else {
        (ChatgateConfig::default(), None)
    };

    if let Some(level) = args.resolve_log_level() {
        config.general.log_level = level;
    }
    if let Some(dir) = args.resolve_data_dir() {
        config.general.data_dir = dir;
    }
    config.api.port = args.resolve_port(config.api.port);

    // Tracing. RUST_LOG wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .init();

    tracing::info!("Starting chatgate v{}", env!("CARGO_PKG_VERSION"));
    match load_error {
        Some(e) => tracing::warn!(
            path = %config_file.display(),
            error = %e,
            "Failed to load config, using defaults"
        ),
        None => tracing::info!(path = %config_file.display(), "Configuration loaded"),
    }

    // Thread snapshot lives in the data directory.
    let data_dir = cli::expand_home(&config.general.data_dir);
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        tracing::error!(path = %data_dir.display(), error = %e, "Failed to create data directory");
        return Err(e.into());
    }
    let threads = Arc::new(ThreadStore::open(data_dir.join("threads.json")));

    let filter = SharedFilter::new(config.filter.clone());
    let router = MessageRouter::new(config.router.clone(), filter.clone(), threads);

    if config.api.sweep_interval_secs > 0 {
        tokio::spawn(sweep_loop(filter, config.api.sweep_interval_secs));
    }

    let state = AppState::new(config, router);
    chatgate_api::start_server(state).await?;

    Ok(())
}
