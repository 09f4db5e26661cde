//! Reconciliation worker
//!
//! Loads `mailauth.toml` (or the path given as first argument / `MAILAUTH_CONFIG`),
//! builds the application state and runs the reconciliation scheduler until Ctrl-C.

use std::process::ExitCode;
use std::sync::Arc;

use mailauth_app::adapters::{EnvelopeDecryptor, InMemoryStore};
use mailauth_app::{AppConfig, AppStateBuilder};
use mailauth_core::error::CoreResult;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_CONFIG_PATH: &str = "mailauth.toml";

fn config_path() -> String {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var("MAILAUTH_CONFIG").ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .with(filter)
        .init();
}

async fn run(config: AppConfig) -> CoreResult<()> {
    let decryptor = EnvelopeDecryptor::from_env(&config.secrets.master_key_env)?;
    let store = Arc::new(InMemoryStore::new());

    let state = AppStateBuilder::from_config(&config, &decryptor)?
        .domain_repository(store.clone())
        .sender_repository(store)
        .build()?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = Arc::clone(&state.reconciliation_job).spawn(shutdown_rx);
    tracing::info!(
        "Reconciliation scheduler running every {}s",
        config.reconcile.interval_secs
    );

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {e}");
    }
    tracing::info!("Shutting down");
    let _ = shutdown_tx.send(true);
    if let Err(e) = scheduler.await {
        tracing::error!("Scheduler task ended abnormally: {e}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let path = config_path();
    let config = match AppConfig::load(&path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config.log.level);
    tracing::info!("Starting mailauth worker with {path}");

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Worker failed: {e}");
            ExitCode::FAILURE
        }
    }
}
