use std::error::Error;

use site_ledger::api::{AppState, create_router};
use site_ledger::config::ConfigLoader;
use site_ledger::ledger::Ledger;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Directory holding `ledger.yaml` when `SITE_LEDGER_CONFIG` is unset.
const DEFAULT_CONFIG_DIR: &str = "config/default";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config_dir =
        std::env::var("SITE_LEDGER_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
    let config = ConfigLoader::load(&config_dir)?.into_config();
    let bind_address = config.server.bind_address.clone();
    info!(config_dir = %config_dir, ledger = %config.ledger.name, "Configuration loaded");

    let database_path = config.storage.database_path.clone();
    let ledger = Ledger::with_system_clock(config)?;
    info!(database = %database_path.display(), "Ledger database ready");

    let app = create_router(AppState::new(ledger));
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!(bind_address = %bind_address, "Site ledger listening");
    axum::serve(listener, app).await?;
    Ok(())
}
