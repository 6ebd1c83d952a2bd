use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use device_registry::{
    api::{self, AppState},
    config::AppConfig,
    db::DBLayer,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------
    // Logging
    // -----------------------------
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // -----------------------------
    // Config / shared state
    // -----------------------------
    let config = AppConfig::from_env()?;
    let db = Arc::new(DBLayer::new(&config.db_path)?);
    let state = AppState::new(db, &config);

    let app = api::router(state);

    info!(addr = %config.bind_addr, db = %config.db_path, "device registry listening");

    let listener = TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
