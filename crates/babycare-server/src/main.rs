mod config;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use babycare_api::AppStateInner;
use babycare_db::Database;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "babycare=debug,babycare_api=debug,babycare_db=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;
    if config.uses_dev_secret() {
        warn!("BABYCARE_JWT_SECRET is not set; using the development secret. Do not run like this in production.");
    }

    let db = Database::open(&config.db_path)?;
    let state = AppStateInner::new(db, config.api_settings());

    let app = babycare_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    info!(
        "BabyCare server listening on {} (directory order: {:?})",
        config.addr, config.directory_order
    );

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
