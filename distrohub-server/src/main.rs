use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};

use distrohub_server::api::api_router;
use distrohub_server::config::Config;
use distrohub_server::repository::SqliteRepository;
use distrohub_server::service::ModerationService;
use distrohub_server::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    info!("Starting distrohub moderation server");

    let config = Config::from_env().context("failed to load configuration")?;

    let db_path = config.database_path();
    info!("Using state database: {}", db_path.display());
    let repo = SqliteRepository::new(&db_path)
        .with_context(|| format!("failed to open database at {}", db_path.display()))?;

    let app_state = Arc::new(AppState {
        service: ModerationService::new(Arc::new(repo)),
    });

    let app = api_router()
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(app_state);

    let listener = TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;
    info!("Server listening on port {}", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
