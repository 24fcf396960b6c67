//! Roomcast Engine - Main entry point.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roomcast_engine::{
    build_router,
    config::{load_dotenv_from_repo_root, EngineConfig},
    infrastructure::clock::SystemClock,
    App,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the binary may run from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roomcast_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Roomcast Engine");

    let config = EngineConfig::from_env();
    let app = Arc::new(App::new(Arc::new(SystemClock::new())));

    let cors = config.cors_layer();
    if cors.is_none() {
        tracing::info!("CORS disabled");
    }
    let router = build_router(app, cors);

    // Start server
    let addr = config.bind_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
