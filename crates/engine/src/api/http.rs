//! HTTP routes.

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::app::App;

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(version))
        .route("/api/health", get(health))
}

async fn version() -> &'static str {
    concat!("roomcast ", env!("CARGO_PKG_VERSION"))
}

async fn health() -> &'static str {
    "OK"
}
