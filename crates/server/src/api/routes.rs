use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{catalog, handlers, updates};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health, config and metrics
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::metrics))
        // Catalog listing (the human-facing path)
        .route("/catalog", get(catalog::list_catalog))
        .route("/catalog", delete(catalog::invalidate_catalog))
        .route("/catalog/refresh", post(catalog::refresh_catalog))
        // Update registry reconciliation
        .route("/updates", get(updates::list_updates))
        .route("/updates/merge", post(updates::merge_updates))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
}
