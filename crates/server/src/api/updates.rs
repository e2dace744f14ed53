//! Update-registry API handlers.

use std::sync::Arc;

use axum::{extract::State, Json};

use plugsync_core::{merge, UpdateRegistry};

use crate::state::AppState;

/// GET /api/v1/updates
///
/// Merge the current snapshot into an empty registry. The no-update bucket
/// stays absent; only actual updates surface here.
pub async fn list_updates(State(state): State<Arc<AppState>>) -> Json<UpdateRegistry> {
    let snapshot = state.catalog_sync().snapshot().await;
    let registry = merge(
        &snapshot,
        &state.config().catalog.products,
        UpdateRegistry::default(),
        state.local(),
    );
    Json(registry)
}

/// POST /api/v1/updates/merge
///
/// The host posts its native registry and receives the reconciled one,
/// catalog-sourced records inserted or overwritten per bucket.
pub async fn merge_updates(
    State(state): State<Arc<AppState>>,
    Json(registry): Json<UpdateRegistry>,
) -> Json<UpdateRegistry> {
    let snapshot = state.catalog_sync().snapshot().await;
    let registry = merge(
        &snapshot,
        &state.config().catalog.products,
        registry,
        state.local(),
    );
    Json(registry)
}
