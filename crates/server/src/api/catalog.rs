//! Catalog listing API handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use plugsync_core::{merge_recommended, order_by_priority, CatalogEntry};

use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ListingItem {
    #[serde(flatten)]
    pub entry: CatalogEntry,
    /// Whether the panel may show premium upsell info for this plugin.
    pub show_premium: bool,
}

#[derive(Debug, Serialize)]
pub struct CatalogListResponse {
    pub entries: Vec<ListingItem>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub fetched: usize,
    pub retained: usize,
    pub failed: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/catalog
///
/// The ordered, human-facing listing: primary snapshot plus recommended
/// plugins, priority-sorted, prerequisite-filtered. An empty listing is a
/// valid response, never an error.
pub async fn list_catalog(State(state): State<Arc<AppState>>) -> Json<CatalogListResponse> {
    let primary = state.catalog_sync().snapshot().await;

    let (secondary, recommended) = match state.directory_sync() {
        Some(directory) => (
            Some(directory.snapshot().await),
            directory.config().recommended.clone(),
        ),
        None => (None, Vec::new()),
    };

    let products = &state.config().catalog.products;
    let entries = order_by_priority(
        merge_recommended(
            primary.entries.values().cloned().collect(),
            secondary.as_ref(),
            &recommended,
            state.local(),
        ),
        products,
    );

    let entries: Vec<ListingItem> = entries
        .into_iter()
        .map(|entry| {
            let hide_premium = products
                .iter()
                .find(|p| p.key == entry.slug)
                .map(|p| p.hide_premium)
                .unwrap_or(true);
            ListingItem {
                show_premium: !hide_premium,
                entry,
            }
        })
        .collect();

    let total = entries.len();
    Json(CatalogListResponse { entries, total })
}

/// POST /api/v1/catalog/refresh
///
/// Force a refresh cycle regardless of snapshot age.
pub async fn refresh_catalog(State(state): State<Arc<AppState>>) -> Json<RefreshResponse> {
    let outcome = state.catalog_sync().refresh().await;

    if let Some(directory) = state.directory_sync() {
        directory.refresh().await;
    }

    Json(RefreshResponse {
        fetched: outcome.fetched,
        retained: outcome.retained,
        failed: outcome.failures.into_iter().map(|f| f.key).collect(),
    })
}

/// DELETE /api/v1/catalog
///
/// Invalidate both cache slots; the next read refreshes.
pub async fn invalidate_catalog(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SuccessResponse>, impl IntoResponse> {
    if let Err(e) = state.catalog_sync().invalidate() {
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        ));
    }

    if let Some(directory) = state.directory_sync() {
        if let Err(e) = directory.invalidate() {
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ));
        }
    }

    Ok(Json(SuccessResponse {
        message: "catalog invalidated".to_string(),
    }))
}
