//! Admin Handlers
//!
//! HTTP request handlers for each admin endpoint.

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::cache::SharedCache;
use crate::error::CacheError;
use crate::models::{EntriesResponse, HealthResponse, StatsResponse};

/// Application state shared across all handlers.
///
/// Holds the same cache instance the proxy pipeline uses.
#[derive(Clone)]
pub struct AdminState {
    pub cache: Arc<SharedCache>,
}

impl AdminState {
    pub fn new(cache: Arc<SharedCache>) -> Self {
        Self { cache }
    }
}

/// Handler for GET /stats
///
/// Enters the cache gate as a reader to count occupied slots.
pub async fn stats_handler(
    State(state): State<AdminState>,
) -> Result<Json<StatsResponse>, CacheError> {
    let stats = state.cache.stats().await?;

    Ok(Json(StatsResponse::new(
        &stats,
        state.cache.max_object_size(),
    )))
}

/// Handler for GET /cache
///
/// Lists occupied slots without touching their used bits.
pub async fn entries_handler(
    State(state): State<AdminState>,
) -> Result<Json<EntriesResponse>, CacheError> {
    let cursor = state.cache.cursor().await?;
    let entries = state.cache.entries().await?;

    Ok(Json(EntriesResponse::new(cursor, entries)))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
