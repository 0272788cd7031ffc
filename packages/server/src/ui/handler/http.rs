//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{
    infrastructure::dto::http::{ConnectionSummaryDto, HealthDto},
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<HealthDto> {
    Json(HealthDto {
        status: "ok".to_string(),
    })
}

/// Current members, oldest first
pub async fn list_connections(
    State(state): State<Arc<AppState>>,
) -> Json<Vec<ConnectionSummaryDto>> {
    let mut snapshot = state.registry.snapshot().await;
    snapshot.sort_by(|a, b| {
        a.connected_at
            .cmp(&b.connected_at)
            .then_with(|| a.name.cmp(&b.name))
    });

    // Domain Model から DTO への変換
    Json(snapshot.into_iter().map(ConnectionSummaryDto::from).collect())
}
