use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::server::MenagerieServer;

/// Health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    /// Current timestamp in RFC3339 format
    #[schema(example = "2026-01-15T10:30:00Z")]
    pub timestamp: String,
    #[schema(example = "0.1.0")]
    pub version: String,
    /// Seconds since the server state was built
    #[schema(example = 3600)]
    pub uptime: u64,
    /// Entity store backend in use
    #[schema(example = "memory")]
    pub store: String,
    /// Sessions currently registered
    pub active_sessions: usize,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Server is up", body = HealthResponse))
)]
pub async fn health_check(State(server): State<MenagerieServer>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: server.uptime_secs(),
        store: server.store().backend().to_string(),
        active_sessions: server.sessions().len(),
    })
}
