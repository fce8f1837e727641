use axum::{extract::State, Json};
use crate::collab::CollaborationServer;
use crate::models::HealthResponse;
use std::sync::Arc;
use tracing::debug;

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    debug!("Health check requested");
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Server is running".to_string(),
        active_clients: None,
    })
}

/// Readiness check endpoint
pub async fn ready_check(State(server): State<Arc<CollaborationServer>>) -> Json<HealthResponse> {
    debug!("Readiness check requested");
    // Taking the session lock proves no handler is wedged inside it.
    let stats = server.stats().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Session is accepting clients".to_string(),
        active_clients: Some(stats.active),
    })
}
