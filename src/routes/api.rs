use crate::{
    collab::CollaborationServer,
    handlers::{client_init, diagnostics, health_check, ready_check, sheet_export, update_selection},
    websocket::websocket_handler,
};
use axum::{routing::{get, post}, Router};
use std::sync::Arc;

/// Create the collaboration protocol routes
pub fn create_session_routes(server: Arc<CollaborationServer>) -> Router {
    Router::<Arc<CollaborationServer>>::new()
        .route("/init", post(client_init))
        .route("/updateSelection", post(update_selection))
        .route("/ws/:client_id", get(websocket_handler))
        .with_state(server)
}

/// Create API routes
pub fn create_api_routes(server: Arc<CollaborationServer>) -> Router {
    Router::<Arc<CollaborationServer>>::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
        .route("/v1/diagnostics", get(diagnostics))
        .route("/v1/sheet/export", get(sheet_export))
        .with_state(server)
}
