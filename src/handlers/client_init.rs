use crate::{collab::CollaborationServer, models::{ClientInitResponse, ErrorResponse}};
use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::{error, info};

/// Register a new client and hand out its identity
pub async fn client_init(
    State(server): State<Arc<CollaborationServer>>,
) -> Result<(StatusCode, Json<ClientInitResponse>), (StatusCode, Json<ErrorResponse>)> {

    let client_id = match server.register().await {
        Ok(id) => id,
        Err(e) => {
            error!("Failed to register client: {}", e);
            return Err(e.into());
        }
    };
    info!("Issued client id {}", client_id);

    let bounds = server.bounds();
    Ok((
        StatusCode::OK,
        Json(ClientInitResponse {
            client_id,
            rows: bounds.rows,
            cols: bounds.cols,
        }),
    ))
}
