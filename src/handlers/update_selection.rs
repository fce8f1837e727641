use crate::{
    collab::{CollabError, CollaborationServer},
    models::{ErrorResponse, UpdateSelectionRequest, UpdateSelectionResponse},
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Move (or clear) a client's cursor and broadcast the new selection views
pub async fn update_selection(
    State(server): State<Arc<CollaborationServer>>,
    payload: Result<Json<UpdateSelectionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UpdateSelectionResponse>), (StatusCode, Json<ErrorResponse>)> {

    // Parse the body ourselves so rejections share the error shape
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!("Rejected selection update: {}", rejection.body_text());
            return Err(CollabError::MalformedMessage(rejection.body_text()).into());
        }
    };

    debug!("Selection update from {}: {:?}", request.client_id, request.position);
    if let Err(e) = server.update_selection(request.client_id, request.position).await {
        warn!("Selection update from {} rejected: {}", request.client_id, e);
        return Err(e.into());
    }

    Ok((StatusCode::OK, Json(UpdateSelectionResponse { success: true })))
}
