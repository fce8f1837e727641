use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::collab::CollabError;

/// Response for an error
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub code: u16,
    pub status: String,
    pub error: String,
}

impl ErrorResponse {
    pub fn reply(status: StatusCode, error: String) -> (StatusCode, Json<ErrorResponse>) {
        (status, Json(ErrorResponse {
            code: status.as_u16(),
            status: status.to_string(),
            error,
        }))
    }
}

impl From<CollabError> for (StatusCode, Json<ErrorResponse>) {
    fn from(err: CollabError) -> Self {
        ErrorResponse::reply(err.status_code(), err.to_string())
    }
}
