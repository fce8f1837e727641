use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Liveness and readiness payload
#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    /// Clients with an open channel, only reported by readiness
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_clients: Option<usize>,
}
