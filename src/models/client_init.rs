use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::collab::ClientId;

/// Response for registering a new client
#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientInitResponse {
    #[schema(value_type = String, example = "c1")]
    pub client_id: ClientId,
    /// Grid row count enforced by the server
    pub rows: u32,
    /// Grid column count enforced by the server
    pub cols: u32,
}
