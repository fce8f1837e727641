use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::collab::{position, CellPosition, ClientId};

/// Request payload for moving a client's cursor
#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSelectionRequest {
    #[schema(value_type = String, example = "c1")]
    pub client_id: ClientId,
    /// `"row,col"`, `{"row":r,"col":c}`, `[r,c]`, or null to clear. Required.
    #[serde(deserialize_with = "position::nullable")]
    #[schema(value_type = Option<String>, example = "0,0")]
    pub position: Option<CellPosition>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct UpdateSelectionResponse {
    pub success: bool,
}
