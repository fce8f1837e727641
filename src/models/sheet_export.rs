use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Committed sheet contents, row by row, for the file export service
#[derive(Serialize, Deserialize, ToSchema)]
pub struct SheetExportResponse {
    pub rows: u32,
    pub cols: u32,
    pub data: Vec<Vec<String>>,
}
