use crate::{collab::CollaborationServer, models::SheetExportResponse};
use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::info;

/// Export the committed sheet values as rows, the payload a file export
/// service turns into a spreadsheet document
pub async fn sheet_export(
    State(server): State<Arc<CollaborationServer>>,
) -> (StatusCode, Json<SheetExportResponse>) {

    let bounds = server.bounds();
    let data = server.snapshot_all_values().await;
    info!("Exporting {}x{} sheet", bounds.rows, bounds.cols);

    (
        StatusCode::OK,
        Json(SheetExportResponse {
            rows: bounds.rows,
            cols: bounds.cols,
            data,
        }),
    )
}
