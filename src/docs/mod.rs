use utoipa::OpenApi;
use crate::models::*;

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
#[allow(dead_code)]
pub async fn health_check_doc() {}

/// Register a new client
#[utoipa::path(
    post,
    path = "/init",
    responses(
        (status = 200, description = "Client registered", body = ClientInitResponse),
        (status = 503, description = "Client capacity exhausted", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn client_init_doc() {}

/// Move or clear a client's cursor
#[utoipa::path(
    post,
    path = "/updateSelection",
    request_body = UpdateSelectionRequest,
    responses(
        (status = 200, description = "Selection updated and broadcast", body = UpdateSelectionResponse),
        (status = 400, description = "Malformed body or position outside the grid", body = ErrorResponse),
        (status = 404, description = "Unknown client", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn update_selection_doc() {}

/// Committed sheet values for export
#[utoipa::path(
    get,
    path = "/api/v1/sheet/export",
    responses(
        (status = 200, description = "Sheet values row by row", body = SheetExportResponse)
    )
)]
#[allow(dead_code)]
pub async fn sheet_export_doc() {}

/// Session and process diagnostics
#[utoipa::path(
    get,
    path = "/api/v1/diagnostics",
    responses(
        (status = 200, description = "Diagnostics snapshot", body = DiagnosticsResponse)
    )
)]
#[allow(dead_code)]
pub async fn diagnostics_doc() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check_doc,
        client_init_doc,
        update_selection_doc,
        sheet_export_doc,
        diagnostics_doc,
    ),
    components(
        schemas(
            HealthResponse,
            ClientInitResponse,
            UpdateSelectionRequest,
            UpdateSelectionResponse,
            SheetExportResponse,
            DiagnosticsResponse,
            ErrorResponse
        )
    ),
    tags(
        (name = "api", description = "API endpoints")
    )
)]
pub struct ApiDoc;
