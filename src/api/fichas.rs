//! Ficha API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{CreateMaintenanceRecord, FichaDetail, FichaRow, MaintenanceRecord},
};

/// List all fichas with their maintenance status
#[utoipa::path(
    get,
    path = "/fichas",
    tag = "fichas",
    responses(
        (status = 200, description = "Ficha list in table order", body = Vec<FichaRow>),
        (status = 422, description = "Required column missing from the table", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_fichas(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<FichaRow>>> {
    let fichas = state.services.fichas.list().await?;
    Ok(Json(fichas))
}

/// Get a ficha with its maintenance history
#[utoipa::path(
    get,
    path = "/fichas/{id}",
    tag = "fichas",
    params(("id" = String, Path, description = "Ficha ID")),
    responses(
        (status = 200, description = "Ficha details", body = FichaDetail),
        (status = 404, description = "Ficha not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_ficha(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<FichaDetail>> {
    let detail = state.services.fichas.detail(&id).await?;
    Ok(Json(detail))
}

/// Log a maintenance event for a ficha
#[utoipa::path(
    post,
    path = "/fichas/{id}/maintenance",
    tag = "fichas",
    params(("id" = String, Path, description = "Ficha ID")),
    request_body = CreateMaintenanceRecord,
    responses(
        (status = 201, description = "Maintenance recorded", body = MaintenanceRecord),
        (status = 404, description = "Ficha not found", body = crate::error::ErrorResponse),
        (status = 502, description = "Table backend rejected the update", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_maintenance(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
    Json(data): Json<CreateMaintenanceRecord>,
) -> AppResult<(StatusCode, Json<MaintenanceRecord>)> {
    let record = state.services.fichas.append_maintenance(&id, data).await?;
    Ok((StatusCode::CREATED, Json(record)))
}
