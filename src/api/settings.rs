//! Settings endpoints

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppResult;

/// Settings response
#[derive(Debug, Serialize, ToSchema)]
pub struct SettingsResponse {
    /// Days before a ficha turns Rojo
    pub threshold_days: u32,
}

/// Update settings request
#[derive(Deserialize, Validate, ToSchema)]
pub struct UpdateSettingsRequest {
    /// Days before a ficha turns Rojo (1 to 365)
    #[validate(range(min = 1, max = 365))]
    pub threshold_days: u32,
}

/// Get current settings
#[utoipa::path(
    get,
    path = "/settings",
    tag = "settings",
    responses(
        (status = 200, description = "Current settings", body = SettingsResponse)
    )
)]
pub async fn get_settings(
    State(state): State<crate::AppState>,
) -> AppResult<Json<SettingsResponse>> {
    let settings = state.services.settings.get_settings().await;
    Ok(Json(settings))
}

/// Update settings
#[utoipa::path(
    put,
    path = "/settings",
    tag = "settings",
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Settings updated", body = SettingsResponse),
        (status = 400, description = "Threshold out of range", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_settings(
    State(state): State<crate::AppState>,
    Json(request): Json<UpdateSettingsRequest>,
) -> AppResult<Json<SettingsResponse>> {
    let settings = state.services.settings.update_settings(request).await?;
    Ok(Json(settings))
}
