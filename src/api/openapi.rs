//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{fichas, health, settings};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Fichas API",
        version = "0.1.0",
        description = "Equipment maintenance tracking REST API",
        license(name = "MIT")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Fichas
        fichas::list_fichas,
        fichas::get_ficha,
        fichas::create_maintenance,
        // Settings
        settings::get_settings,
        settings::update_settings,
    ),
    components(
        schemas(
            // Fichas
            crate::models::Status,
            crate::models::FichaRecord,
            crate::models::FichaRow,
            crate::models::FichaDetail,
            crate::models::MaintenanceType,
            crate::models::Attachment,
            crate::models::MaintenanceRecord,
            crate::models::CreateMaintenanceRecord,
            // Settings
            settings::SettingsResponse,
            settings::UpdateSettingsRequest,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "fichas", description = "Equipment records and maintenance history"),
        (name = "settings", description = "Maintenance threshold settings")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
