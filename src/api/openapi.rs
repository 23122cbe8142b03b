//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "LineDefect Server",
        version = "0.1.0",
        description = "API server for logging production line defects, collecting zone investigations and closing them with a 4M analysis"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Auth endpoints
        api::accounts::sign_up,
        api::accounts::sign_in,
        api::accounts::get_current_user,
        api::accounts::logout,
        // Catalogue
        api::zones::list_zones,
        // Defect endpoints
        api::images::upload_image,
        api::defects::create_defect,
        api::defects::list_defects,
        api::defects::get_defect,
        api::defects::get_defect_image_url,
        api::export::export_defects,
        // Lifecycle endpoints
        api::zone_responses::submit_zone_response,
        api::analysis::submit_analysis,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            api::health::Dependency,
            // Accounts
            models::Role,
            models::SignUpRequest,
            models::SignInRequest,
            models::UserResponse,
            models::SessionResponse,
            // Zones
            models::Zone,
            models::Side,
            models::ZoneInfo,
            // Defects
            models::DefectStatus,
            models::CreateDefectRequest,
            models::DefectResponse,
            models::DefectCounts,
            models::DefectListResponse,
            models::DefectDetailResponse,
            models::ViewerConstraints,
            models::SignedUrlResponse,
            api::images::ImageUploadResponse,
            // Lifecycle
            models::UpsertOutcome,
            models::ZoneFindings,
            models::ZoneResponse,
            models::SubmitZoneResponseRequest,
            models::ZoneResponseSaved,
            models::AnalysisForm,
            models::ManagerAnalysis,
            models::SubmitAnalysisRequest,
            models::AnalysisSaved,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "Accounts and sessions"),
        (name = "Zones", description = "Production line zones"),
        (name = "Defects", description = "Defect logging, listing and export"),
        (name = "Lifecycle", description = "Zone responses and manager analysis")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add session bearer security scheme.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
