//! Zone catalogue endpoint.

use actix_web::{HttpResponse, get, web};

use crate::models::{Zone, ZoneInfo};

/// List the line zones with their side.
#[utoipa::path(
    get,
    path = "/api/v1/zones",
    tag = "Zones",
    responses(
        (status = 200, description = "All zones in line order", body = Vec<ZoneInfo>)
    )
)]
#[get("/zones")]
pub async fn list_zones() -> HttpResponse {
    let zones: Vec<ZoneInfo> = Zone::ALL.into_iter().map(ZoneInfo::from).collect();
    HttpResponse::Ok().json(zones)
}

/// Configure zone routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_zones);
}
