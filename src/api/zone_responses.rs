//! Zone response endpoint for group leaders.

use actix_web::{HttpResponse, put, web};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::auth::SessionAuth;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{SubmitZoneResponseRequest, UpsertOutcome, WsEvent, ZoneResponseSaved};
use crate::services::{EventBroadcaster, lifecycle};

use super::defects::load_defect;

/// Configure zone response routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(submit_zone_response);
}

/// Record or rewrite the caller's zone response.
///
/// Only the group leader of `zone` may submit. A targeted zone must answer
/// `involved = true`.
#[utoipa::path(
    put,
    path = "/api/v1/defects/{id}/zone-response",
    tag = "Lifecycle",
    params(
        ("id" = Uuid, Path, description = "Defect UUID")
    ),
    request_body = SubmitZoneResponseRequest,
    responses(
        (status = 201, description = "Response created", body = ZoneResponseSaved),
        (status = 200, description = "Response updated", body = ZoneResponseSaved),
        (status = 403, description = "Not the group leader of this zone", body = crate::error::ErrorResponse),
        (status = 404, description = "Defect not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Targeted zone cannot decline involvement", body = crate::error::ErrorResponse)
    ),
    security(("session" = []))
)]
#[put("/defects/{id}/zone-response")]
pub async fn submit_zone_response(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    broadcaster: web::Data<EventBroadcaster>,
    path: web::Path<Uuid>,
    body: web::Json<SubmitZoneResponseRequest>,
) -> AppResult<HttpResponse> {
    let request = body.into_inner();
    lifecycle::authorize_zone_response(&auth.principal, request.zone)?;

    let defect = load_defect(&pool, path.into_inner()).await?;
    let existing = pool.list_zone_responses(defect.id).await?;

    let upsert = lifecycle::submit_zone_response(
        &defect,
        &existing,
        &auth.principal,
        request.zone,
        request.involved,
        request.findings,
        Utc::now(),
    )?;
    let (saved, outcome) = pool.upsert_zone_response(&upsert.response).await?;

    info!(
        defect_id = %defect.id,
        zone = %saved.zone,
        involved = saved.involved,
        outcome = ?outcome,
        user_id = %auth.principal.user_id,
        "Zone response saved"
    );

    broadcaster.publish(WsEvent::zone_response_saved(defect.id, saved.zone));

    let body = ZoneResponseSaved {
        outcome,
        zone_response: saved,
    };
    Ok(match outcome {
        UpsertOutcome::Created => HttpResponse::Created().json(body),
        UpsertOutcome::Updated => HttpResponse::Ok().json(body),
    })
}
