//! Manager analysis and status endpoint.

use actix_web::{HttpResponse, put, web};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::auth::SessionAuth;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{AnalysisSaved, SubmitAnalysisRequest, WsEvent};
use crate::services::{EventBroadcaster, Storage, lifecycle};

use super::defects::{load_defect, to_response};

/// Configure analysis routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(submit_analysis);
}

/// Record the 4M analysis and set the defect status.
///
/// The status in the body is applied as given: saving with `OPEN` keeps or
/// reopens the defect, `CLOSED` closes it.
#[utoipa::path(
    put,
    path = "/api/v1/defects/{id}/analysis",
    tag = "Lifecycle",
    params(
        ("id" = Uuid, Path, description = "Defect UUID")
    ),
    request_body = SubmitAnalysisRequest,
    responses(
        (status = 200, description = "Analysis saved", body = AnalysisSaved),
        (status = 403, description = "Caller is not a manager", body = crate::error::ErrorResponse),
        (status = 404, description = "Defect not found", body = crate::error::ErrorResponse)
    ),
    security(("session" = []))
)]
#[put("/defects/{id}/analysis")]
pub async fn submit_analysis(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    storage: web::Data<Storage>,
    broadcaster: web::Data<EventBroadcaster>,
    path: web::Path<Uuid>,
    body: web::Json<SubmitAnalysisRequest>,
) -> AppResult<HttpResponse> {
    lifecycle::authorize_manager(&auth.principal)?;

    let request = body.into_inner();
    let defect = load_defect(&pool, path.into_inner()).await?;
    let existing = pool.get_manager_analysis(defect.id).await?;
    let previous_status = defect.status;

    let upsert = lifecycle::submit_manager_analysis(
        &defect,
        existing.as_ref(),
        &auth.principal,
        request.form,
        request.status,
        Utc::now(),
    )?;
    let (analysis, updated) = pool
        .save_analysis_with_status(&upsert.analysis, &upsert.defect)
        .await?;

    info!(
        defect_id = %updated.id,
        from = %previous_status,
        status = %updated.status,
        outcome = ?upsert.outcome,
        user_id = %auth.principal.user_id,
        "Manager analysis saved"
    );

    broadcaster.publish(WsEvent::analysis_saved(updated.id));
    if updated.status != previous_status {
        broadcaster.publish(WsEvent::defect_updated(updated.id, updated.status));
    }

    Ok(HttpResponse::Ok().json(AnalysisSaved {
        outcome: upsert.outcome,
        manager_analysis: analysis,
        defect: to_response(updated, &storage),
    }))
}
