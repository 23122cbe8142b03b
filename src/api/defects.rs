//! Defect endpoints: create, list, detail, signed image URL.

use std::time::Duration;

use actix_web::{HttpResponse, get, post, web};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::auth::SessionAuth;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateDefectRequest, Defect, DefectDetailResponse, DefectListResponse, DefectResponse,
    ListDefectsQuery, SignedUrlQuery, SignedUrlResponse, WsEvent,
};
use crate::services::storage::AD_HOC_URL_TTL;
use crate::services::{EventBroadcaster, Storage, lifecycle};

/// Configure defect routes.
/// Note: `/defects/export` is registered by the export module before these.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_defect)
        .service(list_defects)
        .service(get_defect_image_url)
        .service(get_defect);
}

/// Load a defect or fail with 404.
pub(crate) async fn load_defect(pool: &DbPool, id: Uuid) -> AppResult<Defect> {
    pool.get_defect(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Defect {}", id)))
}

pub(crate) fn to_response(defect: Defect, storage: &Storage) -> DefectResponse {
    let image_url = defect
        .image_key
        .as_deref()
        .and_then(|key| storage.public_url(key));
    DefectResponse::from_defect(defect, image_url)
}

/// Log a new defect.
#[utoipa::path(
    post,
    path = "/api/v1/defects",
    tag = "Defects",
    request_body = CreateDefectRequest,
    responses(
        (status = 201, description = "Defect created (OPEN)", body = DefectResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 403, description = "Caller is not a final inspector", body = crate::error::ErrorResponse)
    ),
    security(("session" = []))
)]
#[post("/defects")]
pub async fn create_defect(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    storage: web::Data<Storage>,
    broadcaster: web::Data<EventBroadcaster>,
    body: web::Json<CreateDefectRequest>,
) -> AppResult<HttpResponse> {
    lifecycle::authorize_defect_creation(&auth.principal)?;
    let mut new = lifecycle::validate_new_defect(body.into_inner())?;

    if let Some(reference) = new.image_key.take() {
        let key = storage.object_key(&reference).to_string();
        lifecycle::check_length("image_key", &key, lifecycle::limits::IMAGE_KEY)?;
        if Storage::image_extension(&key).is_none() {
            return Err(AppError::InvalidInput(format!(
                "image_key '{}' is not an image",
                key
            )));
        }
        new.image_key = Some(key);
    }

    let defect = pool
        .insert_defect(new, auth.principal.user_id, Utc::now())
        .await?;

    info!(
        defect_id = %defect.id,
        report_id = %defect.report_id,
        zones = ?defect.targeted_zones,
        user_id = %auth.principal.user_id,
        "Defect logged"
    );

    broadcaster.publish(WsEvent::defect_created(
        defect.id,
        defect.report_id.clone(),
        defect.targeted_zones.clone(),
        defect.created_at,
    ));

    Ok(HttpResponse::Created().json(to_response(defect, &storage)))
}

/// List defects, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/defects",
    tag = "Defects",
    params(
        ("status" = Option<String>, Query, description = "OPEN or CLOSED (default: all)")
    ),
    responses(
        (status = 200, description = "Defects with per-status counts", body = DefectListResponse)
    ),
    security(("session" = []))
)]
#[get("/defects")]
pub async fn list_defects(
    _auth: SessionAuth,
    pool: web::Data<DbPool>,
    storage: web::Data<Storage>,
    query: web::Query<ListDefectsQuery>,
) -> AppResult<HttpResponse> {
    let defects = pool.list_defects(query.status).await?;
    let counts = pool.count_defects().await?;

    Ok(HttpResponse::Ok().json(DefectListResponse {
        defects: defects
            .into_iter()
            .map(|d| to_response(d, &storage))
            .collect(),
        counts,
    }))
}

/// Defect detail with zone responses, analysis and what the caller may do.
#[utoipa::path(
    get,
    path = "/api/v1/defects/{id}",
    tag = "Defects",
    params(
        ("id" = Uuid, Path, description = "Defect UUID")
    ),
    responses(
        (status = 200, description = "Defect detail", body = DefectDetailResponse),
        (status = 404, description = "Defect not found", body = crate::error::ErrorResponse)
    ),
    security(("session" = []))
)]
#[get("/defects/{id}")]
pub async fn get_defect(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    storage: web::Data<Storage>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let defect = load_defect(&pool, path.into_inner()).await?;
    let zone_responses = pool.list_zone_responses(defect.id).await?;
    let manager_analysis = pool.get_manager_analysis(defect.id).await?;
    let viewer = lifecycle::viewer_constraints(&defect, &auth.principal);

    Ok(HttpResponse::Ok().json(DefectDetailResponse {
        defect: to_response(defect, &storage),
        zone_responses,
        manager_analysis,
        viewer,
    }))
}

/// Signed, time-limited URL for the defect photo.
#[utoipa::path(
    get,
    path = "/api/v1/defects/{id}/image",
    tag = "Defects",
    params(
        ("id" = Uuid, Path, description = "Defect UUID"),
        ("expires_in" = Option<u64>, Query, description = "Validity in seconds (default 3600, max 604800)")
    ),
    responses(
        (status = 200, description = "Signed URL", body = SignedUrlResponse),
        (status = 404, description = "Defect or image not found", body = crate::error::ErrorResponse)
    ),
    security(("session" = []))
)]
#[get("/defects/{id}/image")]
pub async fn get_defect_image_url(
    _auth: SessionAuth,
    pool: web::Data<DbPool>,
    storage: web::Data<Storage>,
    path: web::Path<Uuid>,
    query: web::Query<SignedUrlQuery>,
) -> AppResult<HttpResponse> {
    let defect = load_defect(&pool, path.into_inner()).await?;
    let reference = defect
        .image_key
        .as_deref()
        .ok_or_else(|| AppError::NotFound(format!("Image for defect {}", defect.report_id)))?;

    let ttl = query
        .expires_in
        .map(Duration::from_secs)
        .unwrap_or(AD_HOC_URL_TTL);
    let (url, expires_at) = storage
        .presigned_get(storage.object_key(reference), ttl)
        .await?;

    Ok(HttpResponse::Ok().json(SignedUrlResponse { url, expires_at }))
}
