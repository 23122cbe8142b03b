//! Spreadsheet export endpoint.

use std::collections::HashMap;

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, get, web};
use chrono::{Offset, Utc};
use tracing::{info, warn};

use crate::auth::SessionAuth;
use crate::config::Config;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::Defect;
use crate::services::export::{build_export_rows, export_filename, write_workbook};
use crate::services::storage::EVIDENCE_URL_TTL;
use crate::services::{Storage, lifecycle};

/// MIME type of xlsx workbooks.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Configure export routes. Must be registered before `/defects/{id}`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(export_defects);
}

/// Evidence link per image key: the permanent URL when a public base is
/// configured, otherwise a signed URL valid for [`EVIDENCE_URL_TTL`].
///
/// Keys that cannot be signed are left out and export as "No Image".
async fn evidence_links(defects: &[Defect], storage: &Storage) -> HashMap<String, String> {
    let mut links = HashMap::new();
    for reference in defects.iter().filter_map(|d| d.image_key.as_deref()) {
        let key = storage.object_key(reference);
        if links.contains_key(key) {
            continue;
        }
        let url = match storage.public_url(key) {
            Some(url) => url,
            None => match storage.presigned_get(key, EVIDENCE_URL_TTL).await {
                Ok((url, _)) => url,
                Err(e) => {
                    warn!(key = %key, "Could not sign evidence link: {}", e);
                    continue;
                }
            },
        };
        links.insert(key.to_string(), url);
    }
    links
}

/// Download every defect as an xlsx workbook.
#[utoipa::path(
    get,
    path = "/api/v1/defects/export",
    tag = "Defects",
    responses(
        (status = 200, description = "Workbook download", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        (status = 403, description = "Caller is not a manager", body = crate::error::ErrorResponse)
    ),
    security(("session" = []))
)]
#[get("/defects/export")]
pub async fn export_defects(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    storage: web::Data<Storage>,
    config: web::Data<Config>,
) -> AppResult<HttpResponse> {
    lifecycle::authorize_manager(&auth.principal)?;

    let defects = pool.list_defects(None).await?;
    let zone_responses = pool.list_all_zone_responses().await?;
    let analyses = pool.list_all_manager_analyses().await?;

    let offset = config.export_offset().unwrap_or_else(|| Utc.fix());
    let evidence = evidence_links(&defects, &storage).await;
    let rows = build_export_rows(&defects, &zone_responses, &analyses, offset, |key| {
        evidence.get(storage.object_key(key)).cloned()
    });
    let workbook = write_workbook(&rows)?;
    let filename = export_filename(Utc::now(), offset);

    info!(
        user_id = %auth.principal.user_id,
        rows = rows.len(),
        filename = %filename,
        "Defects exported"
    );

    Ok(HttpResponse::Ok()
        .content_type(XLSX_CONTENT_TYPE)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(filename)],
        })
        .body(workbook))
}
