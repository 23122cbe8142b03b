//! Image upload endpoint.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, post, web};
use futures_util::StreamExt;
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::auth::SessionAuth;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::services::{Storage, lifecycle};

/// Name of the multipart field carrying the image.
const IMAGE_FIELD: &str = "file";

/// Response for an image upload.
#[derive(Debug, Serialize, ToSchema)]
pub struct ImageUploadResponse {
    /// Object key to pass as `image_key` when creating the defect.
    pub key: String,
    /// Permanent public URL, when a public base is configured.
    pub url: Option<String>,
}

/// Configure image routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(upload_image);
}

/// Upload a defect photo.
///
/// Multipart form with a single `file` field (png, jpg, jpeg, gif, webp, heic).
#[utoipa::path(
    post,
    path = "/api/v1/images",
    tag = "Defects",
    request_body(content_type = "multipart/form-data", description = "Image in the `file` field"),
    responses(
        (status = 201, description = "Image stored", body = ImageUploadResponse),
        (status = 400, description = "Missing or unsupported file", body = crate::error::ErrorResponse),
        (status = 403, description = "Caller is not a final inspector", body = crate::error::ErrorResponse),
        (status = 502, description = "Object store failure", body = crate::error::ErrorResponse)
    ),
    security(("session" = []))
)]
#[post("/images")]
pub async fn upload_image(
    auth: SessionAuth,
    storage: web::Data<Storage>,
    config: web::Data<Config>,
    mut payload: Multipart,
) -> AppResult<HttpResponse> {
    lifecycle::authorize_defect_creation(&auth.principal)?;

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::InvalidInput(format!("Multipart error: {}", e)))?;

        let content_disposition = field
            .content_disposition()
            .ok_or_else(|| AppError::InvalidInput("Missing content disposition".to_string()))?
            .clone();

        if content_disposition.get_name() != Some(IMAGE_FIELD) {
            while let Some(chunk) = field.next().await {
                let _ = chunk;
            }
            continue;
        }

        let filename = content_disposition
            .get_filename()
            .ok_or_else(|| AppError::InvalidInput("Missing filename".to_string()))?
            .to_string();
        let ext = Storage::image_extension(&filename).ok_or_else(|| {
            AppError::InvalidInput(format!("Unsupported image type: {}", filename))
        })?;

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| AppError::InvalidInput(format!("Read error: {}", e)))?;
            if data.len() + chunk.len() > config.max_image_size {
                return Err(AppError::InvalidInput(format!(
                    "Image exceeds the {} byte limit",
                    config.max_image_size
                )));
            }
            data.extend_from_slice(&chunk);
        }
        if data.is_empty() {
            return Err(AppError::InvalidInput("Image is empty".to_string()));
        }

        let key = Storage::image_key(&ext);
        let size = data.len();
        storage
            .put(&key, data, Some(Storage::content_type_for_extension(&ext)))
            .await?;

        info!(user_id = %auth.principal.user_id, key = %key, size, "Image uploaded");

        return Ok(HttpResponse::Created().json(ImageUploadResponse {
            url: storage.public_url(&key),
            key,
        }));
    }

    Err(AppError::InvalidInput(format!(
        "Missing '{}' field",
        IMAGE_FIELD
    )))
}
