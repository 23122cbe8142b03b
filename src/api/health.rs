//! Liveness and readiness probes.

use actix_web::{HttpResponse, get, web};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::db::DbPool;
use crate::services::Storage;

/// Liveness response.
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: String,
}

/// State of one backing service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Dependency {
    Up,
    Down,
}

/// Readiness response. `ready` only when every dependency is up.
#[derive(Serialize, ToSchema)]
pub struct ReadyResponse {
    status: &'static str,
    database: Dependency,
    storage: Dependency,
}

impl ReadyResponse {
    fn new(database: Dependency, storage: Dependency) -> Self {
        let status = if database == Dependency::Up && storage == Dependency::Up {
            "ready"
        } else {
            "not_ready"
        };
        Self {
            status,
            database,
            storage,
        }
    }

    fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}

fn probe<E: std::fmt::Display>(name: &str, result: Result<(), E>) -> Dependency {
    match result {
        Ok(()) => Dependency::Up,
        Err(e) => {
            tracing::warn!(dependency = name, "Readiness probe failed: {}", e);
            Dependency::Down
        }
    }
}

/// Liveness probe. Answers as long as the process serves HTTP.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Readiness probe: PostgreSQL and the image bucket must both answer.
#[utoipa::path(
    get,
    path = "/api/v1/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Database and storage reachable", body = ReadyResponse),
        (status = 503, description = "A dependency is down", body = ReadyResponse)
    )
)]
#[get("/ready")]
pub async fn ready(pool: web::Data<DbPool>, storage: web::Data<Storage>) -> HttpResponse {
    let (database, bucket) = tokio::join!(pool.ping(), storage.ping());
    let body = ReadyResponse::new(probe("database", database), probe("storage", bucket));

    if body.is_ready() {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}

/// Configure health routes.
pub fn configure_health_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health).service(ready);
}
