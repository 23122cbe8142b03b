//! Shared helpers for lifecycle E2E tests.

use actix_web::{App, dev::ServiceResponse, http::header, test, web};
use linedefect_lib::api;
use linedefect_lib::config::Config;
use linedefect_lib::db::DbPool;
use linedefect_lib::services::{EventBroadcaster, Storage};
use serde_json::{Value, json};
use std::sync::OnceLock;
use uuid::Uuid;

static MIGRATIONS_RUN: OnceLock<()> = OnceLock::new();

/// Test password for every account created here.
pub const TEST_PASSWORD: &str = "line-defect-e2e";

/// Load config from the environment with a small pool.
pub fn load_config() -> Config {
    dotenvy::dotenv().ok();
    let mut config = Config::from_env().expect(
        "Failed to load config. Ensure RUST_ENV=development (or DATABASE_URL and S3 vars) \
         is set, and that PostgreSQL and MinIO are running.",
    );
    config.database.max_connections = 2;
    config.database.min_connections = 1;
    config
}

/// Create a fresh DB pool. Migrations run only once.
pub async fn create_test_pool(config: &Config) -> DbPool {
    let pool = DbPool::new(&config.database)
        .await
        .expect("Failed to connect to database");

    if MIGRATIONS_RUN.get().is_none() {
        pool.run_migrations()
            .await
            .expect("Failed to run migrations");
        let _ = MIGRATIONS_RUN.set(());
    }

    pool
}

/// Create the full app against real PostgreSQL and MinIO.
pub async fn create_test_app() -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = ServiceResponse,
    Error = actix_web::Error,
> {
    let config = load_config();
    let pool = create_test_pool(&config).await;
    let storage = Storage::new(&config.storage)
        .await
        .expect("Failed to initialize storage");

    test::init_service(
        App::new()
            .app_data(web::Data::new(pool))
            .app_data(web::Data::new(config))
            .app_data(web::Data::new(storage))
            .app_data(web::Data::new(EventBroadcaster::new()))
            .service(
                web::scope("/api/v1")
                    .configure(api::configure_health_routes)
                    .configure(api::configure_routes),
            ),
    )
    .await
}

/// Unique email for test isolation.
pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@plant.test", prefix, Uuid::now_v7().simple())
}

/// Read a response as `(status, json body)`.
pub async fn status_and_json(resp: ServiceResponse) -> (u16, Value) {
    let status = resp.status().as_u16();
    let body = test::read_body(resp).await;
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

/// Sign up an account and return its bearer token.
pub async fn sign_up<S>(app: &S, role: &str, zone: Option<&str>) -> String
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/sign-up")
        .set_json(json!({
            "email": unique_email(role),
            "password": TEST_PASSWORD,
            "name": format!("Test {}", role),
            "role": role,
            "zone": zone,
        }))
        .to_request();
    let (status, body) = status_and_json(test::call_service(app, req).await).await;
    assert_eq!(status, 201, "sign-up failed: {}", body);
    body["token"].as_str().expect("token").to_string()
}

/// Send `req` with a bearer token.
pub async fn call_as<S>(app: &S, token: &str, req: test::TestRequest) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let req = req
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .to_request();
    status_and_json(test::call_service(app, req).await).await
}

/// Log a defect as a fresh final inspector; returns the defect JSON.
pub async fn create_defect<S>(app: &S, zones: &[&str]) -> Value
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let inspector = sign_up(app, "final_inspector", None).await;
    let (status, body) = call_as(
        app,
        &inspector,
        test::TestRequest::post().uri("/api/v1/defects").set_json(json!({
            "vehicle_frame_no": "MA3ERLF1S00123456",
            "model_name": "Swift",
            "defect_category": "Paint",
            "defect_notes": "Scratch on rear door",
            "targeted_zones": zones,
        })),
    )
    .await;
    assert_eq!(status, 201, "create defect failed: {}", body);
    body
}
