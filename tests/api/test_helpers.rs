//! Shared helpers for the HTTP surface tests.

use actix_web::{App, dev::ServiceResponse, test, web};
use linedefect_lib::api;
use linedefect_lib::config::{
    Config, DatabaseSettings, Environment, SessionSettings, StorageSettings, defaults,
};
use linedefect_lib::services::EventBroadcaster;
use linedefect_lib::services::session::create_session_token;
use secrecy::SecretString;
use serde_json::Value;
use uuid::Uuid;

/// Session secret used by the test config.
pub const TEST_SESSION_SECRET: &str = "api-test-session-secret";

/// Development config with a known session secret. Never connects anywhere.
pub fn test_config() -> Config {
    Config {
        environment: Environment::Development,
        host: defaults::DEV_HOST.to_string(),
        port: defaults::DEV_PORT,
        database: DatabaseSettings {
            url: SecretString::from(defaults::DEV_DATABASE_URL),
            max_connections: 2,
            min_connections: 1,
        },
        static_dir: None,
        max_image_size: defaults::DEV_MAX_IMAGE_SIZE,
        session: SessionSettings {
            secret: SecretString::from(TEST_SESSION_SECRET),
            ttl_secs: 600,
        },
        export_utc_offset_minutes: 0,
        storage: StorageSettings {
            endpoint: Some(defaults::DEV_S3_ENDPOINT.to_string()),
            bucket: defaults::DEV_S3_BUCKET.to_string(),
            region: defaults::DEV_S3_REGION.to_string(),
            access_key: defaults::DEV_S3_ACCESS_KEY.to_string(),
            secret_key: SecretString::from(defaults::DEV_S3_SECRET_KEY),
            public_url: None,
        },
    }
}

/// A validly signed token for a user that exists nowhere.
pub fn signed_token_for_unknown_user() -> String {
    create_session_token(Uuid::now_v7(), &test_config().session)
        .expect("token")
        .token
}

/// App with every `/api/v1` route but no database or object store.
///
/// Requests that get past the session gate fail with 500, so any 401
/// observed here comes from the gate itself.
pub async fn create_test_app() -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = ServiceResponse,
    Error = actix_web::Error,
> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(test_config()))
            .app_data(web::Data::new(EventBroadcaster::new()))
            .service(
                web::scope("/api/v1")
                    .configure(api::configure_health_routes)
                    .configure(api::configure_routes)
                    .configure(api::configure_websocket_routes),
            ),
    )
    .await
}

/// Read a response as `(status, json body)`. Non-JSON bodies yield `Value::Null`.
pub async fn status_and_json(resp: ServiceResponse) -> (u16, Value) {
    let status = resp.status().as_u16();
    let body = test::read_body(resp).await;
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}
