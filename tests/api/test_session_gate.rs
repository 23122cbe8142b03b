//! Every protected route rejects callers without a valid session.

use actix_web::{http::header, test};
use serde_json::json;
use uuid::Uuid;

use super::test_helpers::*;

fn protected_requests() -> Vec<test::TestRequest> {
    let id = Uuid::now_v7();
    vec![
        test::TestRequest::get().uri("/api/v1/auth/me"),
        test::TestRequest::get().uri("/api/v1/defects"),
        test::TestRequest::get().uri(&format!("/api/v1/defects/{}", id)),
        test::TestRequest::get().uri(&format!("/api/v1/defects/{}/image", id)),
        test::TestRequest::get().uri("/api/v1/defects/export"),
        test::TestRequest::post().uri("/api/v1/defects").set_json(json!({
            "vehicle_frame_no": "MA3ERLF1S00123456",
            "model_name": "Swift",
            "defect_category": "Paint",
            "targeted_zones": ["L2"]
        })),
        test::TestRequest::put()
            .uri(&format!("/api/v1/defects/{}/zone-response", id))
            .set_json(json!({ "zone": "L2", "involved": true })),
        test::TestRequest::put()
            .uri(&format!("/api/v1/defects/{}/analysis", id))
            .set_json(json!({ "status": "CLOSED" })),
        test::TestRequest::get().uri("/api/v1/ws"),
    ]
}

#[actix_rt::test]
async fn test_missing_session_is_unauthorized() {
    let app = create_test_app().await;

    for req in protected_requests() {
        let req = req.to_request();
        let uri = req.uri().to_string();
        let (status, body) = status_and_json(test::call_service(&app, req).await).await;
        assert_eq!(status, 401, "{} should require a session", uri);
        assert_eq!(body["error"], "UNAUTHORIZED", "{}", uri);
    }
}

#[actix_rt::test]
async fn test_garbage_bearer_is_unauthorized() {
    let app = create_test_app().await;

    for req in protected_requests() {
        let req = req
            .insert_header((header::AUTHORIZATION, "Bearer not-a-jwt"))
            .to_request();
        let uri = req.uri().to_string();
        let (status, _) = status_and_json(test::call_service(&app, req).await).await;
        assert_eq!(status, 401, "{} accepted a malformed token", uri);
    }
}

#[actix_rt::test]
async fn test_token_signed_with_other_secret_is_unauthorized() {
    let app = create_test_app().await;

    let mut settings = test_config().session;
    settings.secret = secrecy::SecretString::from("some-other-secret");
    let forged = linedefect_lib::services::session::create_session_token(Uuid::now_v7(), &settings)
        .expect("token")
        .token;

    let req = test::TestRequest::get()
        .uri("/api/v1/defects")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", forged)))
        .to_request();
    let (status, _) = status_and_json(test::call_service(&app, req).await).await;
    assert_eq!(status, 401);
}

#[actix_rt::test]
async fn test_valid_token_passes_the_gate() {
    let app = create_test_app().await;

    // Signature checks out, so the gate moves on to the account lookup,
    // which fails here because the test app has no database.
    let req = test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .insert_header((
            header::AUTHORIZATION,
            format!("Bearer {}", signed_token_for_unknown_user()),
        ))
        .to_request();
    let (status, body) = status_and_json(test::call_service(&app, req).await).await;
    assert_eq!(status, 500);
    assert_eq!(body["error"], "DATABASE_ERROR");
}
