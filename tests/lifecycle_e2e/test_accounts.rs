//! E2E tests: accounts and sessions.

use actix_web::test;
use serde_json::json;

use super::test_helpers::*;

#[actix_rt::test]
#[ignore = "requires PostgreSQL and MinIO"]
async fn test_sign_up_then_sign_in() {
    let app = create_test_app().await;
    let email = unique_email("leader");

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/sign-up")
        .set_json(json!({
            "email": email,
            "password": TEST_PASSWORD,
            "name": "Asha",
            "role": "group_leader",
            "zone": "R2",
        }))
        .to_request();
    let (status, body) = status_and_json(test::call_service(&app, req).await).await;
    assert_eq!(status, 201);
    assert_eq!(body["user"]["role"], "group_leader");
    assert_eq!(body["user"]["zone"], "R2");

    // Emails are matched case-insensitively
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/sign-in")
        .set_json(json!({ "email": email.to_uppercase(), "password": TEST_PASSWORD }))
        .to_request();
    let (status, body) = status_and_json(test::call_service(&app, req).await).await;
    assert_eq!(status, 200);
    let token = body["token"].as_str().expect("token").to_string();

    let (status, me) = call_as(&app, &token, test::TestRequest::get().uri("/api/v1/auth/me")).await;
    assert_eq!(status, 200);
    assert_eq!(me["email"], email.to_lowercase());
}

#[actix_rt::test]
#[ignore = "requires PostgreSQL and MinIO"]
async fn test_wrong_password_rejected() {
    let app = create_test_app().await;
    let email = unique_email("inspector");

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/sign-up")
        .set_json(json!({
            "email": email,
            "password": TEST_PASSWORD,
            "name": "Ravi",
            "role": "final_inspector",
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 201);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/sign-in")
        .set_json(json!({ "email": email, "password": "not-the-password" }))
        .to_request();
    let (status, body) = status_and_json(test::call_service(&app, req).await).await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "UNAUTHORIZED");
}

#[actix_rt::test]
#[ignore = "requires PostgreSQL and MinIO"]
async fn test_duplicate_email_conflicts() {
    let app = create_test_app().await;
    let email = unique_email("manager");
    let body = json!({
        "email": email,
        "password": TEST_PASSWORD,
        "name": "Meera",
        "role": "manager",
    });

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/sign-up")
        .set_json(&body)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 201);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/sign-up")
        .set_json(&body)
        .to_request();
    let (status, body) = status_and_json(test::call_service(&app, req).await).await;
    assert_eq!(status, 409);
    assert_eq!(body["error"], "CONFLICT");
}

#[actix_rt::test]
#[ignore = "requires PostgreSQL and MinIO"]
async fn test_group_leader_requires_zone() {
    let app = create_test_app().await;
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/sign-up")
        .set_json(json!({
            "email": unique_email("leader"),
            "password": TEST_PASSWORD,
            "name": "No Zone",
            "role": "group_leader",
        }))
        .to_request();
    let (status, _) = status_and_json(test::call_service(&app, req).await).await;
    assert_eq!(status, 400);
}

#[actix_rt::test]
#[ignore = "requires PostgreSQL and MinIO"]
async fn test_sign_up_name_capped_at_column_width() {
    let app = create_test_app().await;

    let sign_up_named = |name: String| {
        test::TestRequest::post()
            .uri("/api/v1/auth/sign-up")
            .set_json(json!({
                "email": unique_email("long-name"),
                "password": TEST_PASSWORD,
                "name": name,
                "role": "manager",
            }))
            .to_request()
    };

    let (status, body) =
        status_and_json(test::call_service(&app, sign_up_named("N".repeat(256))).await).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "INVALID_INPUT");

    let resp = test::call_service(&app, sign_up_named("N".repeat(255))).await;
    assert_eq!(resp.status().as_u16(), 201);
}
