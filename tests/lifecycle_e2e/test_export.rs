//! E2E tests: xlsx export.

use actix_web::{http::header, test};

use super::test_helpers::*;

#[actix_rt::test]
#[ignore = "requires PostgreSQL and MinIO"]
async fn test_export_is_manager_only() {
    let app = create_test_app().await;
    let leader = sign_up(&app, "group_leader", Some("L1")).await;

    let (status, _) = call_as(
        &app,
        &leader,
        test::TestRequest::get().uri("/api/v1/defects/export"),
    )
    .await;
    assert_eq!(status, 403);
}

#[actix_rt::test]
#[ignore = "requires PostgreSQL and MinIO"]
async fn test_export_returns_workbook() {
    let app = create_test_app().await;
    create_defect(&app, &["L3"]).await;
    let manager = sign_up(&app, "manager", None).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/defects/export")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", manager)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let disposition = resp
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(disposition.contains("attachment"));
    assert!(disposition.contains(".xlsx"));

    let body = test::read_body(resp).await;
    assert!(body.starts_with(b"PK"));
}
