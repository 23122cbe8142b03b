//! Routes that answer without a session.

use actix_web::{http::header, test};

use super::test_helpers::*;

#[actix_rt::test]
async fn test_health_reports_version() {
    let app = create_test_app().await;
    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let (status, body) = status_and_json(test::call_service(&app, req).await).await;

    assert_eq!(status, 200);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[actix_rt::test]
async fn test_zones_in_line_order_with_sides() {
    let app = create_test_app().await;
    let req = test::TestRequest::get().uri("/api/v1/zones").to_request();
    let (status, body) = status_and_json(test::call_service(&app, req).await).await;

    assert_eq!(status, 200);
    let zones = body.as_array().expect("array of zones");
    let codes: Vec<&str> = zones.iter().filter_map(|z| z["zone"].as_str()).collect();
    assert_eq!(
        codes,
        ["L1", "L2", "L3", "L4", "R0", "R1", "R2", "R3", "R4"]
    );
    assert_eq!(zones[0]["side"], "left");
    assert_eq!(zones[4]["side"], "right");
}

#[actix_rt::test]
async fn test_logout_clears_cookie_without_session() {
    let app = create_test_app().await;
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/logout")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 200);
    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("Set-Cookie header")
        .to_string();
    assert!(set_cookie.starts_with("ldt_session="));
    assert!(set_cookie.contains("Max-Age=0"));
}
