//! E2E tests: defect logging, zone responses and manager analysis.

use actix_web::test;
use serde_json::json;

use super::test_helpers::*;

#[actix_rt::test]
#[ignore = "requires PostgreSQL and MinIO"]
async fn test_only_final_inspector_logs_defects() {
    let app = create_test_app().await;
    let manager = sign_up(&app, "manager", None).await;

    let (status, body) = call_as(
        &app,
        &manager,
        test::TestRequest::post().uri("/api/v1/defects").set_json(json!({
            "vehicle_frame_no": "MA3ERLF1S00999999",
            "model_name": "Dzire",
            "defect_category": "Gap",
            "targeted_zones": ["L1"],
        })),
    )
    .await;
    assert_eq!(status, 403);
    assert_eq!(body["error"], "PERMISSION_DENIED");
}

#[actix_rt::test]
#[ignore = "requires PostgreSQL and MinIO"]
async fn test_new_defect_is_open_with_report_id() {
    let app = create_test_app().await;
    let defect = create_defect(&app, &["L2", "R1", "L2"]).await;

    assert_eq!(defect["status"], "OPEN");
    assert_eq!(defect["targeted_zones"], json!(["L2", "R1"]));
    assert!(defect["report_id"].as_str().unwrap().starts_with("DEF-"));
}

#[actix_rt::test]
#[ignore = "requires PostgreSQL and MinIO"]
async fn test_targeted_zone_cannot_decline() {
    let app = create_test_app().await;
    let defect = create_defect(&app, &["L2"]).await;
    let id = defect["id"].as_str().unwrap();
    let leader = sign_up(&app, "group_leader", Some("L2")).await;

    let (status, body) = call_as(
        &app,
        &leader,
        test::TestRequest::put()
            .uri(&format!("/api/v1/defects/{}/zone-response", id))
            .set_json(json!({ "zone": "L2", "involved": false })),
    )
    .await;
    assert_eq!(status, 409);
    assert_eq!(body["error"], "INVALID_STATE_TRANSITION");
}

#[actix_rt::test]
#[ignore = "requires PostgreSQL and MinIO"]
async fn test_zone_response_upserts_per_zone() {
    let app = create_test_app().await;
    let defect = create_defect(&app, &["L2"]).await;
    let id = defect["id"].as_str().unwrap();
    let leader = sign_up(&app, "group_leader", Some("L2")).await;
    let uri = format!("/api/v1/defects/{}/zone-response", id);

    let (status, first) = call_as(
        &app,
        &leader,
        test::TestRequest::put().uri(&uri).set_json(json!({
            "zone": "L2",
            "involved": true,
            "root_cause": "Torque gun out of calibration",
        })),
    )
    .await;
    assert_eq!(status, 201);
    assert_eq!(first["outcome"], "created");

    let (status, second) = call_as(
        &app,
        &leader,
        test::TestRequest::put().uri(&uri).set_json(json!({
            "zone": "L2",
            "involved": true,
            "root_cause": "Torque gun out of calibration",
            "action_taken": "Recalibrated",
        })),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(second["outcome"], "updated");
    assert_eq!(second["zone_response"]["id"], first["zone_response"]["id"]);
    assert_eq!(second["zone_response"]["action_taken"], "Recalibrated");

    let (_, detail) = call_as(&app, &leader, test::TestRequest::get().uri(&format!("/api/v1/defects/{}", id))).await;
    assert_eq!(detail["zone_responses"].as_array().unwrap().len(), 1);
    assert_eq!(detail["viewer"]["zone_is_targeted"], true);
}

#[actix_rt::test]
#[ignore = "requires PostgreSQL and MinIO"]
async fn test_leader_cannot_answer_for_other_zone() {
    let app = create_test_app().await;
    let defect = create_defect(&app, &["L2"]).await;
    let id = defect["id"].as_str().unwrap();
    let leader = sign_up(&app, "group_leader", Some("R3")).await;

    let (status, _) = call_as(
        &app,
        &leader,
        test::TestRequest::put()
            .uri(&format!("/api/v1/defects/{}/zone-response", id))
            .set_json(json!({ "zone": "L2", "involved": true })),
    )
    .await;
    assert_eq!(status, 403);
}

#[actix_rt::test]
#[ignore = "requires PostgreSQL and MinIO"]
async fn test_manager_closes_and_reopens() {
    let app = create_test_app().await;
    let defect = create_defect(&app, &["R0"]).await;
    let id = defect["id"].as_str().unwrap();
    let manager = sign_up(&app, "manager", None).await;
    let uri = format!("/api/v1/defects/{}/analysis", id);

    let (status, closed) = call_as(
        &app,
        &manager,
        test::TestRequest::put().uri(&uri).set_json(json!({
            "machine": "Paint robot nozzle clogged",
            "manager_name": "Meera",
            "status": "CLOSED",
        })),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(closed["outcome"], "created");
    assert_eq!(closed["defect"]["status"], "CLOSED");

    let (status, reopened) = call_as(
        &app,
        &manager,
        test::TestRequest::put()
            .uri(&uri)
            .set_json(json!({ "status": "OPEN" })),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(reopened["outcome"], "updated");
    assert_eq!(reopened["defect"]["status"], "OPEN");
    assert_eq!(
        reopened["manager_analysis"]["id"],
        closed["manager_analysis"]["id"]
    );

    let (_, open_list) = call_as(
        &app,
        &manager,
        test::TestRequest::get().uri("/api/v1/defects?status=OPEN"),
    )
    .await;
    assert!(
        open_list["defects"]
            .as_array()
            .unwrap()
            .iter()
            .any(|d| d["id"] == id)
    );
}

#[actix_rt::test]
#[ignore = "requires PostgreSQL and MinIO"]
async fn test_resaving_analysis_keeps_defect_timestamp() {
    let app = create_test_app().await;
    let defect = create_defect(&app, &["L3"]).await;
    let id = defect["id"].as_str().unwrap();
    let manager = sign_up(&app, "manager", None).await;
    let uri = format!("/api/v1/defects/{}/analysis", id);

    let (status, first) = call_as(
        &app,
        &manager,
        test::TestRequest::put()
            .uri(&uri)
            .set_json(json!({ "method": "Skipped torque check", "status": "OPEN" })),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(first["defect"]["status"], "OPEN");
    assert_eq!(first["defect"]["updated_at"], defect["updated_at"]);

    let (status, second) = call_as(
        &app,
        &manager,
        test::TestRequest::put().uri(&uri).set_json(json!({
            "method": "Skipped torque check",
            "manager_name": "Meera",
            "status": "OPEN",
        })),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(second["manager_analysis"]["manager_name"], "Meera");
    assert_eq!(second["defect"]["updated_at"], defect["updated_at"]);
}

#[actix_rt::test]
#[ignore = "requires PostgreSQL and MinIO"]
async fn test_unknown_defect_not_found() {
    let app = create_test_app().await;
    let manager = sign_up(&app, "manager", None).await;

    let (status, body) = call_as(
        &app,
        &manager,
        test::TestRequest::get().uri(&format!("/api/v1/defects/{}", uuid::Uuid::now_v7())),
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "NOT_FOUND");
}
