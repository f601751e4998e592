//! Router tests against the in-memory store

mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{initiator, TestApp};
use equipment_service::models::ClassificationNode;
use equipment_service::models::notification::{
    EQUIPMENT_HOSPITAL_TRANSFER_TOPIC, EQUIPMENT_SERVICE_TRANSFER_TOPIC, NOTIFICATION_TOPIC,
};

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new(true);
    let (status, body) = app.send(Method::GET, "/api/v1/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_equipment_routes_require_bearer_token() {
    let app = TestApp::new(true);
    let (status, body) = app
        .send(Method::GET, "/api/v1/equipment/awaiting-reception", None, None)
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "NotAuthorized");
}

#[tokio::test]
async fn test_register_then_receive() {
    let app = TestApp::new(true);
    let (id, serial) = app.create_equipment("Operating table 1").await;
    assert_eq!(serial.len(), 10);

    let (_, awaiting) = app
        .request(Method::GET, "/api/v1/equipment/awaiting-reception", None)
        .await;
    assert_eq!(awaiting.as_array().unwrap().len(), 1);

    let (status, body) = app.receive(&serial).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["id"], id.as_str());

    let (_, equipment) = app
        .request(Method::GET, &format!("/api/v1/equipment/serial/{}", serial), None)
        .await;
    assert_eq!(equipment["reception"], true);
    assert_eq!(equipment["status"], "IN_SERVICE");
    assert_eq!(equipment["service_id"], "svc-surgery");

    let (_, in_service) = app.request(Method::GET, "/api/v1/hospitals/h-1/equipment", None).await;
    assert_eq!(in_service.as_array().unwrap().len(), 1);

    let (status, body) = app.receive(&serial).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "AlreadyReceived");
}

#[tokio::test]
async fn test_duplicate_name_and_unknown_classification() {
    let app = TestApp::new(true);
    app.create_equipment("Operating table 1").await;
    let writes = app.store.write_count();

    let request = json!({
        "name": "Operating table 1",
        "classification_code": "Z1203",
        "lifespan": 15,
        "risk_class": "IIa",
        "hospital_id": "h-1"
    });
    let (status, body) = app.request(Method::POST, "/api/v1/equipment", Some(request)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Duplicate");
    assert_eq!(app.store.write_count(), writes);

    let request = json!({
        "name": "Operating table 2",
        "classification_code": "Z99",
        "lifespan": 15,
        "risk_class": "IIa",
        "hospital_id": "h-1"
    });
    let (status, _) = app.request(Method::POST, "/api/v1/equipment", Some(request)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_unknown_equipment_is_not_found() {
    let app = TestApp::new(true);
    let (status, body) = app
        .request(Method::GET, &format!("/api/v1/equipment/{}", uuid::Uuid::new_v4()), None)
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 4);
}

#[tokio::test]
async fn test_maintenance_plan_reconciliation() {
    let app = TestApp::new(true);
    let (id, _) = app.create_equipment("Operating table 1").await;
    let plans_uri = format!("/api/v1/equipment/{}/maintenance-plans", id);

    let (status, first) = app
        .request(
            Method::POST,
            &plans_uri,
            Some(json!({"maintenance_date": "2026-06-01", "description": "calibration"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let first_id = first["id"].as_str().unwrap().to_string();

    let submission = json!([
        {"id": first_id, "maintenance_date": "2026-07-01", "description": "calibration, moved"},
        {"id": "", "description": "new inspection"}
    ]);
    let (status, plans) = app.request(Method::PUT, &plans_uri, Some(submission)).await;
    assert_eq!(status, StatusCode::OK);
    let plans = plans.as_array().unwrap();
    assert_eq!(plans.len(), 2);
    assert_eq!(plans[0]["id"], first_id.as_str());
    assert_eq!(plans[0]["maintenance_date"], "2026-07-01");

    let (_, equipment) = app.request(Method::GET, &format!("/api/v1/equipment/{}", id), None).await;
    assert_eq!(equipment["maintenance_plan_ids"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_maintenance_plan_with_unknown_spare_part() {
    let app = TestApp::new(true);
    let (id, _) = app.create_equipment("Operating table 1").await;
    let plans_uri = format!("/api/v1/equipment/{}/maintenance-plans", id);
    let (_, first) = app
        .request(Method::POST, &plans_uri, Some(json!({"description": "calibration"})))
        .await;
    let writes = app.store.write_count();

    let ghost = uuid::Uuid::new_v4();
    let (status, body) = app
        .request(
            Method::POST,
            &plans_uri,
            Some(json!({"description": "swap part", "spare_part_id": ghost})),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", body);

    let submission = json!([
        {"id": first["id"], "description": "calibration, moved"},
        {"description": "swap part", "spare_part_id": ghost}
    ]);
    let (status, _) = app.request(Method::PUT, &plans_uri, Some(submission)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(app.store.write_count(), writes);

    let (_, plans) = app.request(Method::GET, &plans_uri, None).await;
    assert_eq!(plans.as_array().unwrap().len(), 1);
    assert_eq!(plans[0]["description"], "calibration");
}

#[tokio::test]
async fn test_classification_reload_picks_up_new_codes() {
    let app = TestApp::new(true);
    let request = json!({
        "name": "Dialysis unit 1",
        "classification_code": "Z1301",
        "lifespan": 10,
        "risk_class": "IIb",
        "hospital_id": "h-1"
    });
    let (status, _) = app.request(Method::POST, "/api/v1/equipment", Some(request.clone())).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    app.store.replace_forest(vec![ClassificationNode::new("Z", "Medical equipment").with_children(vec![
        ClassificationNode::new("Z13", "Dialysis equipment")
            .with_children(vec![ClassificationNode::new("Z1301", "Haemodialysis units")]),
    ])]);
    let (status, _) = app.request(Method::POST, "/api/v1/equipment", Some(request.clone())).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app.send(Method::POST, "/api/v1/classification/reload", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.request(Method::POST, "/api/v1/classification/reload", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.request(Method::POST, "/api/v1/equipment", Some(request)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(app.store.forest_load_count(), 2);
}

#[tokio::test]
async fn test_spare_parts_and_cascading_delete() {
    let app = TestApp::new(true);
    let (id, _) = app.create_equipment("Operating table 1").await;

    for name in ["Hydraulic pump", "Control panel"] {
        let (status, part) = app
            .request(
                Method::POST,
                &format!("/api/v1/equipment/{}/spare-parts", id),
                Some(json!({"name": name})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        app.request(
            Method::POST,
            &format!("/api/v1/equipment/{}/maintenance-plans", id),
            Some(json!({"description": "replace part", "spare_part_id": part["id"]})),
        )
        .await;
    }
    app.request(
        Method::POST,
        &format!("/api/v1/equipment/{}/maintenance-plans", id),
        Some(json!({"description": "general check"})),
    )
    .await;

    let (status, report) = app.request(Method::DELETE, &format!("/api/v1/equipment/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["spare_parts"], 2);
    assert_eq!(report["spare_part_plans"], 2);
    assert_eq!(report["equipment_plans"], 1);
    assert_eq!(app.store.equipment_count(), 0);

    let (status, _) = app.request(Method::DELETE, &format!("/api/v1/equipment/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_assign_sla() {
    let app = TestApp::new(true);
    let (id, _) = app.create_equipment("Operating table 1").await;

    let (status, equipment) = app
        .request(Method::PUT, &format!("/api/v1/equipment/{}/sla/{}", id, app.sla_id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(equipment["sla_id"], app.sla_id.to_string());
}

#[tokio::test]
async fn test_service_transfer_publishes_and_records() {
    let app = TestApp::new(true);
    let (id, serial) = app.create_equipment("Operating table 1").await;
    app.receive(&serial).await;

    let (status, outcome) = app
        .request(
            Method::POST,
            &format!("/api/v1/equipment/{}/transfers/service", id),
            Some(json!({
                "new_service_id": "svc-icu",
                "description": "ICU needs it",
                "initiator": initiator()
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", outcome);
    assert_eq!(outcome["equipment"]["service_id"], "svc-icu");
    assert_eq!(outcome["degraded"], json!([]));

    let structured = app.events.on(EQUIPMENT_SERVICE_TRANSFER_TOPIC);
    assert_eq!(structured.len(), 1);
    assert_eq!(structured[0]["oldServiceName"], "Service svc-surgery");
    assert_eq!(structured[0]["newServiceName"], "Service svc-icu");
    assert_eq!(app.events.on(NOTIFICATION_TOPIC).len(), 1);

    let (_, history) = app
        .request(Method::GET, &format!("/api/v1/equipment/{}/transfers", id), None)
        .await;
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["transfer_type"], "INTER_SERVICE");
    assert_eq!(history[0]["initiated_by_name"], "Alan Turing");
}

#[tokio::test]
async fn test_hospital_transfer_with_directories_down() {
    let app = TestApp::new(false);
    let (id, serial) = app.create_equipment("Operating table 1").await;
    app.receive(&serial).await;

    let (status, outcome) = app
        .request(
            Method::POST,
            &format!("/api/v1/equipment/{}/transfers/hospital", id),
            Some(json!({
                "new_hospital_id": "h-2",
                "initiator": initiator()
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", outcome);
    assert_eq!(outcome["equipment"]["hospital_id"], "h-2");
    assert_eq!(outcome["equipment"]["reception"], false);
    assert_eq!(outcome["equipment"]["status"], "AWAITING_RECEPTION");
    assert_eq!(outcome["degraded"].as_array().unwrap().len(), 4);

    let structured = app.events.on(EQUIPMENT_HOSPITAL_TRANSFER_TOPIC);
    assert_eq!(structured[0]["oldHospitalName"], "unknown hospital name");
    assert_eq!(structured[0]["emailsToNotify"], json!(["alan@hospital.test"]));

    let (_, history) = app
        .request(Method::GET, &format!("/api/v1/equipment/{}/transfers", id), None)
        .await;
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["old_hospital_id"], "h-1");
}

#[tokio::test]
async fn test_transfer_of_unknown_equipment() {
    let app = TestApp::new(true);
    let (status, _) = app
        .request(
            Method::POST,
            &format!("/api/v1/equipment/{}/transfers/service", uuid::Uuid::new_v4()),
            Some(json!({"new_service_id": "svc-icu", "initiator": initiator()})),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(app.events.published().is_empty());
}
