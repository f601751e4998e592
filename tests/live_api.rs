//! Tests against a running server with its database, Redis and directories

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8085/api/v1";

fn token() -> String {
    std::env::var("EQUIPMENT_TEST_TOKEN").unwrap_or_else(|_| "dev-token".to_string())
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_create_and_fetch_equipment() {
    let client = Client::new();
    let name = format!("Live test monitor {}", uuid::Uuid::new_v4().simple());

    let response = client
        .post(format!("{}/equipment", BASE_URL))
        .bearer_auth(token())
        .json(&json!({
            "name": name,
            "classification_code": "Z12",
            "lifespan": 7,
            "risk_class": "IIb",
            "hospital_id": "h-1"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status().as_u16(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    let id = body["id"].as_str().expect("No id in response");

    let equipment: Value = client
        .get(format!("{}/equipment/{}", BASE_URL, id))
        .bearer_auth(token())
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(equipment["name"], name.as_str());
    assert_eq!(equipment["reception"], false);
}
