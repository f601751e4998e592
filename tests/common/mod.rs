//! Shared fixtures for the router tests

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use equipment_service::{
    api,
    error::{AppError, AppResult},
    models::{Brand, ClassificationNode, Sla, UserDto},
    repository::{EquipmentStore, InMemoryStore},
    services::{
        directory::{HospitalDirectory, UserDirectory},
        events::InMemoryEventPublisher,
        Services,
    },
    AppConfig, AppState,
};

pub const TOKEN: &str = "test-token";

/// Directory answering from fixed data, or failing every call
pub struct StaticDirectory {
    pub available: bool,
}

fn directory_user(id: &str) -> UserDto {
    UserDto {
        id: id.to_string(),
        first_name: "Grace".to_string(),
        last_name: id.to_string(),
        email: format!("{}@hospital.test", id),
        roles: Vec::new(),
    }
}

impl StaticDirectory {
    fn check(&self) -> AppResult<()> {
        if self.available {
            Ok(())
        } else {
            Err(AppError::Directory("directory unavailable".to_string()))
        }
    }
}

#[async_trait]
impl UserDirectory for StaticDirectory {
    async fn service_supervisors(&self, _token: &str, service_id: &str) -> AppResult<Vec<UserDto>> {
        self.check()?;
        Ok(vec![directory_user(&format!("sup-{}", service_id))])
    }

    async fn hospital_admin(&self, _token: &str, hospital_id: &str) -> AppResult<Option<UserDto>> {
        self.check()?;
        Ok(Some(directory_user(&format!("admin-{}", hospital_id))))
    }

    async fn hospital_users_with_roles(
        &self,
        _token: &str,
        hospital_id: &str,
        _roles: &[String],
    ) -> AppResult<Vec<UserDto>> {
        self.check()?;
        Ok(vec![directory_user(&format!("eng-{}", hospital_id))])
    }
}

#[async_trait]
impl HospitalDirectory for StaticDirectory {
    async fn service_name(&self, _token: &str, service_id: &str) -> AppResult<Option<String>> {
        self.check()?;
        Ok(Some(format!("Service {}", service_id)))
    }

    async fn hospital_name(&self, _token: &str, hospital_id: &str) -> AppResult<Option<String>> {
        self.check()?;
        Ok(Some(format!("Hospital {}", hospital_id)))
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
    pub events: Arc<InMemoryEventPublisher>,
    pub sla_id: Uuid,
}

impl TestApp {
    pub fn new(directories_available: bool) -> Self {
        let store = InMemoryStore::new().with_forest(vec![ClassificationNode::new("Z", "Medical equipment")
            .with_children(vec![ClassificationNode::new("Z12", "Surgical equipment")
                .with_children(vec![ClassificationNode::new("Z1203", "Operating tables")])])]);
        store.add_brand(Brand {
            id: Uuid::new_v4(),
            name: "Maquet".to_string(),
            hospital_id: Some("h-1".to_string()),
        });
        let sla_id = Uuid::new_v4();
        store.add_sla(Sla {
            id: sla_id,
            name: "Premium".to_string(),
            hospital_id: Some("h-1".to_string()),
            response_time_hours: Some(4),
            resolution_time_hours: Some(48),
        });
        let store = Arc::new(store);
        let events = Arc::new(InMemoryEventPublisher::new());
        let directory = Arc::new(StaticDirectory {
            available: directories_available,
        });

        let dyn_store: Arc<dyn EquipmentStore> = store.clone();
        let services = Services::new(dyn_store, directory.clone(), directory, events.clone());
        let state = AppState {
            config: Arc::new(AppConfig::default()),
            services: Arc::new(services),
        };

        Self {
            router: api::router(state),
            store,
            events,
            sla_id,
        }
    }

    /// Send an authenticated request and decode the JSON response, if any
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send(method, uri, body, Some(TOKEN)).await
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    /// Register an equipment and return its ID and serial code
    pub async fn create_equipment(&self, name: &str) -> (String, String) {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/v1/equipment",
                Some(serde_json::json!({
                    "name": name,
                    "classification_code": "Z1203",
                    "lifespan": 15,
                    "risk_class": "IIa",
                    "hospital_id": "h-1"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        let id = body["id"].as_str().unwrap().to_string();

        let (_, equipment) = self.request(Method::GET, &format!("/api/v1/equipment/{}", id), None).await;
        let serial = equipment["serial_code"].as_str().unwrap().to_string();
        (id, serial)
    }

    pub async fn receive(&self, serial: &str) -> (StatusCode, Value) {
        self.request(
            Method::PUT,
            &format!("/api/v1/equipment/serial/{}/reception", serial),
            Some(serde_json::json!({
                "brand": "Maquet",
                "supplier": "MedSupply",
                "acquisition_date": "2026-01-15",
                "amount": "125000.50",
                "service_id": "svc-surgery"
            })),
        )
        .await
    }
}

pub fn initiator() -> Value {
    serde_json::json!({
        "id": "u-42",
        "firstName": "Alan",
        "lastName": "Turing",
        "email": "alan@hospital.test",
        "roles": ["ROLE_HOSPITAL_ADMIN"]
    })
}
