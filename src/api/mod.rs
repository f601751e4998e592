//! API handlers for the equipment REST endpoints

pub mod classification;
pub mod equipment;
pub mod health;
pub mod openapi;
pub mod transfers;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, AppState};

/// Raw bearer token of the caller, forwarded as-is to the directories
pub struct BearerToken(pub String);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        Ok(BearerToken(token.to_string()))
    }
}

/// Build the application router with all routes
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Equipment lifecycle
        .route("/equipment", post(equipment::create_equipment))
        .route("/equipment/awaiting-reception", get(equipment::list_awaiting_reception))
        .route("/equipment/serial/:serial", get(equipment::get_equipment_by_serial))
        .route("/equipment/serial/:serial/reception", put(equipment::receive_equipment))
        .route("/equipment/:id", get(equipment::get_equipment))
        .route("/equipment/:id", put(equipment::update_equipment))
        .route("/equipment/:id", delete(equipment::delete_equipment))
        .route("/equipment/:id/spare-parts", get(equipment::list_spare_parts))
        .route("/equipment/:id/spare-parts", post(equipment::add_spare_part))
        .route("/equipment/:id/spare-parts/:part_id", delete(equipment::remove_spare_part))
        .route("/equipment/:id/maintenance-plans", get(equipment::list_maintenance_plans))
        .route("/equipment/:id/maintenance-plans", post(equipment::add_maintenance_plan))
        .route("/equipment/:id/maintenance-plans", put(equipment::update_maintenance_plans))
        .route("/equipment/:id/sla/:sla_id", put(equipment::assign_sla))
        .route("/hospitals/:hospital_id/equipment", get(equipment::list_hospital_equipment))
        // Classification
        .route("/classification/reload", post(classification::reload_classification))
        // Transfers
        .route("/equipment/:id/transfers", get(transfers::list_transfers))
        .route("/equipment/:id/transfers/service", post(transfers::transfer_to_service))
        .route("/equipment/:id/transfers/hospital", post(transfers::transfer_to_hospital))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
