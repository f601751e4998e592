//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{classification, equipment, health, transfers};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Equipment Service API",
        version = "1.0.0",
        description = "Medical equipment tracking across a hospital network"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        // Equipment
        equipment::create_equipment,
        equipment::get_equipment,
        equipment::get_equipment_by_serial,
        equipment::receive_equipment,
        equipment::update_equipment,
        equipment::delete_equipment,
        equipment::list_awaiting_reception,
        equipment::list_hospital_equipment,
        equipment::assign_sla,
        // Spare parts
        equipment::list_spare_parts,
        equipment::add_spare_part,
        equipment::remove_spare_part,
        // Maintenance plans
        equipment::list_maintenance_plans,
        equipment::add_maintenance_plan,
        equipment::update_maintenance_plans,
        // Classification
        classification::reload_classification,
        // Transfers
        transfers::transfer_to_service,
        transfers::transfer_to_hospital,
        transfers::list_transfers,
    ),
    components(
        schemas(
            // Equipment
            crate::models::equipment::Equipment,
            crate::models::equipment::CreateEquipment,
            crate::models::equipment::ReceiveEquipment,
            crate::models::equipment::UpdateEquipment,
            crate::models::equipment::CascadeReport,
            crate::models::equipment::MessageResponse,
            crate::models::spare_part::SparePart,
            crate::models::spare_part::CreateSparePart,
            crate::models::maintenance_plan::MaintenancePlan,
            crate::models::maintenance_plan::MaintenancePlanInput,
            // Transfers
            crate::models::transfer::TransferType,
            crate::models::transfer::EquipmentTransferHistory,
            crate::models::transfer::ServiceTransferRequest,
            crate::models::transfer::HospitalTransferRequest,
            crate::models::transfer::TransferOutcome,
            crate::models::user::UserDto,
            crate::error::DegradedNotification,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "equipment", description = "Equipment registration, reception and updates"),
        (name = "spare-parts", description = "Spare parts of an equipment"),
        (name = "maintenance-plans", description = "Preventive maintenance plans"),
        (name = "classification", description = "Medical device nomenclature"),
        (name = "transfers", description = "Inter-service and inter-hospital transfers")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
