//! Equipment API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        equipment::{CascadeReport, CreateEquipment, Equipment, MessageResponse, ReceiveEquipment, UpdateEquipment},
        maintenance_plan::{MaintenancePlan, MaintenancePlanInput},
        spare_part::{CreateSparePart, SparePart},
    },
    AppState,
};

use super::BearerToken;

/// Register equipment
#[utoipa::path(
    post,
    path = "/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    request_body = CreateEquipment,
    responses(
        (status = 201, description = "Equipment created", body = MessageResponse),
        (status = 409, description = "Name already used", body = crate::error::ErrorResponse),
        (status = 422, description = "Unknown classification code", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_equipment(
    State(state): State<AppState>,
    BearerToken(_token): BearerToken,
    Json(data): Json<CreateEquipment>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    let equipment = state.services.equipment.create(data).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Equipment created", Some(equipment.id))),
    ))
}

/// Get equipment by ID
#[utoipa::path(
    get,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Equipment details", body = Equipment),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_equipment(
    State(state): State<AppState>,
    BearerToken(_token): BearerToken,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Equipment>> {
    let equipment = state.services.equipment.get(id).await?;
    Ok(Json(equipment))
}

/// Get equipment by serial code
#[utoipa::path(
    get,
    path = "/equipment/serial/{serial}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("serial" = String, Path, description = "Serial code")),
    responses(
        (status = 200, description = "Equipment details", body = Equipment),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_equipment_by_serial(
    State(state): State<AppState>,
    BearerToken(_token): BearerToken,
    Path(serial): Path<String>,
) -> AppResult<Json<Equipment>> {
    let equipment = state.services.equipment.get_by_serial_code(&serial).await?;
    Ok(Json(equipment))
}

/// Receive equipment and put it in service
#[utoipa::path(
    put,
    path = "/equipment/serial/{serial}/reception",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("serial" = String, Path, description = "Serial code")),
    request_body = ReceiveEquipment,
    responses(
        (status = 200, description = "Equipment received", body = MessageResponse),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Already received or name already used", body = crate::error::ErrorResponse),
        (status = 422, description = "Unknown brand or spare part", body = crate::error::ErrorResponse)
    )
)]
pub async fn receive_equipment(
    State(state): State<AppState>,
    BearerToken(_token): BearerToken,
    Path(serial): Path<String>,
    Json(data): Json<ReceiveEquipment>,
) -> AppResult<Json<MessageResponse>> {
    let equipment = state.services.equipment.receive(&serial, data).await?;
    Ok(Json(MessageResponse::new("Equipment received", Some(equipment.id))))
}

/// Update equipment
#[utoipa::path(
    put,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Equipment ID")),
    request_body = UpdateEquipment,
    responses(
        (status = 200, description = "Equipment updated", body = Equipment)
    )
)]
pub async fn update_equipment(
    State(state): State<AppState>,
    BearerToken(_token): BearerToken,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateEquipment>,
) -> AppResult<Json<Equipment>> {
    let equipment = state.services.equipment.update(id, data).await?;
    Ok(Json(equipment))
}

/// Delete equipment with its spare parts and maintenance plans
#[utoipa::path(
    delete,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Equipment deleted", body = CascadeReport),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_equipment(
    State(state): State<AppState>,
    BearerToken(_token): BearerToken,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CascadeReport>> {
    let report = state.services.equipment.delete(id).await?;
    Ok(Json(report))
}

/// List equipment awaiting reception
#[utoipa::path(
    get,
    path = "/equipment/awaiting-reception",
    tag = "equipment",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Equipment not yet received", body = Vec<Equipment>)
    )
)]
pub async fn list_awaiting_reception(
    State(state): State<AppState>,
    BearerToken(_token): BearerToken,
) -> AppResult<Json<Vec<Equipment>>> {
    let equipment = state.services.equipment.list_awaiting_reception().await?;
    Ok(Json(equipment))
}

/// List received equipment of a hospital
#[utoipa::path(
    get,
    path = "/hospitals/{hospital_id}/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("hospital_id" = String, Path, description = "Hospital ID")),
    responses(
        (status = 200, description = "Equipment in service at the hospital", body = Vec<Equipment>)
    )
)]
pub async fn list_hospital_equipment(
    State(state): State<AppState>,
    BearerToken(_token): BearerToken,
    Path(hospital_id): Path<String>,
) -> AppResult<Json<Vec<Equipment>>> {
    let equipment = state.services.equipment.list_by_hospital(&hospital_id).await?;
    Ok(Json(equipment))
}

/// List spare parts of an equipment
#[utoipa::path(
    get,
    path = "/equipment/{id}/spare-parts",
    tag = "spare-parts",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Spare parts", body = Vec<SparePart>)
    )
)]
pub async fn list_spare_parts(
    State(state): State<AppState>,
    BearerToken(_token): BearerToken,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<SparePart>>> {
    let parts = state.services.equipment.spare_parts(id).await?;
    Ok(Json(parts))
}

/// Add a spare part to an equipment
#[utoipa::path(
    post,
    path = "/equipment/{id}/spare-parts",
    tag = "spare-parts",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Equipment ID")),
    request_body = CreateSparePart,
    responses(
        (status = 201, description = "Spare part added", body = SparePart)
    )
)]
pub async fn add_spare_part(
    State(state): State<AppState>,
    BearerToken(_token): BearerToken,
    Path(id): Path<Uuid>,
    Json(data): Json<CreateSparePart>,
) -> AppResult<(StatusCode, Json<SparePart>)> {
    let part = state.services.equipment.add_spare_part(id, data).await?;
    Ok((StatusCode::CREATED, Json(part)))
}

/// Remove a spare part and the maintenance plans referencing it
#[utoipa::path(
    delete,
    path = "/equipment/{id}/spare-parts/{part_id}",
    tag = "spare-parts",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Equipment ID"),
        ("part_id" = Uuid, Path, description = "Spare part ID")
    ),
    responses(
        (status = 200, description = "Spare part removed", body = Equipment),
        (status = 404, description = "Equipment or spare part not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn remove_spare_part(
    State(state): State<AppState>,
    BearerToken(_token): BearerToken,
    Path((id, part_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<Equipment>> {
    let equipment = state.services.equipment.remove_spare_part(id, part_id).await?;
    Ok(Json(equipment))
}

/// List maintenance plans of an equipment
#[utoipa::path(
    get,
    path = "/equipment/{id}/maintenance-plans",
    tag = "maintenance-plans",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Maintenance plans", body = Vec<MaintenancePlan>)
    )
)]
pub async fn list_maintenance_plans(
    State(state): State<AppState>,
    BearerToken(_token): BearerToken,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<MaintenancePlan>>> {
    let plans = state.services.equipment.maintenance_plans(id).await?;
    Ok(Json(plans))
}

/// Add one maintenance plan to an equipment
#[utoipa::path(
    post,
    path = "/equipment/{id}/maintenance-plans",
    tag = "maintenance-plans",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Equipment ID")),
    request_body = MaintenancePlanInput,
    responses(
        (status = 201, description = "Maintenance plan added", body = MaintenancePlan)
    )
)]
pub async fn add_maintenance_plan(
    State(state): State<AppState>,
    BearerToken(_token): BearerToken,
    Path(id): Path<Uuid>,
    Json(data): Json<MaintenancePlanInput>,
) -> AppResult<(StatusCode, Json<MaintenancePlan>)> {
    let plan = state.services.equipment.add_maintenance_plan(id, data).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

/// Replace the maintenance plans of an equipment
#[utoipa::path(
    put,
    path = "/equipment/{id}/maintenance-plans",
    tag = "maintenance-plans",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Equipment ID")),
    request_body = Vec<MaintenancePlanInput>,
    responses(
        (status = 200, description = "Resulting maintenance plans", body = Vec<MaintenancePlan>)
    )
)]
pub async fn update_maintenance_plans(
    State(state): State<AppState>,
    BearerToken(_token): BearerToken,
    Path(id): Path<Uuid>,
    Json(data): Json<Vec<MaintenancePlanInput>>,
) -> AppResult<Json<Vec<MaintenancePlan>>> {
    let plans = state.services.equipment.update_maintenance_plans(id, data).await?;
    Ok(Json(plans))
}

/// Assign an SLA to an equipment
#[utoipa::path(
    put,
    path = "/equipment/{id}/sla/{sla_id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Equipment ID"),
        ("sla_id" = Uuid, Path, description = "SLA ID")
    ),
    responses(
        (status = 200, description = "SLA assigned", body = Equipment),
        (status = 404, description = "Equipment or SLA not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn assign_sla(
    State(state): State<AppState>,
    BearerToken(_token): BearerToken,
    Path((id, sla_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<Equipment>> {
    let equipment = state.services.equipment.assign_sla(id, sla_id).await?;
    Ok(Json(equipment))
}
