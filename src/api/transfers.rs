//! Transfer API endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::transfer::{
        EquipmentTransferHistory, HospitalTransferRequest, ServiceTransferRequest, TransferOutcome,
    },
    AppState,
};

use super::BearerToken;

/// Move equipment to another service
#[utoipa::path(
    post,
    path = "/equipment/{id}/transfers/service",
    tag = "transfers",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Equipment ID")),
    request_body = ServiceTransferRequest,
    responses(
        (status = 200, description = "Equipment transferred", body = TransferOutcome),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn transfer_to_service(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(id): Path<Uuid>,
    Json(data): Json<ServiceTransferRequest>,
) -> AppResult<Json<TransferOutcome>> {
    let outcome = state.services.transfers.transfer_to_service(id, data, &token).await?;
    Ok(Json(outcome))
}

/// Move equipment to another hospital
#[utoipa::path(
    post,
    path = "/equipment/{id}/transfers/hospital",
    tag = "transfers",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Equipment ID")),
    request_body = HospitalTransferRequest,
    responses(
        (status = 200, description = "Equipment transferred, awaiting reception", body = TransferOutcome),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn transfer_to_hospital(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(id): Path<Uuid>,
    Json(data): Json<HospitalTransferRequest>,
) -> AppResult<Json<TransferOutcome>> {
    let outcome = state.services.transfers.transfer_to_hospital(id, data, &token).await?;
    Ok(Json(outcome))
}

/// Transfer history of an equipment
#[utoipa::path(
    get,
    path = "/equipment/{id}/transfers",
    tag = "transfers",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Transfer history, oldest first", body = Vec<EquipmentTransferHistory>)
    )
)]
pub async fn list_transfers(
    State(state): State<AppState>,
    BearerToken(_token): BearerToken,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<EquipmentTransferHistory>>> {
    let history = state.services.transfers.history(id).await?;
    Ok(Json(history))
}
