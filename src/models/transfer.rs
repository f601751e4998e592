//! Equipment transfers and their audit trail

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{equipment::Equipment, user::UserDto};
use crate::error::{AppError, DegradedNotification};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferType {
    InterService,
    InterHospital,
}

impl TransferType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferType::InterService => "INTER_SERVICE",
            TransferType::InterHospital => "INTER_HOSPITAL",
        }
    }
}

impl std::str::FromStr for TransferType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INTER_SERVICE" => Ok(TransferType::InterService),
            "INTER_HOSPITAL" => Ok(TransferType::InterHospital),
            other => Err(AppError::Internal(format!("Unknown transfer type {}", other))),
        }
    }
}

/// Append-only audit record of an ownership change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EquipmentTransferHistory {
    pub id: Uuid,
    pub equipment_id: Uuid,
    pub transfer_type: TransferType,
    pub old_service_id: Option<String>,
    pub new_service_id: Option<String>,
    pub old_hospital_id: Option<String>,
    pub new_hospital_id: Option<String>,
    pub description: Option<String>,
    pub initiated_by_user_id: String,
    pub initiated_by_name: String,
    pub created_at: DateTime<Utc>,
}

impl EquipmentTransferHistory {
    pub fn inter_service(
        equipment_id: Uuid,
        old_service_id: Option<String>,
        new_service_id: String,
        description: Option<String>,
        initiator: &UserDto,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            equipment_id,
            transfer_type: TransferType::InterService,
            old_service_id,
            new_service_id: Some(new_service_id),
            old_hospital_id: None,
            new_hospital_id: None,
            description,
            initiated_by_user_id: initiator.id.clone(),
            initiated_by_name: initiator.display_name(),
            created_at: Utc::now(),
        }
    }

    pub fn inter_hospital(
        equipment_id: Uuid,
        old_hospital_id: String,
        new_hospital_id: String,
        description: Option<String>,
        initiator: &UserDto,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            equipment_id,
            transfer_type: TransferType::InterHospital,
            old_service_id: None,
            new_service_id: None,
            old_hospital_id: Some(old_hospital_id),
            new_hospital_id: Some(new_hospital_id),
            description,
            initiated_by_user_id: initiator.id.clone(),
            initiated_by_name: initiator.display_name(),
            created_at: Utc::now(),
        }
    }
}

/// Move an equipment unit to another service of the same hospital
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ServiceTransferRequest {
    pub new_service_id: String,
    pub description: Option<String>,
    pub initiator: UserDto,
}

/// Move an equipment unit to another hospital
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct HospitalTransferRequest {
    pub new_hospital_id: String,
    pub description: Option<String>,
    pub initiator: UserDto,
}

/// Result of a transfer: the committed equipment state plus whatever
/// notification enrichment could not be resolved
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransferOutcome {
    pub equipment: Equipment,
    pub degraded: Vec<DegradedNotification>,
}
