//! Equipment model

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Lifecycle status of an equipment unit.
///
/// Only the first two states are load-bearing; anything set administratively
/// after reception (maintenance, decommissioned, ...) lands in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EquipmentStatus {
    AwaitingReception,
    InService,
    Other(String),
}

impl EquipmentStatus {
    pub const AWAITING_RECEPTION: &'static str = "AWAITING_RECEPTION";
    pub const IN_SERVICE: &'static str = "IN_SERVICE";

    pub fn as_str(&self) -> &str {
        match self {
            EquipmentStatus::AwaitingReception => Self::AWAITING_RECEPTION,
            EquipmentStatus::InService => Self::IN_SERVICE,
            EquipmentStatus::Other(text) => text,
        }
    }
}

impl From<String> for EquipmentStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            Self::AWAITING_RECEPTION => EquipmentStatus::AwaitingReception,
            Self::IN_SERVICE => EquipmentStatus::InService,
            _ => EquipmentStatus::Other(value),
        }
    }
}

impl From<EquipmentStatus> for String {
    fn from(status: EquipmentStatus) -> Self {
        match status {
            EquipmentStatus::Other(text) => text,
            known => known.as_str().to_string(),
        }
    }
}

impl Default for EquipmentStatus {
    fn default() -> Self {
        EquipmentStatus::AwaitingReception
    }
}

impl std::fmt::Display for EquipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Equipment record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Equipment {
    pub id: Uuid,
    /// Globally unique, case-sensitive
    pub name: String,
    /// Code of the classification node (EMDN nomenclature)
    pub classification_code: String,
    /// 10 uppercase alphanumeric characters, assigned once at creation
    pub serial_code: String,
    pub lifespan: i32,
    pub risk_class: String,
    pub hospital_id: String,
    pub service_id: Option<String>,
    pub brand_id: Option<Uuid>,
    pub supplier: Option<String>,
    pub acquisition_date: Option<NaiveDate>,
    pub start_date_warranty: Option<NaiveDate>,
    pub end_date_warranty: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    pub sla_id: Option<Uuid>,
    pub spare_part_ids: Vec<Uuid>,
    pub maintenance_plan_ids: Vec<Uuid>,
    pub reception: bool,
    #[schema(value_type = String, example = "AWAITING_RECEPTION")]
    pub status: EquipmentStatus,
    pub crea_date: Option<DateTime<Utc>>,
    pub modif_date: Option<DateTime<Utc>>,
}

impl Equipment {
    /// Add a spare part reference unless it is already listed
    pub fn attach_spare_part(&mut self, spare_part_id: Uuid) -> bool {
        if self.spare_part_ids.contains(&spare_part_id) {
            return false;
        }
        self.spare_part_ids.push(spare_part_id);
        true
    }

    /// Flip the unit back to the initial state, awaiting physical reception
    pub fn reset_reception(&mut self) {
        self.reception = false;
        self.status = EquipmentStatus::AwaitingReception;
    }

    pub fn mark_received(&mut self) {
        self.reception = true;
        self.status = EquipmentStatus::InService;
    }
}

/// Create equipment request (registration by the ministry)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateEquipment {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: String,
    pub classification_code: String,
    #[validate(range(min = 1, message = "Lifespan must be positive"))]
    pub lifespan: i32,
    pub risk_class: String,
    pub hospital_id: String,
}

/// Reception request, applied once the unit physically arrives
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ReceiveEquipment {
    /// New name; must not collide with another equipment
    pub name: Option<String>,
    /// Brand name, must already exist
    pub brand: String,
    pub supplier: Option<String>,
    pub acquisition_date: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    pub start_date_warranty: Option<NaiveDate>,
    pub end_date_warranty: Option<NaiveDate>,
    pub service_id: Option<String>,
    pub sla_id: Option<Uuid>,
    pub spare_part_ids: Option<Vec<Uuid>>,
}

/// Full update request (administrative correction)
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateEquipment {
    pub name: String,
    pub classification_code: Option<String>,
    pub lifespan: Option<i32>,
    pub risk_class: Option<String>,
    pub hospital_id: String,
    pub service_id: Option<String>,
    /// Brand name, looked up within `hospital_id`
    pub brand: String,
    pub supplier: Option<String>,
    pub acquisition_date: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    pub start_date_warranty: Option<NaiveDate>,
    pub end_date_warranty: Option<NaiveDate>,
    pub spare_part_ids: Option<Vec<Uuid>>,
    pub sla_id: Option<Uuid>,
    #[schema(value_type = String)]
    pub status: EquipmentStatus,
    pub reception: bool,
}

/// Rows removed by an equipment deletion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct CascadeReport {
    /// Maintenance plans referencing one of the equipment's spare parts
    pub spare_part_plans: u64,
    pub spare_parts: u64,
    /// Maintenance plans attached to the equipment itself
    pub equipment_plans: u64,
}

/// Confirmation message, optionally carrying the affected ID
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
    pub id: Option<Uuid>,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>, id: Option<Uuid>) -> Self {
        Self {
            message: message.into(),
            id,
        }
    }
}
