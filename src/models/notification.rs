//! Event payloads published on the message bus

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::SupervisorInfo;

pub const EQUIPMENT_SERVICE_TRANSFER_TOPIC: &str = "equipment-service-transfer-events";
pub const EQUIPMENT_HOSPITAL_TRANSFER_TOPIC: &str = "equipment-events";
pub const NOTIFICATION_TOPIC: &str = "notification-events";

/// Structured event for an inter-service transfer (consumed by the mail service)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentServiceTransferEvent {
    pub serial_code: String,
    pub equipment_name: String,
    pub description: Option<String>,
    pub old_service_name: String,
    pub new_service_name: String,
    pub initiator_first_name: String,
    pub initiator_last_name: String,
    pub initiator_email: String,
    pub old_supervisor: Option<SupervisorInfo>,
    pub new_supervisor: Option<SupervisorInfo>,
    pub emails_to_notify: Vec<String>,
}

/// Structured event for an inter-hospital transfer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentHospitalTransferEvent {
    pub serial_code: String,
    pub equipment_id: Uuid,
    pub equipment_name: String,
    pub description: Option<String>,
    pub old_hospital_id: String,
    pub old_hospital_name: String,
    pub new_hospital_id: String,
    pub new_hospital_name: String,
    pub initiator_first_name: String,
    pub initiator_last_name: String,
    pub initiator_email: String,
    pub emails_to_notify: Vec<String>,
}

/// Generic envelope consumed by the notification service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEvent {
    pub title: String,
    pub message: String,
    pub emails: Vec<String>,
}
