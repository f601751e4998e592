//! Spare part model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Spare part record, owned by one equipment unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SparePart {
    pub id: Uuid,
    pub equipment_id: Uuid,
    pub name: String,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub crea_date: Option<DateTime<Utc>>,
}

/// Create spare part request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateSparePart {
    /// Reuse an existing ID (upsert); generated when absent
    pub id: Option<Uuid>,
    #[validate(length(min = 1, message = "Spare part name cannot be empty"))]
    pub name: String,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

impl CreateSparePart {
    pub fn into_spare_part(self, equipment_id: Uuid) -> SparePart {
        SparePart {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            equipment_id,
            name: self.name,
            reference: self.reference,
            notes: self.notes,
            crea_date: Some(Utc::now()),
        }
    }
}
