//! Preventive maintenance plan model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Maintenance plan record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MaintenancePlan {
    pub id: Uuid,
    pub equipment_id: Uuid,
    pub maintenance_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub spare_part_id: Option<Uuid>,
    pub crea_date: Option<DateTime<Utc>>,
    pub modif_date: Option<DateTime<Utc>>,
}

/// Submitted maintenance plan; a missing or empty `id` means "new"
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct MaintenancePlanInput {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub id: Option<Uuid>,
    pub maintenance_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub spare_part_id: Option<Uuid>,
}

impl MaintenancePlanInput {
    /// Materialize a brand-new record owned by `equipment_id`
    pub fn into_new_plan(self, equipment_id: Uuid) -> MaintenancePlan {
        let now = Utc::now();
        MaintenancePlan {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            equipment_id,
            maintenance_date: self.maintenance_date,
            description: self.description,
            spare_part_id: self.spare_part_id,
            crea_date: Some(now),
            modif_date: Some(now),
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => Uuid::parse_str(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
