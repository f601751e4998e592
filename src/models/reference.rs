//! Shared reference data: brands and service level agreements

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Equipment brand, optionally scoped to a hospital
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Brand {
    pub id: Uuid,
    pub name: String,
    pub hospital_id: Option<String>,
}

/// Service level agreement with a maintenance provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Sla {
    pub id: Uuid,
    pub name: String,
    pub hospital_id: Option<String>,
    pub response_time_hours: Option<i32>,
    pub resolution_time_hours: Option<i32>,
}
