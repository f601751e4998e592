//! Transfer history repository (append-only)

use chrono::{DateTime, Utc};
use sqlx::{FromRow, Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::EquipmentTransferHistory,
};

#[derive(Debug, FromRow)]
struct TransferHistoryRow {
    id: Uuid,
    equipment_id: Uuid,
    transfer_type: String,
    old_service_id: Option<String>,
    new_service_id: Option<String>,
    old_hospital_id: Option<String>,
    new_hospital_id: Option<String>,
    description: Option<String>,
    initiated_by_user_id: String,
    initiated_by_name: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<TransferHistoryRow> for EquipmentTransferHistory {
    type Error = AppError;

    fn try_from(row: TransferHistoryRow) -> Result<Self, Self::Error> {
        Ok(EquipmentTransferHistory {
            id: row.id,
            equipment_id: row.equipment_id,
            transfer_type: row.transfer_type.parse()?,
            old_service_id: row.old_service_id,
            new_service_id: row.new_service_id,
            old_hospital_id: row.old_hospital_id,
            new_hospital_id: row.new_hospital_id,
            description: row.description,
            initiated_by_user_id: row.initiated_by_user_id,
            initiated_by_name: row.initiated_by_name,
            created_at: row.created_at,
        })
    }
}

#[derive(Clone)]
pub struct TransferHistoryRepository {
    pool: Pool<Postgres>,
}

impl TransferHistoryRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Append a transfer record
    pub async fn append(&self, record: &EquipmentTransferHistory) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO equipment_transfer_history (
                id, equipment_id, transfer_type,
                old_service_id, new_service_id, old_hospital_id, new_hospital_id,
                description, initiated_by_user_id, initiated_by_name, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(record.id)
        .bind(record.equipment_id)
        .bind(record.transfer_type.as_str())
        .bind(&record.old_service_id)
        .bind(&record.new_service_id)
        .bind(&record.old_hospital_id)
        .bind(&record.new_hospital_id)
        .bind(&record.description)
        .bind(&record.initiated_by_user_id)
        .bind(&record.initiated_by_name)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Transfer history of an equipment, oldest first
    pub async fn list_by_equipment(&self, equipment_id: Uuid) -> AppResult<Vec<EquipmentTransferHistory>> {
        let rows = sqlx::query_as::<_, TransferHistoryRow>(
            "SELECT * FROM equipment_transfer_history WHERE equipment_id = $1 ORDER BY created_at",
        )
        .bind(equipment_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(EquipmentTransferHistory::try_from).collect()
    }
}
