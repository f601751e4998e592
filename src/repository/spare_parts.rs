//! Spare parts repository

use chrono::{DateTime, Utc};
use sqlx::{FromRow, Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::SparePart,
};

#[derive(Debug, FromRow)]
struct SparePartRow {
    id: Uuid,
    equipment_id: Uuid,
    name: String,
    reference: Option<String>,
    notes: Option<String>,
    crea_date: DateTime<Utc>,
}

impl From<SparePartRow> for SparePart {
    fn from(row: SparePartRow) -> Self {
        SparePart {
            id: row.id,
            equipment_id: row.equipment_id,
            name: row.name,
            reference: row.reference,
            notes: row.notes,
            crea_date: Some(row.crea_date),
        }
    }
}

#[derive(Clone)]
pub struct SparePartsRepository {
    pool: Pool<Postgres>,
}

impl SparePartsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Fetch the spare parts matching any of the given IDs
    pub async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<SparePart>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, SparePartRow>("SELECT * FROM spare_parts WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(SparePart::from).collect())
    }

    /// List spare parts owned by an equipment
    pub async fn list_by_equipment(&self, equipment_id: Uuid) -> AppResult<Vec<SparePart>> {
        let rows = sqlx::query_as::<_, SparePartRow>(
            "SELECT * FROM spare_parts WHERE equipment_id = $1 ORDER BY crea_date",
        )
        .bind(equipment_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(SparePart::from).collect())
    }

    /// Insert or update a spare part.
    ///
    /// An existing part is only updated in place when it already belongs to
    /// the same equipment.
    pub async fn save(&self, spare_part: &SparePart) -> AppResult<SparePart> {
        let row = sqlx::query_as::<_, SparePartRow>(
            r#"
            INSERT INTO spare_parts (id, equipment_id, name, reference, notes)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                reference = EXCLUDED.reference,
                notes = EXCLUDED.notes
            WHERE spare_parts.equipment_id = EXCLUDED.equipment_id
            RETURNING *
            "#,
        )
        .bind(spare_part.id)
        .bind(spare_part.equipment_id)
        .bind(&spare_part.name)
        .bind(&spare_part.reference)
        .bind(&spare_part.notes)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => AppError::InvalidReference(format!(
                "Spare part {} references unknown equipment {}",
                spare_part.id, spare_part.equipment_id
            )),
            other => other.into(),
        })?;

        row.map(SparePart::from).ok_or_else(|| {
            AppError::Conflict(format!("Spare part {} belongs to another equipment", spare_part.id))
        })
    }

    /// Delete a spare part and the maintenance plans referencing it
    pub async fn delete_cascade(&self, id: Uuid) -> AppResult<Vec<Uuid>> {
        let mut tx = self.pool.begin().await?;

        let plan_ids = sqlx::query_scalar::<_, Uuid>(
            "DELETE FROM maintenance_plans WHERE spare_part_id = $1 RETURNING id",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM spare_parts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(plan_ids)
    }
}
