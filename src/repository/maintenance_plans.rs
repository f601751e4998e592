//! Maintenance plans repository

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::MaintenancePlan,
};

#[derive(Debug, FromRow)]
struct MaintenancePlanRow {
    id: Uuid,
    equipment_id: Uuid,
    maintenance_date: Option<NaiveDate>,
    description: Option<String>,
    spare_part_id: Option<Uuid>,
    crea_date: DateTime<Utc>,
    modif_date: DateTime<Utc>,
}

impl From<MaintenancePlanRow> for MaintenancePlan {
    fn from(row: MaintenancePlanRow) -> Self {
        MaintenancePlan {
            id: row.id,
            equipment_id: row.equipment_id,
            maintenance_date: row.maintenance_date,
            description: row.description,
            spare_part_id: row.spare_part_id,
            crea_date: Some(row.crea_date),
            modif_date: Some(row.modif_date),
        }
    }
}

#[derive(Clone)]
pub struct MaintenancePlansRepository {
    pool: Pool<Postgres>,
}

impl MaintenancePlansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get maintenance plan by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Option<MaintenancePlan>> {
        let row = sqlx::query_as::<_, MaintenancePlanRow>("SELECT * FROM maintenance_plans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(MaintenancePlan::from))
    }

    /// List maintenance plans owned by an equipment
    pub async fn list_by_equipment(&self, equipment_id: Uuid) -> AppResult<Vec<MaintenancePlan>> {
        let rows = sqlx::query_as::<_, MaintenancePlanRow>(
            "SELECT * FROM maintenance_plans WHERE equipment_id = $1 ORDER BY maintenance_date NULLS LAST, crea_date",
        )
        .bind(equipment_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(MaintenancePlan::from).collect())
    }

    /// Insert or update a maintenance plan
    pub async fn save(&self, plan: &MaintenancePlan) -> AppResult<MaintenancePlan> {
        let row = sqlx::query_as::<_, MaintenancePlanRow>(
            r#"
            INSERT INTO maintenance_plans (id, equipment_id, maintenance_date, description, spare_part_id)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                maintenance_date = EXCLUDED.maintenance_date,
                description = EXCLUDED.description,
                spare_part_id = EXCLUDED.spare_part_id,
                modif_date = NOW()
            RETURNING *
            "#,
        )
        .bind(plan.id)
        .bind(plan.equipment_id)
        .bind(plan.maintenance_date)
        .bind(&plan.description)
        .bind(plan.spare_part_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => AppError::InvalidReference(format!(
                "Maintenance plan {} references an unknown equipment or spare part",
                plan.id
            )),
            other => other.into(),
        })?;
        Ok(row.into())
    }
}
