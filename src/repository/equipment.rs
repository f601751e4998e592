//! Equipment repository for database operations

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{CascadeReport, Equipment},
};

#[derive(Debug, FromRow)]
struct EquipmentRow {
    id: Uuid,
    name: String,
    classification_code: String,
    serial_code: String,
    lifespan: i32,
    risk_class: String,
    hospital_id: String,
    service_id: Option<String>,
    brand_id: Option<Uuid>,
    supplier: Option<String>,
    acquisition_date: Option<NaiveDate>,
    start_date_warranty: Option<NaiveDate>,
    end_date_warranty: Option<NaiveDate>,
    amount: Option<Decimal>,
    sla_id: Option<Uuid>,
    spare_part_ids: Vec<Uuid>,
    maintenance_plan_ids: Vec<Uuid>,
    reception: bool,
    status: String,
    crea_date: DateTime<Utc>,
    modif_date: DateTime<Utc>,
}

impl From<EquipmentRow> for Equipment {
    fn from(row: EquipmentRow) -> Self {
        Equipment {
            id: row.id,
            name: row.name,
            classification_code: row.classification_code,
            serial_code: row.serial_code,
            lifespan: row.lifespan,
            risk_class: row.risk_class,
            hospital_id: row.hospital_id,
            service_id: row.service_id,
            brand_id: row.brand_id,
            supplier: row.supplier,
            acquisition_date: row.acquisition_date,
            start_date_warranty: row.start_date_warranty,
            end_date_warranty: row.end_date_warranty,
            amount: row.amount,
            sla_id: row.sla_id,
            spare_part_ids: row.spare_part_ids,
            maintenance_plan_ids: row.maintenance_plan_ids,
            reception: row.reception,
            status: row.status.into(),
            crea_date: Some(row.crea_date),
            modif_date: Some(row.modif_date),
        }
    }
}

#[derive(Clone)]
pub struct EquipmentRepository {
    pool: Pool<Postgres>,
}

impl EquipmentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get equipment by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Equipment>> {
        let row = sqlx::query_as::<_, EquipmentRow>("SELECT * FROM equipment WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Equipment::from))
    }

    /// Find equipment by its exact (case-sensitive) name
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<Equipment>> {
        let row = sqlx::query_as::<_, EquipmentRow>("SELECT * FROM equipment WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Equipment::from))
    }

    /// Find equipment by serial code
    pub async fn find_by_serial_code(&self, serial_code: &str) -> AppResult<Option<Equipment>> {
        let row = sqlx::query_as::<_, EquipmentRow>("SELECT * FROM equipment WHERE serial_code = $1")
            .bind(serial_code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Equipment::from))
    }

    /// List equipment of a hospital filtered on the reception flag
    pub async fn list_by_hospital(&self, hospital_id: &str, reception: bool) -> AppResult<Vec<Equipment>> {
        let rows = sqlx::query_as::<_, EquipmentRow>(
            "SELECT * FROM equipment WHERE hospital_id = $1 AND reception = $2 ORDER BY name",
        )
        .bind(hospital_id)
        .bind(reception)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Equipment::from).collect())
    }

    /// List every equipment still awaiting reception
    pub async fn list_not_received(&self) -> AppResult<Vec<Equipment>> {
        let rows = sqlx::query_as::<_, EquipmentRow>(
            "SELECT * FROM equipment WHERE reception = FALSE ORDER BY crea_date",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Equipment::from).collect())
    }

    /// Insert or update equipment
    pub async fn save(&self, equipment: &Equipment) -> AppResult<Equipment> {
        let row = sqlx::query_as::<_, EquipmentRow>(
            r#"
            INSERT INTO equipment (
                id, name, classification_code, serial_code, lifespan, risk_class,
                hospital_id, service_id, brand_id, supplier, acquisition_date,
                start_date_warranty, end_date_warranty, amount, sla_id,
                spare_part_ids, maintenance_plan_ids, reception, status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                classification_code = EXCLUDED.classification_code,
                lifespan = EXCLUDED.lifespan,
                risk_class = EXCLUDED.risk_class,
                hospital_id = EXCLUDED.hospital_id,
                service_id = EXCLUDED.service_id,
                brand_id = EXCLUDED.brand_id,
                supplier = EXCLUDED.supplier,
                acquisition_date = EXCLUDED.acquisition_date,
                start_date_warranty = EXCLUDED.start_date_warranty,
                end_date_warranty = EXCLUDED.end_date_warranty,
                amount = EXCLUDED.amount,
                sla_id = EXCLUDED.sla_id,
                spare_part_ids = EXCLUDED.spare_part_ids,
                maintenance_plan_ids = EXCLUDED.maintenance_plan_ids,
                reception = EXCLUDED.reception,
                status = EXCLUDED.status,
                modif_date = NOW()
            RETURNING *
            "#,
        )
        .bind(equipment.id)
        .bind(&equipment.name)
        .bind(&equipment.classification_code)
        .bind(&equipment.serial_code)
        .bind(equipment.lifespan)
        .bind(&equipment.risk_class)
        .bind(&equipment.hospital_id)
        .bind(&equipment.service_id)
        .bind(equipment.brand_id)
        .bind(&equipment.supplier)
        .bind(equipment.acquisition_date)
        .bind(equipment.start_date_warranty)
        .bind(equipment.end_date_warranty)
        .bind(equipment.amount)
        .bind(equipment.sla_id)
        .bind(equipment.spare_part_ids.as_slice())
        .bind(equipment.maintenance_plan_ids.as_slice())
        .bind(equipment.reception)
        .bind(equipment.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => AppError::Conflict(format!(
                "Equipment name or serial code already used: {}",
                equipment.name
            )),
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => AppError::InvalidReference(format!(
                "Equipment {} references an unknown brand or SLA",
                equipment.name
            )),
            other => other.into(),
        })?;
        Ok(row.into())
    }

    /// Delete equipment together with its spare parts and maintenance plans.
    ///
    /// Plans pointing at the spare parts go first, then the parts, then the
    /// plans attached directly, and the equipment row last.
    pub async fn delete_cascade(&self, id: Uuid) -> AppResult<CascadeReport> {
        let mut tx = self.pool.begin().await?;

        let spare_part_plans = sqlx::query(
            r#"
            DELETE FROM maintenance_plans
            WHERE spare_part_id IN (SELECT id FROM spare_parts WHERE equipment_id = $1)
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let spare_parts = sqlx::query("DELETE FROM spare_parts WHERE equipment_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let equipment_plans = sqlx::query("DELETE FROM maintenance_plans WHERE equipment_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM equipment WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            tx.rollback().await?;
            return Err(AppError::NotFound(format!("Equipment {} not found", id)));
        }

        tx.commit().await?;

        Ok(CascadeReport {
            spare_part_plans,
            spare_parts,
            equipment_plans,
        })
    }
}
