//! Brand and SLA lookups

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Brand, Sla},
};

#[derive(Clone)]
pub struct ReferencesRepository {
    pool: Pool<Postgres>,
}

impl ReferencesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Find a brand by name, whatever hospital it belongs to
    pub async fn brand_by_name(&self, name: &str) -> AppResult<Option<Brand>> {
        let brand = sqlx::query_as::<_, Brand>(
            "SELECT id, name, hospital_id FROM brands WHERE name = $1 ORDER BY crea_date LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(brand)
    }

    /// Find a brand by name within a hospital
    pub async fn brand_by_name_and_hospital(&self, name: &str, hospital_id: &str) -> AppResult<Option<Brand>> {
        let brand = sqlx::query_as::<_, Brand>(
            "SELECT id, name, hospital_id FROM brands WHERE name = $1 AND hospital_id = $2 LIMIT 1",
        )
        .bind(name)
        .bind(hospital_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(brand)
    }

    /// Get SLA by ID
    pub async fn sla_by_id(&self, id: Uuid) -> AppResult<Option<Sla>> {
        let sla = sqlx::query_as::<_, Sla>(
            r#"
            SELECT id, name, hospital_id, response_time_hours, resolution_time_hours
            FROM slas WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(sla)
    }
}
