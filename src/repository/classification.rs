//! Classification nomenclature repository

use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::classification::{build_forest, ClassificationNode, ClassificationRow},
};

#[derive(Clone)]
pub struct ClassificationRepository {
    pool: Pool<Postgres>,
}

impl ClassificationRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Load every node and rebuild the forest
    pub async fn load_forest(&self) -> AppResult<Vec<ClassificationNode>> {
        let rows = sqlx::query_as::<_, ClassificationRow>(
            "SELECT code, label, parent_code, position FROM classification_nodes",
        )
        .fetch_all(&self.pool)
        .await?;
        tracing::debug!("Loaded {} classification nodes", rows.len());
        Ok(build_forest(rows))
    }
}
