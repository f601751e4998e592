//! Maintenance plan reconciliation

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{MaintenancePlan, MaintenancePlanInput},
    repository::EquipmentStore,
};

/// Merges a submitted plan list into the stored plans of one equipment unit
pub struct PlanReconciler {
    store: Arc<dyn EquipmentStore>,
}

impl PlanReconciler {
    pub fn new(store: Arc<dyn EquipmentStore>) -> Self {
        Self { store }
    }

    /// Reject the submission unless every referenced spare part exists
    pub async fn check_spare_parts(&self, submitted: &[MaintenancePlanInput]) -> AppResult<()> {
        let mut ids: Vec<Uuid> = Vec::new();
        for id in submitted.iter().filter_map(|plan| plan.spare_part_id) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        if ids.is_empty() {
            return Ok(());
        }

        let found = self.store.spare_parts_find_by_ids(&ids).await?;
        if let Some(missing) = ids.iter().find(|id| !found.iter().any(|part| part.id == **id)) {
            return Err(AppError::InvalidReference(format!(
                "Spare part {} does not exist",
                missing
            )));
        }
        Ok(())
    }

    /// Apply `submitted` in input order and return the resulting plan list.
    ///
    /// A plan whose ID is already stored is overwritten in place (date,
    /// description, spare part). Any other plan is persisted as a new record
    /// owned by `equipment_id`, under its submitted ID when it has one.
    /// Stored plans missing from `submitted` are left untouched.
    ///
    /// Every lookup and reference check runs before the first write.
    pub async fn reconcile(
        &self,
        equipment_id: Uuid,
        submitted: Vec<MaintenancePlanInput>,
    ) -> AppResult<Vec<MaintenancePlan>> {
        self.check_spare_parts(&submitted).await?;

        let mut pending = Vec::with_capacity(submitted.len());
        let (mut updated, mut created) = (0usize, 0usize);

        for input in submitted {
            let existing = match input.id {
                Some(id) => self.store.maintenance_plan_get(id).await?,
                None => None,
            };

            let plan = match existing {
                Some(mut plan) => {
                    plan.maintenance_date = input.maintenance_date;
                    plan.description = input.description;
                    plan.spare_part_id = input.spare_part_id;
                    updated += 1;
                    plan
                }
                None => {
                    created += 1;
                    input.into_new_plan(equipment_id)
                }
            };
            pending.push(plan);
        }

        let mut result = Vec::with_capacity(pending.len());
        for plan in &pending {
            result.push(self.store.maintenance_plan_save(plan).await?);
        }

        tracing::debug!(
            "Reconciled maintenance plans of {}: {} updated, {} created",
            equipment_id,
            updated,
            created
        );
        Ok(result)
    }
}
