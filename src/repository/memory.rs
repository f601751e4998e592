//! In-memory `EquipmentStore`, for tests and local runs without PostgreSQL

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::EquipmentStore;
use crate::{
    error::{AppError, AppResult},
    models::{
        Brand, CascadeReport, ClassificationNode, Equipment, EquipmentTransferHistory,
        MaintenancePlan, Sla, SparePart,
    },
};

#[derive(Default)]
struct State {
    equipment: HashMap<Uuid, Equipment>,
    spare_parts: Vec<SparePart>,
    maintenance_plans: Vec<MaintenancePlan>,
    brands: Vec<Brand>,
    slas: Vec<Sla>,
    history: Vec<EquipmentTransferHistory>,
    forest: Vec<ClassificationNode>,
    writes: usize,
    forest_loads: usize,
}

/// Store keeping every record in process memory behind a single lock.
///
/// Each trait call takes the lock once, so cascades are atomic.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn with_forest(self, forest: Vec<ClassificationNode>) -> Self {
        self.replace_forest(forest);
        self
    }

    /// Swap the stored classification forest, as a nomenclature import would
    pub fn replace_forest(&self, forest: Vec<ClassificationNode>) {
        self.state().forest = forest;
    }

    pub fn add_brand(&self, brand: Brand) {
        self.state().brands.push(brand);
    }

    pub fn add_sla(&self, sla: Sla) {
        self.state().slas.push(sla);
    }

    /// Number of mutating calls served so far
    pub fn write_count(&self) -> usize {
        self.state().writes
    }

    /// Number of times the classification forest was read
    pub fn forest_load_count(&self) -> usize {
        self.state().forest_loads
    }

    pub fn equipment_count(&self) -> usize {
        self.state().equipment.len()
    }

    pub fn maintenance_plan_count(&self) -> usize {
        self.state().maintenance_plans.len()
    }

    pub fn spare_part_count(&self) -> usize {
        self.state().spare_parts.len()
    }
}

#[async_trait]
impl EquipmentStore for InMemoryStore {
    async fn equipment_get(&self, id: Uuid) -> AppResult<Option<Equipment>> {
        Ok(self.state().equipment.get(&id).cloned())
    }

    async fn equipment_find_by_name(&self, name: &str) -> AppResult<Option<Equipment>> {
        Ok(self.state().equipment.values().find(|e| e.name == name).cloned())
    }

    async fn equipment_find_by_serial_code(&self, serial_code: &str) -> AppResult<Option<Equipment>> {
        Ok(self
            .state()
            .equipment
            .values()
            .find(|e| e.serial_code == serial_code)
            .cloned())
    }

    async fn equipment_list_by_hospital(&self, hospital_id: &str, reception: bool) -> AppResult<Vec<Equipment>> {
        let mut found: Vec<Equipment> = self
            .state()
            .equipment
            .values()
            .filter(|e| e.hospital_id == hospital_id && e.reception == reception)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    async fn equipment_list_not_received(&self) -> AppResult<Vec<Equipment>> {
        let mut found: Vec<Equipment> = self
            .state()
            .equipment
            .values()
            .filter(|e| !e.reception)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.crea_date.cmp(&b.crea_date).then_with(|| a.name.cmp(&b.name)));
        Ok(found)
    }

    async fn equipment_save(&self, equipment: &Equipment) -> AppResult<Equipment> {
        let mut state = self.state();
        if state
            .equipment
            .values()
            .any(|e| e.id != equipment.id && (e.name == equipment.name || e.serial_code == equipment.serial_code))
        {
            return Err(AppError::Conflict(format!(
                "Equipment name or serial code already used: {}",
                equipment.name
            )));
        }

        let now = Utc::now();
        let mut saved = equipment.clone();
        saved.modif_date = Some(now);
        if let Some(existing) = state.equipment.get(&equipment.id) {
            saved.serial_code = existing.serial_code.clone();
            saved.crea_date = existing.crea_date;
        } else if saved.crea_date.is_none() {
            saved.crea_date = Some(now);
        }

        state.writes += 1;
        state.equipment.insert(saved.id, saved.clone());
        Ok(saved)
    }

    async fn equipment_delete_cascade(&self, id: Uuid) -> AppResult<CascadeReport> {
        let mut state = self.state();
        if !state.equipment.contains_key(&id) {
            return Err(AppError::NotFound(format!("Equipment {} not found", id)));
        }

        let part_ids: Vec<Uuid> = state
            .spare_parts
            .iter()
            .filter(|p| p.equipment_id == id)
            .map(|p| p.id)
            .collect();

        let before = state.maintenance_plans.len();
        state
            .maintenance_plans
            .retain(|plan| !plan.spare_part_id.is_some_and(|part| part_ids.contains(&part)));
        let spare_part_plans = (before - state.maintenance_plans.len()) as u64;

        let before = state.spare_parts.len();
        state.spare_parts.retain(|p| p.equipment_id != id);
        let spare_parts = (before - state.spare_parts.len()) as u64;

        let before = state.maintenance_plans.len();
        state.maintenance_plans.retain(|plan| plan.equipment_id != id);
        let equipment_plans = (before - state.maintenance_plans.len()) as u64;

        state.equipment.remove(&id);
        state.writes += 1;

        Ok(CascadeReport {
            spare_part_plans,
            spare_parts,
            equipment_plans,
        })
    }

    async fn spare_parts_find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<SparePart>> {
        Ok(self
            .state()
            .spare_parts
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn spare_parts_by_equipment(&self, equipment_id: Uuid) -> AppResult<Vec<SparePart>> {
        Ok(self
            .state()
            .spare_parts
            .iter()
            .filter(|p| p.equipment_id == equipment_id)
            .cloned()
            .collect())
    }

    async fn spare_part_save(&self, spare_part: &SparePart) -> AppResult<SparePart> {
        let mut state = self.state();
        if !state.equipment.contains_key(&spare_part.equipment_id) {
            return Err(AppError::InvalidReference(format!(
                "Spare part {} references unknown equipment {}",
                spare_part.id, spare_part.equipment_id
            )));
        }

        let position = state.spare_parts.iter().position(|p| p.id == spare_part.id);
        if let Some(idx) = position {
            if state.spare_parts[idx].equipment_id != spare_part.equipment_id {
                return Err(AppError::Conflict(format!(
                    "Spare part {} belongs to another equipment",
                    spare_part.id
                )));
            }
        }

        state.writes += 1;
        match position {
            Some(idx) => state.spare_parts[idx] = spare_part.clone(),
            None => state.spare_parts.push(spare_part.clone()),
        }
        Ok(spare_part.clone())
    }

    async fn spare_part_delete_cascade(&self, id: Uuid) -> AppResult<Vec<Uuid>> {
        let mut state = self.state();
        let removed: Vec<Uuid> = state
            .maintenance_plans
            .iter()
            .filter(|plan| plan.spare_part_id == Some(id))
            .map(|plan| plan.id)
            .collect();
        state.maintenance_plans.retain(|plan| plan.spare_part_id != Some(id));
        state.spare_parts.retain(|p| p.id != id);
        state.writes += 1;
        Ok(removed)
    }

    async fn maintenance_plan_get(&self, id: Uuid) -> AppResult<Option<MaintenancePlan>> {
        Ok(self
            .state()
            .maintenance_plans
            .iter()
            .find(|plan| plan.id == id)
            .cloned())
    }

    async fn maintenance_plans_by_equipment(&self, equipment_id: Uuid) -> AppResult<Vec<MaintenancePlan>> {
        Ok(self
            .state()
            .maintenance_plans
            .iter()
            .filter(|plan| plan.equipment_id == equipment_id)
            .cloned()
            .collect())
    }

    async fn maintenance_plan_save(&self, plan: &MaintenancePlan) -> AppResult<MaintenancePlan> {
        let mut state = self.state();
        if !state.equipment.contains_key(&plan.equipment_id) {
            return Err(AppError::InvalidReference(format!(
                "Maintenance plan {} references unknown equipment {}",
                plan.id, plan.equipment_id
            )));
        }
        if let Some(part_id) = plan.spare_part_id {
            if !state.spare_parts.iter().any(|p| p.id == part_id) {
                return Err(AppError::InvalidReference(format!(
                    "Maintenance plan {} references unknown spare part {}",
                    plan.id, part_id
                )));
            }
        }

        state.writes += 1;
        let mut saved = plan.clone();
        saved.modif_date = Some(Utc::now());
        match state.maintenance_plans.iter().position(|p| p.id == plan.id) {
            Some(idx) => state.maintenance_plans[idx] = saved.clone(),
            None => state.maintenance_plans.push(saved.clone()),
        }
        Ok(saved)
    }

    async fn brand_find_by_name(&self, name: &str) -> AppResult<Option<Brand>> {
        Ok(self.state().brands.iter().find(|b| b.name == name).cloned())
    }

    async fn brand_find_by_name_and_hospital(&self, name: &str, hospital_id: &str) -> AppResult<Option<Brand>> {
        Ok(self
            .state()
            .brands
            .iter()
            .find(|b| b.name == name && b.hospital_id.as_deref() == Some(hospital_id))
            .cloned())
    }

    async fn sla_get(&self, id: Uuid) -> AppResult<Option<Sla>> {
        Ok(self.state().slas.iter().find(|s| s.id == id).cloned())
    }

    async fn transfer_history_append(&self, record: &EquipmentTransferHistory) -> AppResult<()> {
        let mut state = self.state();
        state.writes += 1;
        state.history.push(record.clone());
        Ok(())
    }

    async fn transfer_history_by_equipment(&self, equipment_id: Uuid) -> AppResult<Vec<EquipmentTransferHistory>> {
        Ok(self
            .state()
            .history
            .iter()
            .filter(|h| h.equipment_id == equipment_id)
            .cloned()
            .collect())
    }

    async fn classification_forest(&self) -> AppResult<Vec<ClassificationNode>> {
        let mut state = self.state();
        state.forest_loads += 1;
        Ok(state.forest.clone())
    }
}
