//! Equipment lifecycle service

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use super::{
    classification::ClassificationResolver, locks::KeyedLocks, maintenance_plans::PlanReconciler,
};
use crate::{
    error::{AppError, AppResult},
    models::{
        equipment::{CreateEquipment, ReceiveEquipment, UpdateEquipment},
        spare_part::CreateSparePart,
        CascadeReport, Equipment, EquipmentStatus, MaintenancePlan, MaintenancePlanInput,
        SparePart,
    },
    repository::EquipmentStore,
};

const SERIAL_CODE_LEN: usize = 10;
const SERIAL_CODE_ATTEMPTS: usize = 5;

/// 10 uppercase hex characters taken from a random UUID
pub fn generate_serial_code() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    hex[..SERIAL_CODE_LEN].to_uppercase()
}

/// Keep the first occurrence of each ID
fn dedup_ids(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut unique = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(&id) {
            unique.push(id);
        }
    }
    unique
}

fn required<'a>(value: &'a Option<String>, field: &str) -> AppResult<&'a str> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::InvalidArgument(format!("{} is required", field))),
    }
}

#[derive(Clone)]
pub struct EquipmentService {
    store: Arc<dyn EquipmentStore>,
    resolver: Arc<ClassificationResolver>,
    reconciler: Arc<PlanReconciler>,
    locks: Arc<KeyedLocks>,
}

impl EquipmentService {
    pub fn new(store: Arc<dyn EquipmentStore>, resolver: Arc<ClassificationResolver>) -> Self {
        Self {
            reconciler: Arc::new(PlanReconciler::new(store.clone())),
            store,
            resolver,
            locks: Arc::new(KeyedLocks::new()),
        }
    }

    async fn load(&self, id: Uuid) -> AppResult<Equipment> {
        self.store
            .equipment_get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    /// Reject `name` if another equipment already carries it
    async fn ensure_name_free(&self, name: &str, owner: Option<Uuid>) -> AppResult<()> {
        match self.store.equipment_find_by_name(name).await? {
            Some(existing) if Some(existing.id) != owner => Err(AppError::Conflict(format!(
                "An equipment named {} already exists",
                name
            ))),
            _ => Ok(()),
        }
    }

    async fn ensure_classification(&self, code: &str) -> AppResult<()> {
        if self.resolver.resolve(code).await?.is_none() {
            return Err(AppError::InvalidReference(format!(
                "Unknown classification code {}",
                code
            )));
        }
        Ok(())
    }

    async fn fresh_serial_code(&self) -> AppResult<String> {
        for _ in 0..SERIAL_CODE_ATTEMPTS {
            let candidate = generate_serial_code();
            if self.store.equipment_find_by_serial_code(&candidate).await?.is_none() {
                return Ok(candidate);
            }
            tracing::warn!("Serial code {} already taken, drawing another", candidate);
        }
        Err(AppError::Internal(format!(
            "No free serial code after {} attempts",
            SERIAL_CODE_ATTEMPTS
        )))
    }

    /// Register a new unit, awaiting reception
    pub async fn create(&self, data: CreateEquipment) -> AppResult<Equipment> {
        data.validate()?;
        self.ensure_name_free(&data.name, None).await?;
        self.ensure_classification(&data.classification_code).await?;
        let serial_code = self.fresh_serial_code().await?;

        let now = Utc::now();
        let equipment = Equipment {
            id: Uuid::new_v4(),
            name: data.name,
            classification_code: data.classification_code,
            serial_code,
            lifespan: data.lifespan,
            risk_class: data.risk_class,
            hospital_id: data.hospital_id,
            service_id: None,
            brand_id: None,
            supplier: None,
            acquisition_date: None,
            start_date_warranty: None,
            end_date_warranty: None,
            amount: None,
            sla_id: None,
            spare_part_ids: Vec::new(),
            maintenance_plan_ids: Vec::new(),
            reception: false,
            status: EquipmentStatus::AwaitingReception,
            crea_date: Some(now),
            modif_date: Some(now),
        };

        let saved = self.store.equipment_save(&equipment).await?;
        tracing::info!("Equipment {} created with serial code {}", saved.id, saved.serial_code);
        Ok(saved)
    }

    /// Accept a unit physically and put it in service
    pub async fn receive(&self, serial_code: &str, data: ReceiveEquipment) -> AppResult<Equipment> {
        let found = self
            .store
            .equipment_find_by_serial_code(serial_code)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No equipment with serial code {}", serial_code)))?;

        let _guard = self.locks.lock(found.id).await;
        let mut equipment = self.load(found.id).await?;

        if equipment.reception {
            return Err(AppError::AlreadyReceived(format!(
                "Equipment {} has already been received",
                serial_code
            )));
        }

        if let Some(name) = data.name.as_deref() {
            self.ensure_name_free(name, Some(equipment.id)).await?;
        }

        let brand = self
            .store
            .brand_find_by_name(&data.brand)
            .await?
            .ok_or_else(|| AppError::InvalidReference(format!("Unknown brand {}", data.brand)))?;

        let spare_part_ids = match data.spare_part_ids {
            Some(ids) if !ids.is_empty() => {
                let ids = dedup_ids(ids);
                let found = self.store.spare_parts_find_by_ids(&ids).await?;
                if found.len() != ids.len() {
                    return Err(AppError::InvalidReference(
                        "Some spare parts do not exist".to_string(),
                    ));
                }
                Some(ids)
            }
            _ => None,
        };

        if let Some(name) = data.name {
            equipment.name = name;
        }
        equipment.brand_id = Some(brand.id);
        equipment.mark_received();
        equipment.supplier = data.supplier;
        equipment.acquisition_date = data.acquisition_date;
        equipment.amount = data.amount;
        equipment.start_date_warranty = data.start_date_warranty;
        equipment.end_date_warranty = data.end_date_warranty;
        equipment.service_id = data.service_id;
        equipment.sla_id = data.sla_id;
        if let Some(ids) = spare_part_ids {
            equipment.spare_part_ids = ids;
        }

        let saved = self.store.equipment_save(&equipment).await?;
        tracing::info!("Equipment {} received", saved.id);
        Ok(saved)
    }

    /// Administrative update replacing every mutable field
    pub async fn update(&self, id: Uuid, data: UpdateEquipment) -> AppResult<Equipment> {
        let _guard = self.locks.lock(id).await;
        let mut equipment = self.load(id).await?;

        if data.name.trim().is_empty() {
            return Err(AppError::InvalidArgument("name is required".to_string()));
        }
        let classification_code = required(&data.classification_code, "classification_code")?.to_string();
        let risk_class = required(&data.risk_class, "risk_class")?.to_string();
        let lifespan = match data.lifespan {
            Some(lifespan) if lifespan > 0 => lifespan,
            _ => return Err(AppError::InvalidArgument("lifespan must be positive".to_string())),
        };
        if data.reception && data.status == EquipmentStatus::AwaitingReception {
            return Err(AppError::InvalidArgument(
                "a received equipment cannot be awaiting reception".to_string(),
            ));
        }

        self.ensure_name_free(&data.name, Some(id)).await?;
        self.ensure_classification(&classification_code).await?;
        let brand = self
            .store
            .brand_find_by_name_and_hospital(&data.brand, &data.hospital_id)
            .await?
            .ok_or_else(|| {
                AppError::InvalidReference(format!(
                    "Unknown brand {} for hospital {}",
                    data.brand, data.hospital_id
                ))
            })?;

        equipment.name = data.name;
        equipment.classification_code = classification_code;
        equipment.lifespan = lifespan;
        equipment.risk_class = risk_class;
        equipment.hospital_id = data.hospital_id;
        equipment.service_id = data.service_id;
        equipment.brand_id = Some(brand.id);
        equipment.supplier = data.supplier;
        equipment.acquisition_date = data.acquisition_date;
        equipment.amount = data.amount;
        equipment.start_date_warranty = data.start_date_warranty;
        equipment.end_date_warranty = data.end_date_warranty;
        if let Some(ids) = data.spare_part_ids {
            equipment.spare_part_ids = dedup_ids(ids);
        }
        equipment.sla_id = data.sla_id;
        equipment.status = data.status;
        equipment.reception = data.reception;

        let saved = self.store.equipment_save(&equipment).await?;
        tracing::info!("Equipment {} updated", saved.id);
        Ok(saved)
    }

    /// Attach one maintenance plan to the equipment
    pub async fn add_maintenance_plan(&self, id: Uuid, input: MaintenancePlanInput) -> AppResult<MaintenancePlan> {
        let _guard = self.locks.lock(id).await;
        let mut equipment = self.load(id).await?;
        self.reconciler.check_spare_parts(std::slice::from_ref(&input)).await?;

        let plan = self.store.maintenance_plan_save(&input.into_new_plan(id)).await?;
        equipment.maintenance_plan_ids.push(plan.id);
        self.store.equipment_save(&equipment).await?;

        tracing::info!("Maintenance plan {} added to equipment {}", plan.id, id);
        Ok(plan)
    }

    pub async fn add_spare_part(&self, id: Uuid, data: CreateSparePart) -> AppResult<SparePart> {
        data.validate()?;
        let _guard = self.locks.lock(id).await;
        let mut equipment = self.load(id).await?;

        if let Some(part_id) = data.id {
            let existing = self.store.spare_parts_find_by_ids(&[part_id]).await?;
            if let Some(other) = existing.iter().find(|part| part.equipment_id != id) {
                return Err(AppError::Conflict(format!(
                    "Spare part {} belongs to equipment {}",
                    part_id, other.equipment_id
                )));
            }
        }

        let part = self.store.spare_part_save(&data.into_spare_part(id)).await?;
        if equipment.attach_spare_part(part.id) {
            self.store.equipment_save(&equipment).await?;
        }

        tracing::info!("Spare part {} added to equipment {}", part.id, id);
        Ok(part)
    }

    /// Delete a spare part of the equipment with the plans referencing it
    pub async fn remove_spare_part(&self, id: Uuid, part_id: Uuid) -> AppResult<Equipment> {
        let _guard = self.locks.lock(id).await;
        let mut equipment = self.load(id).await?;

        let owned = self
            .store
            .spare_parts_by_equipment(id)
            .await?
            .iter()
            .any(|part| part.id == part_id);
        if !owned {
            return Err(AppError::NotFound(format!(
                "Spare part {} not found on equipment {}",
                part_id, id
            )));
        }

        let removed_plans = self.store.spare_part_delete_cascade(part_id).await?;
        equipment.spare_part_ids.retain(|p| *p != part_id);
        equipment.maintenance_plan_ids.retain(|p| !removed_plans.contains(p));
        let saved = self.store.equipment_save(&equipment).await?;

        tracing::info!(
            "Spare part {} removed from equipment {} ({} plans deleted)",
            part_id,
            id,
            removed_plans.len()
        );
        Ok(saved)
    }

    pub async fn assign_sla(&self, id: Uuid, sla_id: Uuid) -> AppResult<Equipment> {
        let _guard = self.locks.lock(id).await;
        let mut equipment = self.load(id).await?;
        self.store
            .sla_get(sla_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("SLA {} not found", sla_id)))?;

        equipment.sla_id = Some(sla_id);
        let saved = self.store.equipment_save(&equipment).await?;
        tracing::info!("SLA {} assigned to equipment {}", sla_id, id);
        Ok(saved)
    }

    /// Delete the equipment with its spare parts and maintenance plans
    pub async fn delete(&self, id: Uuid) -> AppResult<CascadeReport> {
        let _guard = self.locks.lock(id).await;
        let report = self.store.equipment_delete_cascade(id).await?;
        tracing::info!(
            "Equipment {} deleted ({} spare parts, {} plans)",
            id,
            report.spare_parts,
            report.spare_part_plans + report.equipment_plans
        );
        Ok(report)
    }

    /// Reconcile the submitted plans and make them the equipment's plan list
    pub async fn update_maintenance_plans(
        &self,
        id: Uuid,
        plans: Vec<MaintenancePlanInput>,
    ) -> AppResult<Vec<MaintenancePlan>> {
        let _guard = self.locks.lock(id).await;
        let mut equipment = self.load(id).await?;

        let plans = self.reconciler.reconcile(id, plans).await?;
        equipment.maintenance_plan_ids = plans.iter().map(|p| p.id).collect();
        self.store.equipment_save(&equipment).await?;

        tracing::info!("Maintenance plans of equipment {} replaced ({})", id, plans.len());
        Ok(plans)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Equipment> {
        self.load(id).await
    }

    pub async fn get_by_serial_code(&self, serial_code: &str) -> AppResult<Equipment> {
        self.store
            .equipment_find_by_serial_code(serial_code)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No equipment with serial code {}", serial_code)))
    }

    /// Received equipment of a hospital
    pub async fn list_by_hospital(&self, hospital_id: &str) -> AppResult<Vec<Equipment>> {
        self.store.equipment_list_by_hospital(hospital_id, true).await
    }

    pub async fn list_awaiting_reception(&self) -> AppResult<Vec<Equipment>> {
        self.store.equipment_list_not_received().await
    }

    pub async fn spare_parts(&self, id: Uuid) -> AppResult<Vec<SparePart>> {
        self.load(id).await?;
        self.store.spare_parts_by_equipment(id).await
    }

    pub async fn maintenance_plans(&self, id: Uuid) -> AppResult<Vec<MaintenancePlan>> {
        self.load(id).await?;
        self.store.maintenance_plans_by_equipment(id).await
    }

    /// Assign a new service and persist; returns the saved state and the previous service
    pub(crate) async fn move_to_service(
        &self,
        id: Uuid,
        new_service_id: &str,
    ) -> AppResult<(Equipment, Option<String>)> {
        let _guard = self.locks.lock(id).await;
        let mut equipment = self.load(id).await?;

        let old_service_id = equipment.service_id.replace(new_service_id.to_string());
        let saved = self.store.equipment_save(&equipment).await?;
        Ok((saved, old_service_id))
    }

    /// Assign a new hospital, reset reception and persist; returns the saved state and the previous hospital
    pub(crate) async fn move_to_hospital(
        &self,
        id: Uuid,
        new_hospital_id: &str,
    ) -> AppResult<(Equipment, String)> {
        let _guard = self.locks.lock(id).await;
        let mut equipment = self.load(id).await?;

        let old_hospital_id = std::mem::replace(&mut equipment.hospital_id, new_hospital_id.to_string());
        equipment.reset_reception();
        let saved = self.store.equipment_save(&equipment).await?;
        Ok((saved, old_hospital_id))
    }
}
