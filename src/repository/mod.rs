//! Repository layer: the `EquipmentStore` seam and its implementations

pub mod classification;
pub mod equipment;
pub mod maintenance_plans;
pub mod memory;
pub mod references;
pub mod spare_parts;
pub mod transfer_history;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        Brand, CascadeReport, ClassificationNode, Equipment, EquipmentTransferHistory,
        MaintenancePlan, Sla, SparePart,
    },
};

pub use memory::InMemoryStore;

/// Persistence operations the lifecycle and transfer services depend on
#[async_trait]
pub trait EquipmentStore: Send + Sync {
    async fn equipment_get(&self, id: Uuid) -> AppResult<Option<Equipment>>;
    async fn equipment_find_by_name(&self, name: &str) -> AppResult<Option<Equipment>>;
    async fn equipment_find_by_serial_code(&self, serial_code: &str) -> AppResult<Option<Equipment>>;
    async fn equipment_list_by_hospital(&self, hospital_id: &str, reception: bool) -> AppResult<Vec<Equipment>>;
    async fn equipment_list_not_received(&self) -> AppResult<Vec<Equipment>>;
    /// Insert or update; the serial code of an existing row is never rewritten
    async fn equipment_save(&self, equipment: &Equipment) -> AppResult<Equipment>;
    /// Remove the equipment with its spare parts and maintenance plans in one unit of work
    async fn equipment_delete_cascade(&self, id: Uuid) -> AppResult<CascadeReport>;

    async fn spare_parts_find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<SparePart>>;
    async fn spare_parts_by_equipment(&self, equipment_id: Uuid) -> AppResult<Vec<SparePart>>;
    async fn spare_part_save(&self, spare_part: &SparePart) -> AppResult<SparePart>;
    /// Remove a spare part and the plans referencing it; returns the removed plan IDs
    async fn spare_part_delete_cascade(&self, id: Uuid) -> AppResult<Vec<Uuid>>;

    async fn maintenance_plan_get(&self, id: Uuid) -> AppResult<Option<MaintenancePlan>>;
    async fn maintenance_plans_by_equipment(&self, equipment_id: Uuid) -> AppResult<Vec<MaintenancePlan>>;
    async fn maintenance_plan_save(&self, plan: &MaintenancePlan) -> AppResult<MaintenancePlan>;

    async fn brand_find_by_name(&self, name: &str) -> AppResult<Option<Brand>>;
    async fn brand_find_by_name_and_hospital(&self, name: &str, hospital_id: &str) -> AppResult<Option<Brand>>;
    async fn sla_get(&self, id: Uuid) -> AppResult<Option<Sla>>;

    async fn transfer_history_append(&self, record: &EquipmentTransferHistory) -> AppResult<()>;
    async fn transfer_history_by_equipment(&self, equipment_id: Uuid) -> AppResult<Vec<EquipmentTransferHistory>>;

    /// Full classification forest, top-level nodes first
    async fn classification_forest(&self) -> AppResult<Vec<ClassificationNode>>;
}

/// PostgreSQL-backed store holding the connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub equipment: equipment::EquipmentRepository,
    pub spare_parts: spare_parts::SparePartsRepository,
    pub maintenance_plans: maintenance_plans::MaintenancePlansRepository,
    pub references: references::ReferencesRepository,
    pub transfer_history: transfer_history::TransferHistoryRepository,
    pub classification: classification::ClassificationRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            equipment: equipment::EquipmentRepository::new(pool.clone()),
            spare_parts: spare_parts::SparePartsRepository::new(pool.clone()),
            maintenance_plans: maintenance_plans::MaintenancePlansRepository::new(pool.clone()),
            references: references::ReferencesRepository::new(pool.clone()),
            transfer_history: transfer_history::TransferHistoryRepository::new(pool.clone()),
            classification: classification::ClassificationRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl EquipmentStore for Repository {
    async fn equipment_get(&self, id: Uuid) -> AppResult<Option<Equipment>> {
        self.equipment.get_by_id(id).await
    }

    async fn equipment_find_by_name(&self, name: &str) -> AppResult<Option<Equipment>> {
        self.equipment.find_by_name(name).await
    }

    async fn equipment_find_by_serial_code(&self, serial_code: &str) -> AppResult<Option<Equipment>> {
        self.equipment.find_by_serial_code(serial_code).await
    }

    async fn equipment_list_by_hospital(&self, hospital_id: &str, reception: bool) -> AppResult<Vec<Equipment>> {
        self.equipment.list_by_hospital(hospital_id, reception).await
    }

    async fn equipment_list_not_received(&self) -> AppResult<Vec<Equipment>> {
        self.equipment.list_not_received().await
    }

    async fn equipment_save(&self, equipment: &Equipment) -> AppResult<Equipment> {
        self.equipment.save(equipment).await
    }

    async fn equipment_delete_cascade(&self, id: Uuid) -> AppResult<CascadeReport> {
        self.equipment.delete_cascade(id).await
    }

    async fn spare_parts_find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<SparePart>> {
        self.spare_parts.find_by_ids(ids).await
    }

    async fn spare_parts_by_equipment(&self, equipment_id: Uuid) -> AppResult<Vec<SparePart>> {
        self.spare_parts.list_by_equipment(equipment_id).await
    }

    async fn spare_part_save(&self, spare_part: &SparePart) -> AppResult<SparePart> {
        self.spare_parts.save(spare_part).await
    }

    async fn spare_part_delete_cascade(&self, id: Uuid) -> AppResult<Vec<Uuid>> {
        self.spare_parts.delete_cascade(id).await
    }

    async fn maintenance_plan_get(&self, id: Uuid) -> AppResult<Option<MaintenancePlan>> {
        self.maintenance_plans.get_by_id(id).await
    }

    async fn maintenance_plans_by_equipment(&self, equipment_id: Uuid) -> AppResult<Vec<MaintenancePlan>> {
        self.maintenance_plans.list_by_equipment(equipment_id).await
    }

    async fn maintenance_plan_save(&self, plan: &MaintenancePlan) -> AppResult<MaintenancePlan> {
        self.maintenance_plans.save(plan).await
    }

    async fn brand_find_by_name(&self, name: &str) -> AppResult<Option<Brand>> {
        self.references.brand_by_name(name).await
    }

    async fn brand_find_by_name_and_hospital(&self, name: &str, hospital_id: &str) -> AppResult<Option<Brand>> {
        self.references.brand_by_name_and_hospital(name, hospital_id).await
    }

    async fn sla_get(&self, id: Uuid) -> AppResult<Option<Sla>> {
        self.references.sla_by_id(id).await
    }

    async fn transfer_history_append(&self, record: &EquipmentTransferHistory) -> AppResult<()> {
        self.transfer_history.append(record).await
    }

    async fn transfer_history_by_equipment(&self, equipment_id: Uuid) -> AppResult<Vec<EquipmentTransferHistory>> {
        self.transfer_history.list_by_equipment(equipment_id).await
    }

    async fn classification_forest(&self) -> AppResult<Vec<ClassificationNode>> {
        self.classification.load_forest().await
    }
}
