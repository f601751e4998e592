//! Business logic services

pub mod best_effort;
pub mod classification;
pub mod directory;
pub mod equipment;
pub mod events;
pub mod locks;
pub mod maintenance_plans;
pub mod transfers;

use std::sync::Arc;

use crate::repository::EquipmentStore;
use directory::{HospitalDirectory, UserDirectory};
use events::EventPublisher;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub equipment: equipment::EquipmentService,
    pub transfers: transfers::TransferService,
    pub classification: Arc<classification::ClassificationResolver>,
}

impl Services {
    /// Wire the services on top of their collaborators
    pub fn new(
        store: Arc<dyn EquipmentStore>,
        users: Arc<dyn UserDirectory>,
        hospitals: Arc<dyn HospitalDirectory>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        let classification = Arc::new(classification::ClassificationResolver::new(store.clone()));
        let equipment = equipment::EquipmentService::new(store.clone(), classification.clone());
        let transfers = transfers::TransferService::new(equipment.clone(), store, users, hospitals, events);

        Self {
            equipment,
            transfers,
            classification,
        }
    }
}
