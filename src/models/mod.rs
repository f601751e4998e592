//! Data models for the equipment service

pub mod classification;
pub mod equipment;
pub mod maintenance_plan;
pub mod notification;
pub mod reference;
pub mod spare_part;
pub mod transfer;
pub mod user;

// Re-export commonly used types
pub use classification::ClassificationNode;
pub use equipment::{CascadeReport, Equipment, EquipmentStatus};
pub use maintenance_plan::{MaintenancePlan, MaintenancePlanInput};
pub use reference::{Brand, Sla};
pub use spare_part::SparePart;
pub use transfer::{EquipmentTransferHistory, TransferType};
pub use user::UserDto;
