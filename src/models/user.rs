//! Users as returned by the user directory

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Role names understood by the user directory
pub mod roles {
    pub const HOSPITAL_ADMIN: &str = "ROLE_HOSPITAL_ADMIN";
    pub const MINISTRY_ADMIN: &str = "ROLE_MINISTRY_ADMIN";
    pub const MAINTENANCE_ENGINEER: &str = "ROLE_MAINTENANCE_ENGINEER";

    /// Origin-hospital staff notified of an outgoing inter-hospital transfer
    pub const TRANSFER_WATCHERS: [&str; 3] = [HOSPITAL_ADMIN, MINISTRY_ADMIN, MAINTENANCE_ENGINEER];
}

/// A directory user; also used to identify the initiator of a transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl UserDto {
    /// "First Last", as recorded in the transfer history
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Supervisor contact embedded in inter-service transfer events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupervisorInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub service_id: Option<String>,
}

impl SupervisorInfo {
    pub fn from_user(user: &UserDto, service_id: Option<&str>) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            service_id: service_id.map(str::to_string),
        }
    }
}
