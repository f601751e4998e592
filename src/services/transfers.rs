//! Inter-service and inter-hospital transfers
//!
//! Both workflows commit the ownership change first, then resolve whatever
//! the notifications need from the directories, publish, and append the
//! audit record. A directory failure after the commit only degrades the
//! notification.

use std::sync::Arc;

use uuid::Uuid;

use super::{
    best_effort::BestEffort,
    directory::{HospitalDirectory, UserDirectory},
    equipment::EquipmentService,
    events::{emit, EventPublisher},
};
use crate::{
    error::AppResult,
    models::{
        notification::{
            EquipmentHospitalTransferEvent, EquipmentServiceTransferEvent, NotificationEvent,
            EQUIPMENT_HOSPITAL_TRANSFER_TOPIC, EQUIPMENT_SERVICE_TRANSFER_TOPIC, NOTIFICATION_TOPIC,
        },
        transfer::{HospitalTransferRequest, ServiceTransferRequest, TransferOutcome},
        user::{roles, SupervisorInfo},
        EquipmentTransferHistory, UserDto,
    },
    repository::EquipmentStore,
};

pub const UNKNOWN_SERVICE_NAME: &str = "unknown service name";
pub const UNKNOWN_HOSPITAL_NAME: &str = "unknown hospital name";

fn push_email(emails: &mut Vec<String>, email: &str) {
    if !email.is_empty() && !emails.iter().any(|e| e == email) {
        emails.push(email.to_string());
    }
}

#[derive(Clone)]
pub struct TransferService {
    equipment: EquipmentService,
    store: Arc<dyn EquipmentStore>,
    users: Arc<dyn UserDirectory>,
    hospitals: Arc<dyn HospitalDirectory>,
    events: Arc<dyn EventPublisher>,
}

impl TransferService {
    pub fn new(
        equipment: EquipmentService,
        store: Arc<dyn EquipmentStore>,
        users: Arc<dyn UserDirectory>,
        hospitals: Arc<dyn HospitalDirectory>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            equipment,
            store,
            users,
            hospitals,
            events,
        }
    }

    async fn first_supervisor(
        &self,
        best_effort: &mut BestEffort,
        step: &str,
        token: &str,
        service_id: Option<&str>,
    ) -> Option<UserDto> {
        let service_id = service_id?;
        best_effort
            .run(step, self.users.service_supervisors(token, service_id))
            .await
            .and_then(|supervisors| supervisors.into_iter().next())
    }

    async fn service_name(
        &self,
        best_effort: &mut BestEffort,
        step: &str,
        token: &str,
        service_id: Option<&str>,
    ) -> String {
        let Some(service_id) = service_id else {
            return UNKNOWN_SERVICE_NAME.to_string();
        };
        match best_effort.run(step, self.hospitals.service_name(token, service_id)).await {
            Some(Some(name)) => name,
            Some(None) => {
                best_effort.missing(step, format!("no service {}", service_id));
                UNKNOWN_SERVICE_NAME.to_string()
            }
            None => UNKNOWN_SERVICE_NAME.to_string(),
        }
    }

    async fn hospital_name(
        &self,
        best_effort: &mut BestEffort,
        step: &str,
        token: &str,
        hospital_id: &str,
    ) -> String {
        match best_effort.run(step, self.hospitals.hospital_name(token, hospital_id)).await {
            Some(Some(name)) => name,
            Some(None) => {
                best_effort.missing(step, format!("no hospital {}", hospital_id));
                UNKNOWN_HOSPITAL_NAME.to_string()
            }
            None => UNKNOWN_HOSPITAL_NAME.to_string(),
        }
    }

    /// Move an equipment unit to another service of its hospital
    pub async fn transfer_to_service(
        &self,
        id: Uuid,
        request: ServiceTransferRequest,
        token: &str,
    ) -> AppResult<TransferOutcome> {
        let ServiceTransferRequest {
            new_service_id,
            description,
            initiator,
        } = request;

        let (equipment, old_service_id) = self.equipment.move_to_service(id, &new_service_id).await?;
        tracing::info!(
            "Equipment {} moved from service {:?} to {}",
            id,
            old_service_id,
            new_service_id
        );

        let mut best_effort = BestEffort::new();
        let old_supervisor = self
            .first_supervisor(&mut best_effort, "old_service_supervisors", token, old_service_id.as_deref())
            .await;
        let new_supervisor = self
            .first_supervisor(&mut best_effort, "new_service_supervisors", token, Some(&new_service_id))
            .await;
        let old_service_name = self
            .service_name(&mut best_effort, "old_service_name", token, old_service_id.as_deref())
            .await;
        let new_service_name = self
            .service_name(&mut best_effort, "new_service_name", token, Some(&new_service_id))
            .await;

        let mut emails = Vec::new();
        push_email(&mut emails, &initiator.email);
        for supervisor in [&old_supervisor, &new_supervisor].into_iter().flatten() {
            push_email(&mut emails, &supervisor.email);
        }

        let event = EquipmentServiceTransferEvent {
            serial_code: equipment.serial_code.clone(),
            equipment_name: equipment.name.clone(),
            description: description.clone(),
            old_service_name: old_service_name.clone(),
            new_service_name: new_service_name.clone(),
            initiator_first_name: initiator.first_name.clone(),
            initiator_last_name: initiator.last_name.clone(),
            initiator_email: initiator.email.clone(),
            old_supervisor: old_supervisor
                .as_ref()
                .map(|user| SupervisorInfo::from_user(user, old_service_id.as_deref())),
            new_supervisor: new_supervisor
                .as_ref()
                .map(|user| SupervisorInfo::from_user(user, Some(&new_service_id))),
            emails_to_notify: emails.clone(),
        };
        emit(self.events.as_ref(), EQUIPMENT_SERVICE_TRANSFER_TOPIC, &event);
        emit(
            self.events.as_ref(),
            NOTIFICATION_TOPIC,
            &NotificationEvent {
                title: "Equipment transfer".to_string(),
                message: format!(
                    "Equipment {} was transferred from {} to {}.",
                    equipment.name, old_service_name, new_service_name
                ),
                emails,
            },
        );

        let record = EquipmentTransferHistory::inter_service(
            id,
            old_service_id,
            new_service_id,
            description,
            &initiator,
        );
        self.store.transfer_history_append(&record).await?;

        Ok(TransferOutcome {
            equipment,
            degraded: best_effort.into_degraded(),
        })
    }

    /// Move an equipment unit to another hospital; it must be received again there
    pub async fn transfer_to_hospital(
        &self,
        id: Uuid,
        request: HospitalTransferRequest,
        token: &str,
    ) -> AppResult<TransferOutcome> {
        let HospitalTransferRequest {
            new_hospital_id,
            description,
            initiator,
        } = request;

        let (equipment, old_hospital_id) = self.equipment.move_to_hospital(id, &new_hospital_id).await?;
        tracing::info!(
            "Equipment {} moved from hospital {} to {}",
            id,
            old_hospital_id,
            new_hospital_id
        );

        let mut best_effort = BestEffort::new();
        let admin = best_effort
            .run("new_hospital_admin", self.users.hospital_admin(token, &new_hospital_id))
            .await
            .flatten();
        let new_hospital_name = self
            .hospital_name(&mut best_effort, "new_hospital_name", token, &new_hospital_id)
            .await;
        let old_hospital_name = self
            .hospital_name(&mut best_effort, "old_hospital_name", token, &old_hospital_id)
            .await;
        let watcher_roles: Vec<String> = roles::TRANSFER_WATCHERS.iter().map(|r| r.to_string()).collect();
        let watchers = best_effort
            .run(
                "old_hospital_users",
                self.users.hospital_users_with_roles(token, &old_hospital_id, &watcher_roles),
            )
            .await
            .unwrap_or_default();

        let mut emails = Vec::new();
        push_email(&mut emails, &initiator.email);
        if let Some(admin) = &admin {
            push_email(&mut emails, &admin.email);
        }
        for user in &watchers {
            push_email(&mut emails, &user.email);
        }

        let event = EquipmentHospitalTransferEvent {
            serial_code: equipment.serial_code.clone(),
            equipment_id: equipment.id,
            equipment_name: equipment.name.clone(),
            description: description.clone(),
            old_hospital_id: old_hospital_id.clone(),
            old_hospital_name: old_hospital_name.clone(),
            new_hospital_id: new_hospital_id.clone(),
            new_hospital_name: new_hospital_name.clone(),
            initiator_first_name: initiator.first_name.clone(),
            initiator_last_name: initiator.last_name.clone(),
            initiator_email: initiator.email.clone(),
            emails_to_notify: emails.clone(),
        };
        emit(self.events.as_ref(), EQUIPMENT_HOSPITAL_TRANSFER_TOPIC, &event);
        emit(
            self.events.as_ref(),
            NOTIFICATION_TOPIC,
            &NotificationEvent {
                title: "Inter-hospital equipment transfer".to_string(),
                message: format!(
                    "Equipment {} was transferred from {} to {}.",
                    equipment.name, old_hospital_name, new_hospital_name
                ),
                emails,
            },
        );

        let record = EquipmentTransferHistory::inter_hospital(
            id,
            old_hospital_id,
            new_hospital_id,
            description,
            &initiator,
        );
        self.store.transfer_history_append(&record).await?;

        Ok(TransferOutcome {
            equipment,
            degraded: best_effort.into_degraded(),
        })
    }

    /// Transfer history of an equipment, oldest first
    pub async fn history(&self, id: Uuid) -> AppResult<Vec<EquipmentTransferHistory>> {
        self.store.transfer_history_by_equipment(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::AppError,
        models::{
            equipment::{CreateEquipment, ReceiveEquipment},
            Brand, ClassificationNode, Equipment, EquipmentStatus, TransferType,
        },
        repository::InMemoryStore,
        services::{
            classification::ClassificationResolver,
            directory::{MockHospitalDirectory, MockUserDirectory},
            events::InMemoryEventPublisher,
        },
    };

    fn user(id: &str, email: &str) -> UserDto {
        UserDto {
            id: id.into(),
            first_name: "Ada".into(),
            last_name: id.into(),
            email: email.into(),
            roles: Vec::new(),
        }
    }

    struct Fixture {
        store: Arc<InMemoryStore>,
        events: Arc<InMemoryEventPublisher>,
        equipment: EquipmentService,
    }

    impl Fixture {
        fn new() -> Self {
            let store = InMemoryStore::new().with_forest(vec![ClassificationNode::new("Z11", "Imaging")]);
            store.add_brand(Brand {
                id: Uuid::new_v4(),
                name: "Acme".into(),
                hospital_id: None,
            });
            let store = Arc::new(store);
            let dyn_store: Arc<dyn EquipmentStore> = store.clone();
            let equipment =
                EquipmentService::new(dyn_store.clone(), Arc::new(ClassificationResolver::new(dyn_store)));
            Self {
                store,
                events: Arc::new(InMemoryEventPublisher::new()),
                equipment,
            }
        }

        fn transfers(&self, users: MockUserDirectory, hospitals: MockHospitalDirectory) -> TransferService {
            TransferService::new(
                self.equipment.clone(),
                self.store.clone(),
                Arc::new(users),
                Arc::new(hospitals),
                self.events.clone(),
            )
        }

        async fn received_equipment(&self) -> Equipment {
            let created = self
                .equipment
                .create(CreateEquipment {
                    name: "Ventilator 3".into(),
                    classification_code: "Z11".into(),
                    lifespan: 8,
                    risk_class: "IIb".into(),
                    hospital_id: "h-old".into(),
                })
                .await
                .unwrap();
            self.equipment
                .receive(
                    &created.serial_code,
                    ReceiveEquipment {
                        brand: "Acme".into(),
                        service_id: Some("svc-old".into()),
                        ..Default::default()
                    },
                )
                .await
                .unwrap()
        }
    }

    fn failing_users() -> MockUserDirectory {
        let mut users = MockUserDirectory::new();
        users
            .expect_service_supervisors()
            .returning(|_, _| Err(AppError::Directory("user directory down".into())));
        users
            .expect_hospital_admin()
            .returning(|_, _| Err(AppError::Directory("user directory down".into())));
        users
            .expect_hospital_users_with_roles()
            .returning(|_, _, _| Err(AppError::Directory("user directory down".into())));
        users
    }

    fn failing_hospitals() -> MockHospitalDirectory {
        let mut hospitals = MockHospitalDirectory::new();
        hospitals
            .expect_service_name()
            .returning(|_, _| Err(AppError::Directory("hospital directory down".into())));
        hospitals
            .expect_hospital_name()
            .returning(|_, _| Err(AppError::Directory("hospital directory down".into())));
        hospitals
    }

    #[tokio::test]
    async fn test_service_transfer_notifies_supervisors() {
        let fixture = Fixture::new();
        let equipment = fixture.received_equipment().await;

        let mut users = MockUserDirectory::new();
        users
            .expect_service_supervisors()
            .withf(|token, service| token == "tok" && service == "svc-old")
            .times(1)
            .returning(|_, _| Ok(vec![user("u-old", "old@example.org"), user("u-x", "x@example.org")]));
        users
            .expect_service_supervisors()
            .withf(|_, service| service == "svc-new")
            .times(1)
            .returning(|_, _| Ok(vec![user("u-new", "new@example.org")]));
        let mut hospitals = MockHospitalDirectory::new();
        hospitals
            .expect_service_name()
            .returning(|_, id| Ok(Some(format!("Service {}", id))));

        let outcome = fixture
            .transfers(users, hospitals)
            .transfer_to_service(
                equipment.id,
                ServiceTransferRequest {
                    new_service_id: "svc-new".into(),
                    description: Some("reorganisation".into()),
                    initiator: user("actor", "actor@example.org"),
                },
                "tok",
            )
            .await
            .unwrap();

        assert_eq!(outcome.equipment.service_id.as_deref(), Some("svc-new"));
        assert!(outcome.equipment.reception);
        assert!(outcome.degraded.is_empty());

        let structured = fixture.events.on(EQUIPMENT_SERVICE_TRANSFER_TOPIC);
        assert_eq!(structured.len(), 1);
        assert_eq!(structured[0]["oldServiceName"], "Service svc-old");
        assert_eq!(structured[0]["oldSupervisor"]["email"], "old@example.org");
        assert_eq!(structured[0]["newSupervisor"]["serviceId"], "svc-new");
        assert_eq!(
            structured[0]["emailsToNotify"],
            serde_json::json!(["actor@example.org", "old@example.org", "new@example.org"])
        );
        assert_eq!(fixture.events.on(NOTIFICATION_TOPIC).len(), 1);

        let history = fixture.store.transfer_history_by_equipment(equipment.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].transfer_type, TransferType::InterService);
        assert_eq!(history[0].old_service_id.as_deref(), Some("svc-old"));
        assert_eq!(history[0].new_service_id.as_deref(), Some("svc-new"));
        assert_eq!(history[0].initiated_by_name, "Ada actor");
    }

    #[tokio::test]
    async fn test_service_transfer_survives_directory_outage() {
        let fixture = Fixture::new();
        let equipment = fixture.received_equipment().await;

        let outcome = fixture
            .transfers(failing_users(), failing_hospitals())
            .transfer_to_service(
                equipment.id,
                ServiceTransferRequest {
                    new_service_id: "svc-new".into(),
                    description: None,
                    initiator: user("actor", "actor@example.org"),
                },
                "tok",
            )
            .await
            .unwrap();

        assert_eq!(outcome.equipment.service_id.as_deref(), Some("svc-new"));
        assert_eq!(outcome.degraded.len(), 4);

        let structured = fixture.events.on(EQUIPMENT_SERVICE_TRANSFER_TOPIC);
        assert_eq!(structured[0]["oldServiceName"], UNKNOWN_SERVICE_NAME);
        assert_eq!(structured[0]["newServiceName"], UNKNOWN_SERVICE_NAME);
        assert!(structured[0]["oldSupervisor"].is_null());
        assert_eq!(structured[0]["emailsToNotify"], serde_json::json!(["actor@example.org"]));

        let history = fixture.store.transfer_history_by_equipment(equipment.id).await.unwrap();
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_hospital_transfer_resets_reception_and_notifies_watchers() {
        let fixture = Fixture::new();
        let equipment = fixture.received_equipment().await;

        let mut users = MockUserDirectory::new();
        users
            .expect_hospital_admin()
            .withf(|_, hospital| hospital == "h-new")
            .returning(|_, _| Ok(Some(user("admin", "admin@example.org"))));
        users
            .expect_hospital_users_with_roles()
            .withf(|_, hospital, roles| hospital == "h-old" && roles.len() == 3)
            .returning(|_, _, _| {
                Ok(vec![
                    user("eng", "eng@example.org"),
                    user("actor", "actor@example.org"),
                ])
            });
        let mut hospitals = MockHospitalDirectory::new();
        hospitals
            .expect_hospital_name()
            .withf(|_, hospital| hospital == "h-new")
            .returning(|_, _| Ok(Some("Central".into())));
        hospitals
            .expect_hospital_name()
            .withf(|_, hospital| hospital == "h-old")
            .returning(|_, _| Ok(None));

        let outcome = fixture
            .transfers(users, hospitals)
            .transfer_to_hospital(
                equipment.id,
                HospitalTransferRequest {
                    new_hospital_id: "h-new".into(),
                    description: Some("loan".into()),
                    initiator: user("actor", "actor@example.org"),
                },
                "tok",
            )
            .await
            .unwrap();

        assert_eq!(outcome.equipment.hospital_id, "h-new");
        assert!(!outcome.equipment.reception);
        assert_eq!(outcome.equipment.status, EquipmentStatus::AwaitingReception);
        assert_eq!(outcome.degraded.len(), 1);
        assert_eq!(outcome.degraded[0].step, "old_hospital_name");

        let structured = fixture.events.on(EQUIPMENT_HOSPITAL_TRANSFER_TOPIC);
        assert_eq!(structured.len(), 1);
        assert_eq!(structured[0]["newHospitalName"], "Central");
        assert_eq!(structured[0]["oldHospitalName"], UNKNOWN_HOSPITAL_NAME);
        assert_eq!(
            structured[0]["emailsToNotify"],
            serde_json::json!(["actor@example.org", "admin@example.org", "eng@example.org"])
        );

        let history = fixture.store.transfer_history_by_equipment(equipment.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].transfer_type, TransferType::InterHospital);
        assert_eq!(history[0].old_hospital_id.as_deref(), Some("h-old"));
        assert_eq!(history[0].new_hospital_id.as_deref(), Some("h-new"));
    }

    #[tokio::test]
    async fn test_hospital_transfer_survives_directory_outage() {
        let fixture = Fixture::new();
        let equipment = fixture.received_equipment().await;

        let outcome = fixture
            .transfers(failing_users(), failing_hospitals())
            .transfer_to_hospital(
                equipment.id,
                HospitalTransferRequest {
                    new_hospital_id: "h-new".into(),
                    description: None,
                    initiator: user("actor", "actor@example.org"),
                },
                "tok",
            )
            .await
            .unwrap();

        assert!(!outcome.equipment.reception);
        assert_eq!(outcome.degraded.len(), 4);
        assert_eq!(fixture.events.on(NOTIFICATION_TOPIC).len(), 1);
        let history = fixture.store.transfer_history_by_equipment(equipment.id).await.unwrap();
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_transfer_of_missing_equipment_changes_nothing() {
        let fixture = Fixture::new();
        let transfers = fixture.transfers(MockUserDirectory::new(), MockHospitalDirectory::new());

        let result = transfers
            .transfer_to_hospital(
                Uuid::new_v4(),
                HospitalTransferRequest {
                    new_hospital_id: "h-new".into(),
                    description: None,
                    initiator: user("actor", "actor@example.org"),
                },
                "tok",
            )
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert!(fixture.events.published().is_empty());
        assert_eq!(fixture.store.write_count(), 0);
    }
}
