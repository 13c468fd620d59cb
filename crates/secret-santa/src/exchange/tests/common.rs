use std::sync::{Arc, Mutex};

use axum::response::Response;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;

use crate::exchange::domain::{ExchangeRecord, Participant};
use crate::exchange::notify::{MessageKind, NotificationSettings, Notifier, NotifyError, OutboundMessage};
use crate::exchange::repository::{ExchangeStore, StoreError};
use crate::exchange::service::{NewParticipant, SecretSantaService};
use crate::exchange::{exchange_router, AssignmentEngine};

#[derive(Default)]
pub(super) struct MemoryStore {
    record: Mutex<ExchangeRecord>,
}

impl MemoryStore {
    pub(super) fn record(&self) -> ExchangeRecord {
        self.record.lock().expect("store mutex poisoned").clone()
    }
}

impl ExchangeStore for MemoryStore {
    fn load(&self) -> Result<ExchangeRecord, StoreError> {
        Ok(self.record())
    }

    fn save(&self, record: &ExchangeRecord) -> Result<(), StoreError> {
        *self.record.lock().expect("store mutex poisoned") = record.clone();
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.record.lock().expect("store mutex poisoned") = ExchangeRecord::default();
        Ok(())
    }
}

pub(super) struct UnavailableStore;

impl ExchangeStore for UnavailableStore {
    fn load(&self) -> Result<ExchangeRecord, StoreError> {
        Err(StoreError::Unavailable("disk offline".to_string()))
    }

    fn save(&self, _record: &ExchangeRecord) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk offline".to_string()))
    }

    fn clear(&self) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryNotifier {
    sent: Mutex<Vec<OutboundMessage>>,
    fail_organizer_batch: bool,
}

impl MemoryNotifier {
    pub(super) fn failing_organizer_batch() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_organizer_batch: true,
        }
    }

    pub(super) fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().expect("notifier mutex poisoned").clone()
    }
}

impl Notifier for MemoryNotifier {
    fn send_batch(&self, messages: &[OutboundMessage]) -> Result<(), NotifyError> {
        let organizer_batch = messages
            .iter()
            .any(|message| message.kind == MessageKind::OrganizerSummary);
        if self.fail_organizer_batch && organizer_batch {
            return Err(NotifyError::Transport("smtp relay refused".to_string()));
        }

        self.sent
            .lock()
            .expect("notifier mutex poisoned")
            .extend_from_slice(messages);
        Ok(())
    }
}

pub(super) type TestService = SecretSantaService<MemoryStore, MemoryNotifier>;

pub(super) fn build_service() -> (TestService, Arc<MemoryStore>, Arc<MemoryNotifier>) {
    build_service_with(MemoryNotifier::default())
}

pub(super) fn build_service_with(
    notifier: MemoryNotifier,
) -> (TestService, Arc<MemoryStore>, Arc<MemoryNotifier>) {
    let store = Arc::new(MemoryStore::default());
    let notifier = Arc::new(notifier);
    let service = SecretSantaService::new(
        store.clone(),
        notifier.clone(),
        AssignmentEngine::default(),
        NotificationSettings::default(),
    );
    (service, store, notifier)
}

pub(super) fn newcomer(name: &str) -> NewParticipant {
    NewParticipant {
        name: name.to_string(),
        email: format!("{}@example.com", name.replace(' ', ".").to_lowercase()),
        is_organizer: false,
    }
}

/// Adds the named participants in order and returns them as stored.
pub(super) fn seed_roster(service: &TestService, names: &[&str]) -> Vec<Participant> {
    names
        .iter()
        .map(|name| service.add_participant(newcomer(name)).expect("participant added"))
        .collect()
}

pub(super) fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub(super) fn exchange_router_with_service(service: TestService) -> axum::Router {
    exchange_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
