use metrics_exporter_prometheus::PrometheusHandle;
use secret_santa::exchange::{
    ExchangeRecord, ExchangeStore, Notifier, NotifyError, OutboundMessage, StoreError,
};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryExchangeStore {
    record: Arc<Mutex<ExchangeRecord>>,
}

impl ExchangeStore for InMemoryExchangeStore {
    fn load(&self) -> Result<ExchangeRecord, StoreError> {
        let guard = self
            .record
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn save(&self, record: &ExchangeRecord) -> Result<(), StoreError> {
        let mut guard = self
            .record
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))?;
        *guard = record.clone();
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.save(&ExchangeRecord::default())
    }
}

/// Delivers by writing each message to the log.
///
/// Stands in for a mail transport; the message body is left out so the
/// pairing stays secret in shared logs.
#[derive(Default, Clone)]
pub(crate) struct LogNotifier;

impl Notifier for LogNotifier {
    fn send_batch(&self, messages: &[OutboundMessage]) -> Result<(), NotifyError> {
        for message in messages {
            info!(
                kind = ?message.kind,
                from = %message.from,
                to = %message.to,
                subject = %message.subject,
                "outbound message"
            );
        }
        Ok(())
    }
}
