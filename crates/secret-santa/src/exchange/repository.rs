use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::domain::ExchangeRecord;

/// Storage abstraction so the service module can be exercised in isolation.
pub trait ExchangeStore: Send + Sync {
    fn load(&self) -> Result<ExchangeRecord, StoreError>;
    fn save(&self, record: &ExchangeRecord) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access exchange data at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("exchange data at {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Keeps the whole exchange as one pretty-printed JSON document.
///
/// A missing file reads as an empty exchange.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl ExchangeStore for JsonFileStore {
    fn load(&self) -> Result<ExchangeRecord, StoreError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))?;

        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(ExchangeRecord::default()),
            Err(err) => return Err(self.io_error(err)),
        };

        serde_json::from_slice(&raw).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, record: &ExchangeRecord) -> Result<(), StoreError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))?;

        let payload = serde_json::to_vec_pretty(record).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        // Staged write; readers never observe a partial document.
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, payload).map_err(|err| self.io_error(err))?;
        fs::rename(&staging, &self.path).map_err(|err| self.io_error(err))
    }

    fn clear(&self) -> Result<(), StoreError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))?;

        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(self.io_error(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::domain::Participant;

    #[test]
    fn missing_file_loads_empty_record() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = JsonFileStore::new(dir.path().join("exchange.json"));
        assert_eq!(store.load().expect("loads"), ExchangeRecord::default());
    }

    #[test]
    fn save_then_load_preserves_record() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = JsonFileStore::new(dir.path().join("exchange.json"));
        let record = ExchangeRecord {
            participants: vec![Participant::new("Ada", "ada@example.com", true)],
            event_name: Some("Office party".to_string()),
            ..ExchangeRecord::default()
        };

        store.save(&record).expect("saves");
        assert_eq!(store.load().expect("loads"), record);

        store.clear().expect("clears");
        assert!(!store.path().exists());
        store.clear().expect("clearing twice is fine");
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("exchange.json");
        fs::write(&path, b"{ not json").expect("write fixture");

        match JsonFileStore::new(&path).load() {
            Err(StoreError::Corrupt { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected corrupt error, got {other:?}"),
        }
    }
}
