// Alert Ledger - durable record of which alerts already fired
//
// History is a mapping domain -> threshold -> last alert date. It is persisted as a
// single JSON document behind the `HistoryStore` trait. Every read-modify-write goes
// through `AlertLedger::lock`, which serializes access across concurrent domain checks.

use crate::error::StorageError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex as StdMutex;
use tempfile::NamedTempFile;
use tokio::sync::{Mutex, MutexGuard};

/// File name of the primary history document
pub const HISTORY_FILE_NAME: &str = "alert-history.json";

/// Per-domain, per-threshold record of the last alert date
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryState {
    domains: BTreeMap<String, BTreeMap<u32, NaiveDate>>,
}

impl HistoryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True unless an alert for (domain, threshold) was already recorded on `today`
    pub fn should_alert(&self, domain: &str, threshold: u32, today: NaiveDate) -> bool {
        self.last_alert(domain, threshold) != Some(today)
    }

    /// Record that an alert fired, returning the updated state
    #[must_use]
    pub fn record_alert(mut self, domain: &str, threshold: u32, today: NaiveDate) -> Self {
        self.domains
            .entry(domain.to_string())
            .or_default()
            .insert(threshold, today);
        self
    }

    pub fn last_alert(&self, domain: &str, threshold: u32) -> Option<NaiveDate> {
        self.domains
            .get(domain)
            .and_then(|alerts| alerts.get(&threshold))
            .copied()
    }

    pub fn domain(&self, domain: &str) -> Option<&BTreeMap<u32, NaiveDate>> {
        self.domains.get(domain)
    }

    pub fn domains(&self) -> impl Iterator<Item = (&str, &BTreeMap<u32, NaiveDate>)> {
        self.domains.iter().map(|(d, alerts)| (d.as_str(), alerts))
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

/// Minimal key-value persistence for the alert history
pub trait HistoryStore: Send + Sync {
    /// Load persisted history. A store that has never been written yields an empty state.
    fn load(&self) -> Result<HistoryState, StorageError>;

    /// Persist history atomically
    fn save(&self, state: &HistoryState) -> Result<(), StorageError>;

    /// Human-readable location for logs
    fn location(&self) -> String;
}

impl<S: HistoryStore + ?Sized> HistoryStore for std::sync::Arc<S> {
    fn load(&self) -> Result<HistoryState, StorageError> {
        (**self).load()
    }

    fn save(&self, state: &HistoryState) -> Result<(), StorageError> {
        (**self).save(state)
    }

    fn location(&self) -> String {
        (**self).location()
    }
}

/// JSON file store with a sibling backup of the previous version
pub struct JsonFileStore {
    path: PathBuf,
    backup_path: PathBuf,
}

impl JsonFileStore {
    /// Store at an explicit file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut backup = path.clone().into_os_string();
        backup.push(".backup");

        Self {
            path,
            backup_path: PathBuf::from(backup),
        }
    }

    /// Store named `alert-history.json` inside `data_dir`
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join(HISTORY_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

impl HistoryStore for JsonFileStore {
    fn load(&self) -> Result<HistoryState, StorageError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(history_file = %self.path.display(), "No alert history yet");
                return Ok(HistoryState::new());
            }
            Err(source) => {
                return Err(StorageError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let state: HistoryState =
            serde_json::from_str(&contents).map_err(|source| StorageError::Parse {
                path: self.path.clone(),
                source,
            })?;

        tracing::debug!(
            history_file = %self.path.display(),
            domains = state.len(),
            "Alert history loaded"
        );

        Ok(state)
    }

    fn save(&self, state: &HistoryState) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(state)?;
        let dir = self.parent_dir();

        fs::create_dir_all(&dir).map_err(|source| StorageError::Write {
            path: dir.clone(),
            source,
        })?;

        // Keep the current version before touching the primary file
        match fs::copy(&self.path, &self.backup_path) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(StorageError::Backup {
                    path: self.backup_path.clone(),
                    source,
                });
            }
        }

        let write_err = |source: io::Error| StorageError::Write {
            path: self.path.clone(),
            source,
        };

        let mut temp = NamedTempFile::new_in(&dir).map_err(write_err)?;
        temp.as_file_mut()
            .write_all(json.as_bytes())
            .map_err(write_err)?;
        temp.as_file().sync_all().map_err(write_err)?;
        temp.persist(&self.path).map_err(|e| write_err(e.error))?;

        tracing::debug!(
            history_file = %self.path.display(),
            domains = state.len(),
            "Alert history saved"
        );

        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory store, used for dry runs and tests
#[derive(Default)]
pub struct MemoryStore {
    state: StdMutex<HistoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: HistoryState) -> Self {
        Self {
            state: StdMutex::new(state),
        }
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> HistoryState {
        match self.state.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl HistoryStore for MemoryStore {
    fn load(&self) -> Result<HistoryState, StorageError> {
        Ok(self.snapshot())
    }

    fn save(&self, state: &HistoryState) -> Result<(), StorageError> {
        let mut guard = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = state.clone();
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

/// Serialized access to the alert history
pub struct AlertLedger {
    store: Box<dyn HistoryStore>,
    write_lock: Mutex<()>,
}

impl AlertLedger {
    pub fn new(store: Box<dyn HistoryStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Ledger backed by `alert-history.json` in `data_dir`
    pub fn json_file(data_dir: impl AsRef<Path>) -> Self {
        Self::new(Box::new(JsonFileStore::in_dir(data_dir)))
    }

    /// Enter the ledger's critical section.
    ///
    /// Only one guard exists at a time, so a load-modify-save sequence performed through
    /// the guard cannot interleave with another one.
    pub async fn lock(&self) -> LedgerGuard<'_> {
        LedgerGuard {
            store: self.store.as_ref(),
            _guard: self.write_lock.lock().await,
        }
    }

    /// Read-only snapshot (waits for any in-flight update)
    pub async fn snapshot(&self) -> Result<HistoryState, StorageError> {
        self.lock().await.load()
    }

    pub fn location(&self) -> String {
        self.store.location()
    }
}

/// Exclusive handle to the ledger store
pub struct LedgerGuard<'a> {
    store: &'a dyn HistoryStore,
    _guard: MutexGuard<'a, ()>,
}

impl LedgerGuard<'_> {
    pub fn load(&self) -> Result<HistoryState, StorageError> {
        self.store.load()
    }

    pub fn save(&self, state: &HistoryState) -> Result<(), StorageError> {
        self.store.save(state)
    }
}
