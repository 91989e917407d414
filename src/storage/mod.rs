//! Storage module for persisting vacancies
//!
//! This module handles all persistence for the watcher, including:
//! - The JSON snapshot of the full known set and per-cycle new-vacancy files
//! - SQLite database initialization and schema management
//! - Vacancy queries (latest, keyword search, counts)
//! - Chat subscriptions and the notification sent-log
//! - The cross-process cycle lock on the snapshot directory

mod lock;
mod schema;
mod snapshot;
mod sqlite;
mod traits;

pub use lock::CycleLock;
pub use snapshot::JsonSnapshotStore;
pub use sqlite::SqliteStorage;
pub use traits::{FullSetStore, StorageError, StorageResult, VacancyStore};

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Vacancy store shared between the coordinator and the notification dispatcher
pub type SharedStore = Arc<Mutex<dyn VacancyStore + Send>>;

/// Opens or creates the SQLite database at `path`
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(WatchError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> crate::Result<SqliteStorage> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    SqliteStorage::new(path)
}

/// Wraps a store for sharing
pub fn share<S: VacancyStore + Send + 'static>(store: S) -> SharedStore {
    Arc::new(Mutex::new(store))
}

/// Locks a shared store
pub fn lock(store: &SharedStore) -> StorageResult<MutexGuard<'_, dyn VacancyStore + Send + 'static>> {
    store.lock().map_err(|_| StorageError::Poisoned)
}
