//! Storage traits and error types
//!
//! This module defines the trait interfaces for the two persistence
//! collaborators of a cycle and their error type:
//! - `FullSetStore` holds the complete known set between cycles
//! - `VacancyStore` is the queryable store with subscriptions and the sent-log

use crate::vacancy::{FullSet, VacancyRecord};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Store lock poisoned")]
    Poisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable home of the full known set
///
/// Read once at the start of a cycle and replaced wholesale at its end.
pub trait FullSetStore: Send + Sync {
    /// Loads the full set
    ///
    /// A store that has never been written returns an empty set.
    fn load(&self) -> StorageResult<FullSet>;

    /// Replaces the stored full set
    fn save(&self, full_set: &FullSet) -> StorageResult<()>;

    /// Writes the records that were new in one cycle
    ///
    /// # Returns
    ///
    /// The location the batch was written to
    fn save_new_batch(
        &self,
        records: &[VacancyRecord],
        observed_at: DateTime<Utc>,
    ) -> StorageResult<PathBuf>;
}

/// Queryable vacancy store
pub trait VacancyStore {
    // ===== Vacancies =====

    /// Gets a vacancy by id
    fn get_vacancy(&self, id: &str) -> StorageResult<Option<VacancyRecord>>;

    /// Inserts the record unless its id is already stored
    ///
    /// # Returns
    ///
    /// True if a row was inserted
    fn insert_if_absent(&mut self, record: &VacancyRecord) -> StorageResult<bool>;

    /// Inserts every record whose id is not yet stored, in one transaction
    ///
    /// # Returns
    ///
    /// The number of rows inserted
    fn bulk_insert_if_absent(&mut self, records: &[VacancyRecord]) -> StorageResult<usize>;

    /// Overwrites the mutable fields of a stored vacancy
    ///
    /// `created_at` is never changed.
    ///
    /// # Returns
    ///
    /// True if a row with that id existed
    fn update_vacancy(&mut self, record: &VacancyRecord) -> StorageResult<bool>;

    /// Most recently created vacancies, newest first
    fn query_latest(&self, limit: usize) -> StorageResult<Vec<VacancyRecord>>;

    /// Vacancies whose title or skills contain `keyword`, newest first
    fn query_by_keyword(&self, keyword: &str, limit: usize) -> StorageResult<Vec<VacancyRecord>>;

    /// Total number of stored vacancies
    fn count_vacancies(&self) -> StorageResult<u64>;

    /// Creation time of the newest vacancy
    fn latest_created_at(&self) -> StorageResult<Option<DateTime<Utc>>>;

    // ===== Subscriptions =====

    /// Subscribes a chat
    ///
    /// # Returns
    ///
    /// True if the chat was not subscribed before
    fn add_subscription(&mut self, chat_id: i64) -> StorageResult<bool>;

    /// Unsubscribes a chat
    ///
    /// # Returns
    ///
    /// True if the chat was subscribed
    fn remove_subscription(&mut self, chat_id: i64) -> StorageResult<bool>;

    /// All subscribed chats in subscription order
    fn list_subscribers(&self) -> StorageResult<Vec<i64>>;

    // ===== Sent-log =====

    /// Returns true if the vacancy was already delivered to the chat
    fn was_sent(&self, chat_id: i64, vacancy_id: &str) -> StorageResult<bool>;

    /// Records a delivery
    ///
    /// # Returns
    ///
    /// True if this is the first delivery of that vacancy to that chat
    fn record_sent(&mut self, chat_id: i64, vacancy_id: &str) -> StorageResult<bool>;

    /// Total number of recorded deliveries
    fn count_sent(&self) -> StorageResult<u64>;
}
