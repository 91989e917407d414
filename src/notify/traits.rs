//! Notification sink trait and error type

use crate::storage::StorageError;
use crate::vacancy::VacancyRecord;
use async_trait::async_trait;
use thiserror::Error;

/// Errors raised while delivering a notification
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API rejected the message ({status}): {description}")]
    Api { status: u16, description: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// A destination for new-vacancy notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers `records` to one recipient
    ///
    /// Called at most once per recipient per cycle, with the records that
    /// recipient has not been sent before.
    async fn notify(&self, recipient: i64, records: &[VacancyRecord]) -> Result<(), NotifyError>;
}
