//! Vacancy Watch: an incremental job-vacancy tracker
//!
//! This crate scrapes paginated vacancy listings, extracts structured records,
//! reconciles them against the previously known set (new / updated / unchanged),
//! persists the result and notifies subscribed chats about fresh postings.

pub mod config;
pub mod crawler;
pub mod notify;
pub mod output;
pub mod reconcile;
pub mod storage;
pub mod url;
pub mod vacancy;

use thiserror::Error;

/// Main error type for Vacancy Watch operations
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Notification error: {0}")]
    Notify(#[from] notify::NotifyError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector for {field}: {message}")]
    InvalidSelector { field: String, message: String },
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("No vacancy identifier in link: {0}")]
    MissingIdentifier(String),
}

/// Result type alias for Vacancy Watch operations
pub type Result<T> = std::result::Result<T, WatchError>;

// Re-export commonly used types
pub use config::Config;
pub use reconcile::{reconcile, ReconciliationResult};
pub use crawler::{CycleOutcome, CycleReport, RunCoordinator};
pub use crate::url::{canonical_link, vacancy_id_from_link};
pub use vacancy::{FullSet, VacancyRecord, NOT_SPECIFIED};
