//! Statistics from the vacancy store
//!
//! This module provides functionality for extracting and displaying
//! store statistics.

use crate::storage::{StorageResult, VacancyStore};
use chrono::{DateTime, Utc};

/// Store statistics summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStatistics {
    /// Total number of stored vacancies
    pub total_vacancies: u64,

    /// Number of subscribed chats
    pub subscribers: usize,

    /// Vacancy deliveries recorded in the sent-log
    pub notifications_sent: u64,

    /// Creation time of the newest vacancy
    pub newest_vacancy_at: Option<DateTime<Utc>>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The store to query
///
/// # Returns
///
/// * `Ok(StoreStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn VacancyStore) -> StorageResult<StoreStatistics> {
    Ok(StoreStatistics {
        total_vacancies: storage.count_vacancies()?,
        subscribers: storage.list_subscribers()?.len(),
        notifications_sent: storage.count_sent()?,
        newest_vacancy_at: storage.latest_created_at()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &StoreStatistics) {
    println!("=== Vacancy Statistics ===\n");

    println!("  Total vacancies: {}", stats.total_vacancies);
    println!("  Subscribers: {}", stats.subscribers);
    println!("  Notifications sent: {}", stats.notifications_sent);
    match stats.newest_vacancy_at {
        Some(at) => println!("  Newest vacancy added: {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
        None => println!("  Newest vacancy added: never"),
    }
}
