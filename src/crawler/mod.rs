//! Crawler module for listing scraping and cycle orchestration
//!
//! This module contains the scraping side of the watcher, including:
//! - HTTP fetching of listing and detail pages
//! - Vacancy extraction from listing markup
//! - The run coordinator with its at-most-one-cycle guard
//! - The repeating-mode scheduler

mod coordinator;
mod extractor;
mod fetcher;
mod fields;
mod scheduler;

pub use coordinator::{CycleOutcome, CycleReport, RunCoordinator};
pub use extractor::{ExtractedPage, ListingSelectors, VacancyExtractor};
pub use fetcher::{build_http_client, FetchFailure, PageFetcher};
pub use fields::{parse_experience, split_skills};
pub use scheduler::{CycleRunner, Scheduler, TickOutcome};

use crate::config::Config;
use std::sync::Arc;

/// Runs the watcher in repeating mode until `shutdown` resolves
///
/// # Arguments
///
/// * `config` - The watcher configuration
/// * `shutdown` - Resolves when the process should stop
///
/// # Returns
///
/// * `Ok(u64)` - Number of cycles run
/// * `Err(WatchError)` - The coordinator could not be set up
pub async fn watch<F>(config: Config, shutdown: F) -> crate::Result<u64>
where
    F: std::future::Future<Output = ()>,
{
    let schedule = config.schedule.clone();
    let coordinator = Arc::new(RunCoordinator::from_config(config)?);
    let scheduler = Scheduler::new(coordinator, &schedule);
    Ok(scheduler.run_until(shutdown).await)
}
