//! Run coordinator - one scrape-reconcile-persist-notify cycle
//!
//! This module contains the cycle that ties the watcher together:
//! - Fetching every listing page of the search, paced by a fixed delay
//! - Extracting vacancy records and optionally enriching them with detail skills
//! - Reconciling the batch against the persisted full set
//! - Persisting the new full set, the new-vacancy snapshot and the database rows
//! - Notifying subscribers about new and updated vacancies
//!
//! At most one cycle runs at a time, across processes sharing a snapshot
//! directory; a trigger that arrives while a cycle is in progress is
//! rejected with `CycleOutcome::AlreadyRunning`.

use crate::config::Config;
use crate::crawler::extractor::VacancyExtractor;
use crate::crawler::fetcher::{build_http_client, PageFetcher};
use crate::crawler::scheduler::CycleRunner;
use crate::notify::{DeliverySummary, Dispatcher, Notifier, TelegramNotifier};
use crate::reconcile::{reconcile, ReconciliationResult};
use crate::storage::{self, CycleLock, FullSetStore, JsonSnapshotStore, SharedStore};
use crate::vacancy::{FullSet, VacancyRecord};
use crate::{ConfigError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use url::Url;

/// What happened to a cycle trigger
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    /// The cycle ran to the end
    Completed(CycleReport),

    /// Another cycle was in progress; nothing was done
    AlreadyRunning,
}

/// Counters and results of one completed cycle
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub search_term: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Listing pages requested
    pub pages_requested: u32,
    pub pages_fetched: u32,
    pub pages_failed: u32,

    /// Vacancy blocks skipped for a missing title or link
    pub blocks_dropped: usize,

    /// Records in the batch handed to the reconciler
    pub records_extracted: usize,

    /// Detail pages that could not be fetched (snippet skills kept)
    pub details_failed: usize,

    /// Size of the full set before the cycle
    pub prior_known: usize,

    /// False if the persisted full set was unreadable and the cycle started empty
    pub prior_loaded: bool,

    pub result: ReconciliationResult,

    /// Database rows written
    pub rows_inserted: usize,
    pub rows_updated: usize,

    /// Snapshot of this cycle's new vacancies, if any were found
    pub new_batch_path: Option<PathBuf>,

    /// `None` when no notification sink is configured
    pub notifications: Option<DeliverySummary>,
}

impl CycleReport {
    fn start(search_term: &str, started_at: DateTime<Utc>) -> Self {
        Self {
            search_term: search_term.to_string(),
            started_at,
            finished_at: started_at,
            pages_requested: 0,
            pages_fetched: 0,
            pages_failed: 0,
            blocks_dropped: 0,
            records_extracted: 0,
            details_failed: 0,
            prior_known: 0,
            prior_loaded: true,
            result: ReconciliationResult::default(),
            rows_inserted: 0,
            rows_updated: 0,
            new_batch_path: None,
            notifications: None,
        }
    }

    pub fn new_count(&self) -> usize {
        self.result.new.len()
    }

    pub fn updated_count(&self) -> usize {
        self.result.updated.len()
    }

    pub fn unchanged_count(&self) -> usize {
        self.result.unchanged.len()
    }
}

/// Runs scrape cycles against the configured search
pub struct RunCoordinator {
    config: Arc<Config>,
    fetcher: PageFetcher,
    extractor: VacancyExtractor,
    base_url: Url,
    full_set: Arc<dyn FullSetStore>,
    store: SharedStore,
    dispatcher: Option<Dispatcher>,
    cycle_lock: AsyncMutex<()>,
    lock_dir: PathBuf,
}

impl RunCoordinator {
    /// Creates a coordinator from its collaborators
    ///
    /// # Arguments
    ///
    /// * `config` - The watcher configuration
    /// * `full_set` - Where the full known set lives between cycles
    /// * `store` - The queryable vacancy store
    /// * `notifier` - Notification sink, if any
    ///
    /// # Returns
    ///
    /// * `Ok(RunCoordinator)` - Ready to run cycles
    /// * `Err(WatchError)` - The HTTP client, a selector or the base URL was invalid
    pub fn new(
        config: Config,
        full_set: Arc<dyn FullSetStore>,
        store: SharedStore,
        notifier: Option<Arc<dyn Notifier>>,
    ) -> Result<Self> {
        let client = build_http_client(&config.http)?;
        let fetcher = PageFetcher::new(client, &config.scraper);
        let extractor = VacancyExtractor::from_config(&config.selectors)?;
        let base_url = Url::parse(&config.scraper.base_url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid base_url '{}': {}", config.scraper.base_url, e))
        })?;
        let dispatcher = notifier.map(|notifier| Dispatcher::new(store.clone(), notifier));
        let lock_dir = PathBuf::from(&config.storage.snapshot_dir);

        Ok(Self {
            config: Arc::new(config),
            fetcher,
            extractor,
            base_url,
            full_set,
            store,
            dispatcher,
            cycle_lock: AsyncMutex::new(()),
            lock_dir,
        })
    }

    /// Creates a coordinator with the collaborators named in `config`
    ///
    /// Opens the SQLite database and the snapshot directory, and sets up the
    /// Telegram sink when a `[telegram]` section is present.
    pub fn from_config(config: Config) -> Result<Self> {
        let store = storage::share(storage::open_storage(Path::new(
            &config.storage.database_path,
        ))?);
        let full_set = Arc::new(JsonSnapshotStore::new(&config.storage.snapshot_dir)?);

        let notifier: Option<Arc<dyn Notifier>> = match &config.telegram {
            Some(telegram) => {
                let client = reqwest::Client::builder()
                    .timeout(Duration::from_secs(config.http.timeout_secs))
                    .build()?;
                Some(Arc::new(TelegramNotifier::new(client, telegram)))
            }
            None => {
                tracing::info!("No [telegram] section, notifications are disabled");
                None
            }
        };

        Self::new(config, full_set, store, notifier)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The vacancy store, for queries and subscription management
    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Returns true while this coordinator runs a cycle
    pub fn is_running(&self) -> bool {
        self.cycle_lock.try_lock().is_err()
    }

    /// Runs one cycle for the configured search term and page count
    pub async fn run_cycle(&self) -> Result<CycleOutcome> {
        let scraper = &self.config.scraper;
        self.run_cycle_for(&scraper.search_term, scraper.page_count)
            .await
    }

    /// Starts a cycle on a worker task and returns immediately
    pub fn trigger(self: &Arc<Self>) -> JoinHandle<Result<CycleOutcome>> {
        let coordinator = Arc::clone(self);
        tokio::spawn(async move { coordinator.run_cycle().await })
    }

    /// Runs one cycle for an explicit search term and page count
    ///
    /// # Cycle
    ///
    /// 1. Fetch pages `0..page_count`; a failed page is logged and skipped
    /// 2. Extract records from every fetched page into one batch
    /// 3. Reconcile the batch against the persisted full set
    /// 4. Insert new rows and update changed rows in the database
    /// 5. Save the new full set, then the new-vacancy snapshot if there are any
    /// 6. Notify subscribers about new and updated vacancies
    ///
    /// The full set is only replaced once the database rows are written, so a
    /// failed write leaves the prior set in place and the next cycle sees the
    /// same records as new or updated again.
    ///
    /// # Returns
    ///
    /// * `Ok(CycleOutcome::Completed)` - The cycle ran; see the report
    /// * `Ok(CycleOutcome::AlreadyRunning)` - Rejected, another cycle is in
    ///   progress here or in another process on the same snapshot directory
    /// * `Err(WatchError)` - The cycle lock, the database rows or the full set
    ///   could not be written
    pub async fn run_cycle_for(&self, search_term: &str, page_count: u32) -> Result<CycleOutcome> {
        let Ok(_running) = self.cycle_lock.try_lock() else {
            tracing::info!("A cycle is already running, ignoring trigger");
            return Ok(CycleOutcome::AlreadyRunning);
        };
        let Some(_cycle_file) = CycleLock::try_acquire(&self.lock_dir)? else {
            tracing::info!(
                "Another process holds {}, ignoring trigger",
                CycleLock::path_in(&self.lock_dir).display()
            );
            return Ok(CycleOutcome::AlreadyRunning);
        };

        let started_at = Utc::now();
        let mut report = CycleReport::start(search_term, started_at);
        tracing::info!("Starting cycle for '{}' ({} pages)", search_term, page_count);

        let mut batch = self
            .collect_batch(search_term, page_count, started_at, &mut report)
            .await;
        if self.config.scraper.fetch_details && !batch.is_empty() {
            self.enrich_with_details(&mut batch, &mut report).await;
        }
        report.records_extracted = batch.len();

        let prior = self.load_prior(&mut report);
        let result = reconcile(prior, batch);
        tracing::info!(
            "Reconciled {} records: {} new, {} updated, {} unchanged",
            result.total(),
            result.new.len(),
            result.updated.len(),
            result.unchanged.len()
        );

        self.write_store(&result, &mut report)?;

        self.full_set.save(&result.full_set)?;
        if !result.new.is_empty() {
            match self.full_set.save_new_batch(&result.new, started_at) {
                Ok(path) => {
                    tracing::info!("Saved {} new vacancies to {}", result.new.len(), path.display());
                    report.new_batch_path = Some(path);
                }
                Err(e) => tracing::warn!("Could not save new-vacancy snapshot: {}", e),
            }
        }

        if let Some(dispatcher) = &self.dispatcher {
            report.notifications = Some(dispatcher.deliver(&result.changed()).await);
        }

        report.result = result;
        report.finished_at = Utc::now();
        tracing::info!(
            "Cycle finished: {}/{} pages fetched, {} known vacancies",
            report.pages_fetched,
            report.pages_requested,
            report.result.full_set.len()
        );

        Ok(CycleOutcome::Completed(report))
    }

    async fn collect_batch(
        &self,
        search_term: &str,
        page_count: u32,
        observed_at: DateTime<Utc>,
        report: &mut CycleReport,
    ) -> Vec<VacancyRecord> {
        let mut batch = Vec::new();

        if search_term.trim().is_empty() {
            tracing::warn!("Search term is empty, no pages will be fetched");
            report.pages_failed = page_count;
            return batch;
        }

        let delay = Duration::from_millis(self.config.scraper.page_delay_ms);
        for page_index in 0..page_count {
            if page_index > 0 {
                tokio::time::sleep(delay).await;
            }
            report.pages_requested += 1;

            let markup = match self.fetcher.fetch(search_term, page_index).await {
                Ok(markup) => markup,
                Err(e) => {
                    tracing::warn!("Skipping page {}: {}", page_index, e);
                    report.pages_failed += 1;
                    continue;
                }
            };
            report.pages_fetched += 1;

            let page = self
                .extractor
                .extract_page(&markup, &self.base_url, observed_at);
            tracing::debug!(
                "Page {}: {} vacancies, {} blocks dropped",
                page_index,
                page.records.len(),
                page.blocks_dropped
            );
            report.blocks_dropped += page.blocks_dropped;
            batch.extend(page.records);

            if self.config.scraper.stop_at_last_page && !page.has_next_page {
                tracing::info!("Page {} has no next page, stopping", page_index);
                break;
            }
        }

        batch
    }

    /// Replaces snippet skills with the tags of each vacancy's own page
    async fn enrich_with_details(&self, batch: &mut [VacancyRecord], report: &mut CycleReport) {
        let delay = Duration::from_millis(self.config.scraper.detail_delay_ms);

        for (index, record) in batch.iter_mut().enumerate() {
            if index > 0 {
                tokio::time::sleep(delay).await;
            }

            match self.fetcher.fetch_detail(&record.link).await {
                Ok(markup) => {
                    let skills = self.extractor.extract_detail_skills(&markup);
                    if !skills.is_empty() {
                        record.skills = skills;
                    }
                }
                Err(e) => {
                    tracing::warn!("Keeping snippet skills for {}: {}", record.id, e);
                    report.details_failed += 1;
                }
            }
        }
    }

    fn load_prior(&self, report: &mut CycleReport) -> FullSet {
        match self.full_set.load() {
            Ok(prior) => {
                report.prior_known = prior.len();
                prior
            }
            Err(e) => {
                tracing::warn!("Known vacancies unreadable, starting from an empty set: {}", e);
                report.prior_loaded = false;
                FullSet::new()
            }
        }
    }

    fn write_store(&self, result: &ReconciliationResult, report: &mut CycleReport) -> Result<()> {
        let mut store = storage::lock(&self.store)?;

        report.rows_inserted = store.bulk_insert_if_absent(&result.new)?;
        for record in &result.updated {
            if store.update_vacancy(record)? {
                report.rows_updated += 1;
            } else if store.insert_if_absent(record)? {
                report.rows_inserted += 1;
            }
        }

        tracing::debug!(
            "Database: {} rows inserted, {} rows updated",
            report.rows_inserted,
            report.rows_updated
        );
        Ok(())
    }
}

#[async_trait]
impl CycleRunner for RunCoordinator {
    async fn run_cycle(&self) -> Result<CycleOutcome> {
        RunCoordinator::run_cycle(self).await
    }
}
