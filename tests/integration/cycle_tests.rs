//! Full-cycle tests against a mock listings site

use crate::common::{listing_page, mount_page, test_config, vacancy_block, LISTING_PATH};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use vacancy_watch::crawler::{CycleOutcome, CycleReport, RunCoordinator};
use vacancy_watch::storage::{
    self, FullSetStore, JsonSnapshotStore, SqliteStorage, StorageError, StorageResult,
    VacancyStore,
};
use vacancy_watch::{Config, VacancyRecord};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn run_once(coordinator: &RunCoordinator) -> CycleReport {
    match coordinator.run_cycle().await.expect("cycle should succeed") {
        CycleOutcome::Completed(report) => report,
        CycleOutcome::AlreadyRunning => panic!("no other cycle should be running"),
    }
}

fn snapshots(config: &Config) -> JsonSnapshotStore {
    JsonSnapshotStore::new(&config.storage.snapshot_dir).unwrap()
}

fn ids(records: &[VacancyRecord]) -> Vec<String> {
    let mut ids: Vec<String> = records.iter().map(|r| r.id.clone()).collect();
    ids.sort();
    ids
}

#[tokio::test]
async fn test_first_cycle_everything_is_new() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        0,
        listing_page(
            &[
                vacancy_block("1", "Python Developer", "от 400 000 ₸"),
                vacancy_block("2", "Data Engineer", "500 000 ₸"),
            ],
            true,
        ),
    )
    .await;
    mount_page(
        &server,
        1,
        listing_page(&[vacancy_block("3", "ML Engineer", "не указана")], false),
    )
    .await;

    let config = test_config(&server, dir.path(), 2);
    let coordinator = RunCoordinator::from_config(config.clone()).unwrap();
    let report = run_once(&coordinator).await;

    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.pages_failed, 0);
    assert_eq!(report.records_extracted, 3);
    assert_eq!(ids(&report.result.new), vec!["1", "2", "3"]);
    assert!(report.result.updated.is_empty());
    assert!(report.result.unchanged.is_empty());
    assert_eq!(report.rows_inserted, 3);

    // full set snapshot and new-vacancy snapshot
    let known = snapshots(&config).load().unwrap();
    assert_eq!(known.len(), 3);
    assert_eq!(known["1"].link, format!("{}/vacancy/1", server.uri()));
    assert_eq!(known["1"].skills, vec!["Python", "SQL", "Git"]);
    assert_eq!(known["1"].experience, "Опыт 1–3 года");
    let batch_path = report.new_batch_path.expect("new vacancies snapshot");
    assert!(batch_path.exists());

    let store = storage::lock(coordinator.store()).unwrap();
    assert_eq!(store.count_vacancies().unwrap(), 3);
    assert_eq!(store.get_vacancy("2").unwrap().unwrap().salary, "500 000 ₸");
}

#[tokio::test]
async fn test_second_cycle_classifies_updated_and_unchanged() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        0,
        listing_page(
            &[
                vacancy_block("1", "Python Developer", "400 000 ₸"),
                vacancy_block("2", "Data Engineer", "500 000 ₸"),
                vacancy_block("3", "ML Engineer", "600 000 ₸"),
            ],
            false,
        ),
    )
    .await;

    let config = test_config(&server, dir.path(), 1);
    let coordinator = RunCoordinator::from_config(config.clone()).unwrap();
    let first = run_once(&coordinator).await;
    let first_seen = first.result.full_set["1"].created_at;

    server.reset().await;
    mount_page(
        &server,
        0,
        listing_page(
            &[
                vacancy_block("1", "Python Developer", "450 000 ₸"),
                vacancy_block("2", "Data Engineer", "500 000 ₸"),
                vacancy_block("4", "Backend Developer", "700 000 ₸"),
            ],
            false,
        ),
    )
    .await;

    let second = run_once(&coordinator).await;

    assert_eq!(ids(&second.result.new), vec!["4"]);
    assert_eq!(ids(&second.result.updated), vec!["1"]);
    assert_eq!(ids(&second.result.unchanged), vec!["2"]);
    assert_eq!(second.prior_known, 3);

    // the updated record keeps its first-seen time; absent ids stay known
    let updated = &second.result.updated[0];
    assert_eq!(updated.created_at, first_seen);
    assert_eq!(updated.salary, "450 000 ₸");
    assert_eq!(second.result.full_set.len(), 4);
    assert!(second.result.full_set.contains_key("3"));

    assert_eq!(second.rows_inserted, 1);
    assert_eq!(second.rows_updated, 1);
    let store = storage::lock(coordinator.store()).unwrap();
    assert_eq!(store.get_vacancy("1").unwrap().unwrap().salary, "450 000 ₸");
    assert_eq!(store.count_vacancies().unwrap(), 4);
}

#[tokio::test]
async fn test_unchanged_listing_is_idempotent() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        0,
        listing_page(&[vacancy_block("1", "Python Developer", "400 000 ₸")], false),
    )
    .await;

    let config = test_config(&server, dir.path(), 1);
    let coordinator = RunCoordinator::from_config(config).unwrap();
    run_once(&coordinator).await;
    let second = run_once(&coordinator).await;

    assert!(second.result.new.is_empty());
    assert!(second.result.updated.is_empty());
    assert_eq!(ids(&second.result.unchanged), vec!["1"]);
    assert!(second.new_batch_path.is_none());
    assert_eq!(second.rows_inserted, 0);
}

#[tokio::test]
async fn test_failed_page_is_skipped() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .and(query_param("page", "0"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    mount_page(
        &server,
        1,
        listing_page(&[vacancy_block("9", "QA Engineer", "300 000 ₸")], false),
    )
    .await;

    let config = test_config(&server, dir.path(), 2);
    let coordinator = RunCoordinator::from_config(config).unwrap();
    let report = run_once(&coordinator).await;

    assert_eq!(report.pages_requested, 2);
    assert_eq!(report.pages_failed, 1);
    assert_eq!(report.pages_fetched, 1);
    assert_eq!(ids(&report.result.new), vec!["9"]);
}

#[tokio::test]
async fn test_all_pages_failing_keeps_known_set() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        0,
        listing_page(&[vacancy_block("1", "Python Developer", "400 000 ₸")], false),
    )
    .await;

    let config = test_config(&server, dir.path(), 1);
    let coordinator = RunCoordinator::from_config(config.clone()).unwrap();
    run_once(&coordinator).await;

    server.reset().await;
    let report = run_once(&coordinator).await;

    assert_eq!(report.pages_failed, 1);
    assert_eq!(report.result.total(), 0);
    assert_eq!(snapshots(&config).load().unwrap().len(), 1);
}

#[tokio::test]
async fn test_concurrent_trigger_is_rejected() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_page(&[vacancy_block("1", "Slow", "1 ₸")], false))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let config = test_config(&server, dir.path(), 1);
    let coordinator = Arc::new(RunCoordinator::from_config(config).unwrap());

    let first = coordinator.trigger();
    for _ in 0..100 {
        if coordinator.is_running() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(coordinator.is_running());

    let rejected = coordinator.run_cycle().await.unwrap();
    assert!(matches!(rejected, CycleOutcome::AlreadyRunning));

    let completed = first.await.unwrap().unwrap();
    assert!(matches!(completed, CycleOutcome::Completed(_)));
    assert!(!coordinator.is_running());

    // exactly one listing request was made
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_corrupt_snapshot_treated_as_empty() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        0,
        listing_page(&[vacancy_block("1", "Python Developer", "400 000 ₸")], false),
    )
    .await;

    let config = test_config(&server, dir.path(), 1);
    let store = snapshots(&config);
    std::fs::write(store.full_set_path(), "[{ truncated").unwrap();

    let coordinator = RunCoordinator::from_config(config).unwrap();
    let report = run_once(&coordinator).await;

    assert!(!report.prior_loaded);
    assert_eq!(ids(&report.result.new), vec!["1"]);
    assert_eq!(store.load().unwrap().len(), 1);
}

#[tokio::test]
async fn test_stop_at_last_page() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        0,
        listing_page(&[vacancy_block("1", "Python Developer", "400 000 ₸")], false),
    )
    .await;
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = test_config(&server, dir.path(), 3);
    config.scraper.stop_at_last_page = true;
    let coordinator = RunCoordinator::from_config(config).unwrap();
    let report = run_once(&coordinator).await;

    assert_eq!(report.pages_requested, 1);
    assert_eq!(report.records_extracted, 1);
}

#[tokio::test]
async fn test_detail_skills_replace_snippet_skills() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        0,
        listing_page(
            &[
                vacancy_block("1", "Python Developer", "400 000 ₸"),
                vacancy_block("2", "Data Engineer", "500 000 ₸"),
            ],
            false,
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/vacancy/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<div><span data-qa="skills-element">FastAPI</span><span data-qa="skills-element">Docker</span></div>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/vacancy/2"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut config = test_config(&server, dir.path(), 1);
    config.scraper.fetch_details = true;
    let coordinator = RunCoordinator::from_config(config).unwrap();
    let report = run_once(&coordinator).await;

    let known = &report.result.full_set;
    assert_eq!(known["1"].skills, vec!["FastAPI", "Docker"]);
    assert_eq!(known["2"].skills, vec!["Python", "SQL", "Git"]);
    assert_eq!(report.details_failed, 1);
}

#[tokio::test]
async fn test_cycle_for_other_search_term() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .and(query_param("text", "Rust"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_page(&[vacancy_block("5", "Rust Engineer", "1 ₸")], false)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&server, dir.path(), 5);
    let coordinator = RunCoordinator::from_config(config).unwrap();

    match coordinator.run_cycle_for("Rust", 1).await.unwrap() {
        CycleOutcome::Completed(report) => {
            assert_eq!(report.search_term, "Rust");
            assert_eq!(ids(&report.result.new), vec!["5"]);
        }
        CycleOutcome::AlreadyRunning => panic!("unexpected rejection"),
    }
}

#[tokio::test]
async fn test_cycle_in_another_coordinator_is_rejected() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_page(&[vacancy_block("1", "Slow", "1 ₸")], false))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    // two coordinators on one config, as the `run` and `once` processes are
    let config = test_config(&server, dir.path(), 1);
    let scheduled = Arc::new(RunCoordinator::from_config(config.clone()).unwrap());
    let manual = RunCoordinator::from_config(config).unwrap();

    let first = scheduled.trigger();
    for _ in 0..100 {
        if !server.received_requests().await.unwrap().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(scheduled.is_running());
    assert!(!manual.is_running());

    let rejected = manual.run_cycle().await.unwrap();
    assert!(matches!(rejected, CycleOutcome::AlreadyRunning));

    let completed = first.await.unwrap().unwrap();
    assert!(matches!(completed, CycleOutcome::Completed(_)));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);

    // the lock is released with the cycle
    let after = manual.run_cycle().await.unwrap();
    assert!(matches!(after, CycleOutcome::Completed(_)));
}

/// SQLite store whose inserts fail while `failing` is set
struct FlakyStore {
    inner: SqliteStorage,
    failing: Arc<AtomicBool>,
}

impl FlakyStore {
    fn check(&self) -> StorageResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StorageError::Database("disk I/O error".to_string()))
        } else {
            Ok(())
        }
    }
}

impl VacancyStore for FlakyStore {
    fn get_vacancy(&self, id: &str) -> StorageResult<Option<VacancyRecord>> {
        self.inner.get_vacancy(id)
    }

    fn insert_if_absent(&mut self, record: &VacancyRecord) -> StorageResult<bool> {
        self.check()?;
        self.inner.insert_if_absent(record)
    }

    fn bulk_insert_if_absent(&mut self, records: &[VacancyRecord]) -> StorageResult<usize> {
        self.check()?;
        self.inner.bulk_insert_if_absent(records)
    }

    fn update_vacancy(&mut self, record: &VacancyRecord) -> StorageResult<bool> {
        self.inner.update_vacancy(record)
    }

    fn query_latest(&self, limit: usize) -> StorageResult<Vec<VacancyRecord>> {
        self.inner.query_latest(limit)
    }

    fn query_by_keyword(&self, keyword: &str, limit: usize) -> StorageResult<Vec<VacancyRecord>> {
        self.inner.query_by_keyword(keyword, limit)
    }

    fn count_vacancies(&self) -> StorageResult<u64> {
        self.inner.count_vacancies()
    }

    fn latest_created_at(&self) -> StorageResult<Option<DateTime<Utc>>> {
        self.inner.latest_created_at()
    }

    fn add_subscription(&mut self, chat_id: i64) -> StorageResult<bool> {
        self.inner.add_subscription(chat_id)
    }

    fn remove_subscription(&mut self, chat_id: i64) -> StorageResult<bool> {
        self.inner.remove_subscription(chat_id)
    }

    fn list_subscribers(&self) -> StorageResult<Vec<i64>> {
        self.inner.list_subscribers()
    }

    fn was_sent(&self, chat_id: i64, vacancy_id: &str) -> StorageResult<bool> {
        self.inner.was_sent(chat_id, vacancy_id)
    }

    fn record_sent(&mut self, chat_id: i64, vacancy_id: &str) -> StorageResult<bool> {
        self.inner.record_sent(chat_id, vacancy_id)
    }

    fn count_sent(&self) -> StorageResult<u64> {
        self.inner.count_sent()
    }
}

#[tokio::test]
async fn test_failed_database_write_keeps_prior_full_set() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        0,
        listing_page(&[vacancy_block("1", "Python Developer", "400 000 ₸")], false),
    )
    .await;

    let config = test_config(&server, dir.path(), 1);
    let snapshots = Arc::new(snapshots(&config));
    let failing = Arc::new(AtomicBool::new(true));
    let store = storage::share(FlakyStore {
        inner: SqliteStorage::new_in_memory().unwrap(),
        failing: Arc::clone(&failing),
    });
    let coordinator = RunCoordinator::new(config, snapshots.clone(), store, None).unwrap();

    assert!(coordinator.run_cycle().await.is_err());
    assert!(snapshots.load().unwrap().is_empty());

    failing.store(false, Ordering::SeqCst);
    let report = run_once(&coordinator).await;

    assert_eq!(ids(&report.result.new), vec!["1"]);
    assert_eq!(report.rows_inserted, 1);
    assert_eq!(snapshots.load().unwrap().len(), 1);
    let store = storage::lock(coordinator.store()).unwrap();
    assert_eq!(store.count_vacancies().unwrap(), 1);
}
