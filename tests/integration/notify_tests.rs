//! Subscriber notification across cycles

use crate::common::{listing_page, mount_page, test_config, vacancy_block};
use tempfile::TempDir;
use vacancy_watch::config::TelegramConfig;
use vacancy_watch::crawler::{CycleOutcome, CycleReport, RunCoordinator};
use vacancy_watch::notify::DeliverySummary;
use vacancy_watch::storage::{self, VacancyStore};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BOT_PATH: &str = "/bot42:token/sendMessage";

async fn telegram_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(BOT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true })))
        .mount(&server)
        .await;
    server
}

async fn sent_messages(server: &MockServer) -> Vec<serde_json::Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|request| serde_json::from_slice(&request.body).unwrap())
        .collect()
}

async fn completed(coordinator: &RunCoordinator) -> CycleReport {
    match coordinator.run_cycle().await.unwrap() {
        CycleOutcome::Completed(report) => report,
        CycleOutcome::AlreadyRunning => panic!("no other cycle should be running"),
    }
}

#[tokio::test]
async fn test_subscribers_notified_once_per_vacancy() {
    let listings = MockServer::start().await;
    let telegram = telegram_server().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &listings,
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

    let mut config = test_config(&listings, dir.path(), 1);
    config.telegram = Some(TelegramConfig {
        bot_token: "42:token".to_string(),
        api_base: telegram.uri(),
        preview_limit: 2,
    });
    let coordinator = RunCoordinator::from_config(config).unwrap();
    {
        let mut store = storage::lock(coordinator.store()).unwrap();
        store.add_subscription(1001).unwrap();
    }

    let first = completed(&coordinator).await;
    assert_eq!(
        first.notifications,
        Some(DeliverySummary {
            recipients: 1,
            notified: 1,
            failed: 0,
            records_sent: 3,
        })
    );

    // header + 2 previews + trailer
    let messages = sent_messages(&telegram).await;
    assert_eq!(messages.len(), 4);
    assert!(messages.iter().all(|m| m["chat_id"] == 1001));
    assert!(messages[0]["text"].as_str().unwrap().contains("3"));
    assert_eq!(messages[1]["parse_mode"], "HTML");
    assert!(messages[3].get("parse_mode").is_none());

    // nothing changed, nothing sent
    let second = completed(&coordinator).await;
    assert_eq!(second.notifications.unwrap().records_sent, 0);
    assert_eq!(sent_messages(&telegram).await.len(), 4);

    let store = storage::lock(coordinator.store()).unwrap();
    assert_eq!(store.count_sent().unwrap(), 3);
}

#[tokio::test]
async fn test_failed_chat_does_not_block_others() {
    let listings = MockServer::start().await;
    let telegram = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &listings,
        0,
        listing_page(&[vacancy_block("7", "Go Developer", "300 000 ₸")], false),
    )
    .await;
    Mock::given(method("POST"))
        .and(path(BOT_PATH))
        .and(body_partial_json(serde_json::json!({ "chat_id": 2 })))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "ok": false,
            "description": "Forbidden: bot was blocked by the user"
        })))
        .mount(&telegram)
        .await;
    Mock::given(method("POST"))
        .and(path(BOT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true })))
        .mount(&telegram)
        .await;

    let mut config = test_config(&listings, dir.path(), 1);
    config.telegram = Some(TelegramConfig {
        bot_token: "42:token".to_string(),
        api_base: telegram.uri(),
        preview_limit: 5,
    });
    let coordinator = RunCoordinator::from_config(config).unwrap();
    {
        let mut store = storage::lock(coordinator.store()).unwrap();
        store.add_subscription(1).unwrap();
        store.add_subscription(2).unwrap();
    }

    let report = completed(&coordinator).await;
    let summary = report.notifications.unwrap();
    assert_eq!(summary.recipients, 2);
    assert_eq!(summary.notified, 1);
    assert_eq!(summary.failed, 1);

    {
        let store = storage::lock(coordinator.store()).unwrap();
        assert!(store.was_sent(1, "7").unwrap());
        assert!(!store.was_sent(2, "7").unwrap());
    }

    // only new and updated vacancies are offered, so nothing goes out now
    let second = completed(&coordinator).await;
    assert_eq!(second.notifications.unwrap().records_sent, 0);
}
