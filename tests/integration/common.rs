//! Shared fixtures: configuration, listing markup and mock mounting

use std::path::Path;
use vacancy_watch::config::{
    Config, HttpConfig, ListingSelectorsConfig, ScheduleConfig, ScraperConfig, StorageConfig,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const LISTING_PATH: &str = "/search/vacancy";

/// Creates a test configuration scraping `server` and storing under `dir`
pub fn test_config(server: &MockServer, dir: &Path, page_count: u32) -> Config {
    Config {
        scraper: ScraperConfig {
            search_term: "Python".to_string(),
            region: "160".to_string(),
            base_url: format!("{}{}", server.uri(), LISTING_PATH),
            page_count,
            page_delay_ms: 1,
            fetch_details: false,
            detail_delay_ms: 1,
            stop_at_last_page: false,
        },
        http: HttpConfig {
            timeout_secs: 5,
            ..HttpConfig::default()
        },
        schedule: ScheduleConfig::default(),
        storage: StorageConfig {
            database_path: dir.join("vacancies.db").display().to_string(),
            snapshot_dir: dir.join("snapshots").display().to_string(),
        },
        telegram: None,
        selectors: ListingSelectorsConfig::default(),
    }
}

/// One vacancy block in listing markup
pub fn vacancy_block(id: &str, title: &str, salary: &str) -> String {
    format!(
        r#"<div data-qa="vacancy-serp__vacancy">
  <a data-qa="serp-item__title" href="/vacancy/{id}?query=python&amp;hhtmFrom=vacancy_search_list">{title}</a>
  <div data-qa="vacancy-serp__vacancy-employer">Company {id}</div>
  <span data-qa="vacancy-serp__vacancy-compensation">{salary}</span>
  <span data-qa="vacancy-serp__vacancy-work-experience-between1And3">Опыт 1–3 года</span>
  <div data-qa="vacancy-serp__vacancy-address">Алматы</div>
  <div data-qa="vacancy-serp__vacancy_snippet_requirement">Python, SQL, Git</div>
</div>"#
    )
}

/// A listing page holding `blocks`, optionally linking to a next page
pub fn listing_page(blocks: &[String], has_next: bool) -> String {
    let pager = if has_next {
        r#"<a data-qa="pager-next" href="?page=next">дальше</a>"#
    } else {
        ""
    };
    format!(
        "<html><body><main>{}</main>{}</body></html>",
        blocks.join("\n"),
        pager
    )
}

/// Serves `body` for listing page `page`
pub async fn mount_page(server: &MockServer, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .and(query_param("page", page.to_string()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}
