use serde::Deserialize;

/// Desktop browser identity sent with every request; the listings site
/// rejects clients that do not look like a browser.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/134.0.0.0 Safari/537.36";

/// Main configuration structure for Vacancy Watch
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub telegram: Option<TelegramConfig>,
    #[serde(default)]
    pub selectors: ListingSelectorsConfig,
}

/// What to scrape and how politely
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperConfig {
    /// Search term sent as the `text` query parameter
    #[serde(rename = "search-term")]
    pub search_term: String,

    /// Region code sent as the `area` query parameter
    #[serde(default = "default_region")]
    pub region: String,

    /// Listings endpoint
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Number of listing pages per cycle
    #[serde(rename = "page-count", default = "default_page_count")]
    pub page_count: u32,

    /// Delay between consecutive page fetches (milliseconds)
    #[serde(rename = "page-delay-ms", default = "default_page_delay_ms")]
    pub page_delay_ms: u64,

    /// Fetch every vacancy's own page for its skill tags
    #[serde(rename = "fetch-details", default)]
    pub fetch_details: bool,

    /// Delay between consecutive detail page fetches (milliseconds)
    #[serde(rename = "detail-delay-ms", default = "default_detail_delay_ms")]
    pub detail_delay_ms: u64,

    /// Stop paging once a page has no next-page link
    #[serde(rename = "stop-at-last-page", default)]
    pub stop_at_last_page: bool,
}

/// HTTP client settings
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    #[serde(rename = "accept-language", default = "default_accept_language")]
    pub accept_language: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Repeating mode cadence
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Time between the end of one cycle and the start of the next (seconds)
    #[serde(rename = "interval-secs", default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Wait after a failed cycle before trying again (seconds)
    #[serde(rename = "cooldown-secs", default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
}

/// Where state is kept between cycles
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Directory holding the JSON snapshots
    #[serde(rename = "snapshot-dir")]
    pub snapshot_dir: String,
}

/// Telegram bot used as the notification sink
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    #[serde(rename = "bot-token")]
    pub bot_token: String,

    #[serde(rename = "api-base", default = "default_api_base")]
    pub api_base: String,

    /// How many vacancies are sent in full per notification
    #[serde(rename = "preview-limit", default = "default_preview_limit")]
    pub preview_limit: usize,
}

/// CSS selectors describing the listing markup
#[derive(Debug, Clone, Deserialize)]
pub struct ListingSelectorsConfig {
    #[serde(default = "default_block_selector")]
    pub block: String,
    #[serde(default = "default_title_selector")]
    pub title: String,
    #[serde(default = "default_company_selector")]
    pub company: String,
    #[serde(default = "default_salary_selector")]
    pub salary: String,
    #[serde(default = "default_experience_selector")]
    pub experience: String,
    #[serde(default = "default_location_selector")]
    pub location: String,
    #[serde(default = "default_requirement_selector")]
    pub requirement: String,
    #[serde(rename = "publication-date", default = "default_date_selector")]
    pub publication_date: String,
    #[serde(rename = "next-page", default = "default_next_page_selector")]
    pub next_page: String,
    #[serde(rename = "detail-skills", default = "default_detail_skills_selector")]
    pub detail_skills: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            cooldown_secs: default_cooldown_secs(),
        }
    }
}

impl Default for ListingSelectorsConfig {
    fn default() -> Self {
        Self {
            block: default_block_selector(),
            title: default_title_selector(),
            company: default_company_selector(),
            salary: default_salary_selector(),
            experience: default_experience_selector(),
            location: default_location_selector(),
            requirement: default_requirement_selector(),
            publication_date: default_date_selector(),
            next_page: default_next_page_selector(),
            detail_skills: default_detail_skills_selector(),
        }
    }
}

fn default_region() -> String {
    "160".to_string()
}

fn default_base_url() -> String {
    "https://hh.kz/search/vacancy".to_string()
}

fn default_page_count() -> u32 {
    20
}

fn default_page_delay_ms() -> u64 {
    2000
}

fn default_detail_delay_ms() -> u64 {
    500
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_accept_language() -> String {
    "ru-RU,ru;q=0.9,en-US;q=0.8,en;q=0.7".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_interval_secs() -> u64 {
    600
}

fn default_cooldown_secs() -> u64 {
    60
}

fn default_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_preview_limit() -> usize {
    3
}

fn default_block_selector() -> String {
    r#"[data-qa="vacancy-serp__vacancy"]"#.to_string()
}

fn default_title_selector() -> String {
    r#"a[data-qa="serp-item__title"]"#.to_string()
}

fn default_company_selector() -> String {
    r#"[data-qa="vacancy-serp__vacancy-employer"]"#.to_string()
}

fn default_salary_selector() -> String {
    r#"[data-qa="vacancy-serp__vacancy-compensation"]"#.to_string()
}

fn default_experience_selector() -> String {
    r#"[data-qa^="vacancy-serp__vacancy-work-experience"]"#.to_string()
}

fn default_location_selector() -> String {
    r#"[data-qa="vacancy-serp__vacancy-address"]"#.to_string()
}

fn default_requirement_selector() -> String {
    r#"[data-qa="vacancy-serp__vacancy_snippet_requirement"]"#.to_string()
}

fn default_date_selector() -> String {
    r#"[data-qa="vacancy-serp__vacancy-date"]"#.to_string()
}

fn default_next_page_selector() -> String {
    r#"a[data-qa="pager-next"]"#.to_string()
}

fn default_detail_skills_selector() -> String {
    r#"[data-qa="skills-element"], .bloko-tag__section"#.to_string()
}
