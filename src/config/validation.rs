use crate::config::types::{
    Config, HttpConfig, ListingSelectorsConfig, ScheduleConfig, ScraperConfig, StorageConfig,
    TelegramConfig,
};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_scraper_config(&config.scraper)?;
    validate_http_config(&config.http)?;
    validate_schedule_config(&config.schedule)?;
    validate_storage_config(&config.storage)?;
    if let Some(telegram) = &config.telegram {
        validate_telegram_config(telegram)?;
    }
    validate_selectors(&config.selectors)?;
    Ok(())
}

/// Validates scraper configuration
fn validate_scraper_config(config: &ScraperConfig) -> Result<(), ConfigError> {
    if config.search_term.trim().is_empty() {
        return Err(ConfigError::Validation(
            "search_term cannot be empty".to_string(),
        ));
    }

    if config.region.trim().is_empty() {
        return Err(ConfigError::Validation("region cannot be empty".to_string()));
    }

    validate_http_url("base_url", &config.base_url)?;

    if config.page_count < 1 || config.page_count > 100 {
        return Err(ConfigError::Validation(format!(
            "page_count must be between 1 and 100, got {}",
            config.page_count
        )));
    }

    if config.page_delay_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "page_delay_ms must be >= 100ms, got {}ms",
            config.page_delay_ms
        )));
    }

    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 || config.timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be between 1 and 300, got {}",
            config.timeout_secs
        )));
    }

    Ok(())
}

/// Validates repeating mode cadence
fn validate_schedule_config(config: &ScheduleConfig) -> Result<(), ConfigError> {
    if config.interval_secs < 10 {
        return Err(ConfigError::Validation(format!(
            "interval_secs must be >= 10, got {}",
            config.interval_secs
        )));
    }

    if config.cooldown_secs < 1 {
        return Err(ConfigError::Validation(
            "cooldown_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates storage locations
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.snapshot_dir.is_empty() {
        return Err(ConfigError::Validation(
            "snapshot_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the Telegram sink
fn validate_telegram_config(config: &TelegramConfig) -> Result<(), ConfigError> {
    if config.bot_token.trim().is_empty() {
        return Err(ConfigError::Validation(
            "bot_token cannot be empty".to_string(),
        ));
    }

    validate_http_url("api_base", &config.api_base)?;

    if config.preview_limit < 1 {
        return Err(ConfigError::Validation(
            "preview_limit must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates that every listing selector parses
fn validate_selectors(config: &ListingSelectorsConfig) -> Result<(), ConfigError> {
    let fields = [
        ("block", &config.block),
        ("title", &config.title),
        ("company", &config.company),
        ("salary", &config.salary),
        ("experience", &config.experience),
        ("location", &config.location),
        ("requirement", &config.requirement),
        ("publication-date", &config.publication_date),
        ("next-page", &config.next_page),
        ("detail-skills", &config.detail_skills),
    ];

    for (field, selector) in fields {
        Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
            field: field.to_string(),
            message: e.to_string(),
        })?;
    }

    Ok(())
}

/// Validates an absolute HTTP(S) URL
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use HTTP or HTTPS",
            field, value
        )));
    }

    Ok(())
}
