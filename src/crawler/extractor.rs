//! Vacancy extraction from listing markup
//!
//! This module turns one listing page into zero or more `VacancyRecord`s:
//! - Locates every vacancy block with the configured selectors
//! - Reads title, link, company, salary, location and publication date
//! - Derives skills and experience from the requirement snippet
//! - Reports whether the page links to a following page

use crate::config::ListingSelectorsConfig;
use crate::crawler::fields::{normalize_whitespace, parse_experience, split_skills};
use crate::url::{canonical_link, vacancy_id_from_link};
use crate::vacancy::{VacancyRecord, NOT_SPECIFIED};
use crate::{ConfigError, UrlError};
use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use url::Url;

/// Compiled CSS selectors for the listing markup
#[derive(Debug, Clone)]
pub struct ListingSelectors {
    block: Selector,
    title: Selector,
    company: Selector,
    salary: Selector,
    experience: Selector,
    location: Selector,
    requirement: Selector,
    publication_date: Selector,
    next_page: Selector,
    detail_skills: Selector,
}

impl ListingSelectors {
    /// Compiles every selector in `config`
    ///
    /// # Returns
    ///
    /// * `Ok(ListingSelectors)` - All selectors compiled
    /// * `Err(ConfigError::InvalidSelector)` - The first selector that failed, by field name
    pub fn from_config(config: &ListingSelectorsConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            block: compile("block", &config.block)?,
            title: compile("title", &config.title)?,
            company: compile("company", &config.company)?,
            salary: compile("salary", &config.salary)?,
            experience: compile("experience", &config.experience)?,
            location: compile("location", &config.location)?,
            requirement: compile("requirement", &config.requirement)?,
            publication_date: compile("publication-date", &config.publication_date)?,
            next_page: compile("next-page", &config.next_page)?,
            detail_skills: compile("detail-skills", &config.detail_skills)?,
        })
    }
}

fn compile(field: &str, selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        field: field.to_string(),
        message: e.to_string(),
    })
}

/// Why a single block was dropped
#[derive(Debug, Error)]
enum BlockError {
    #[error("no title anchor")]
    MissingTitle,

    #[error("title anchor has no href")]
    MissingLink,

    #[error("title text is empty")]
    EmptyTitle,

    #[error(transparent)]
    Link(#[from] UrlError),
}

/// Everything read from one listing page
#[derive(Debug, Clone, Default)]
pub struct ExtractedPage {
    /// Records in document order
    pub records: Vec<VacancyRecord>,

    /// Blocks located on the page
    pub blocks_seen: usize,

    /// Blocks skipped because a required part was missing
    pub blocks_dropped: usize,

    /// True if the page links to a following page
    pub has_next_page: bool,
}

/// Extracts vacancy records from listing markup
#[derive(Debug, Clone)]
pub struct VacancyExtractor {
    selectors: ListingSelectors,
}

impl VacancyExtractor {
    pub fn new(selectors: ListingSelectors) -> Self {
        Self { selectors }
    }

    /// Builds an extractor from selector configuration
    pub fn from_config(config: &ListingSelectorsConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(ListingSelectors::from_config(config)?))
    }

    /// Extracts the records of one listing page
    ///
    /// Relative links are resolved against `base_url`. Every record gets
    /// `observed_at` as its creation time; the reconciler keeps the first-seen
    /// time for ids it already knows.
    ///
    /// Markup without any vacancy block yields an empty list.
    pub fn extract(
        &self,
        markup: &str,
        base_url: &Url,
        observed_at: DateTime<Utc>,
    ) -> Vec<VacancyRecord> {
        self.extract_page(markup, base_url, observed_at).records
    }

    /// Like [`extract`](Self::extract) but also reports block counts and paging
    pub fn extract_page(
        &self,
        markup: &str,
        base_url: &Url,
        observed_at: DateTime<Utc>,
    ) -> ExtractedPage {
        let document = Html::parse_document(markup);
        let mut page = ExtractedPage {
            has_next_page: document.select(&self.selectors.next_page).next().is_some(),
            ..ExtractedPage::default()
        };

        for block in document.select(&self.selectors.block) {
            page.blocks_seen += 1;
            match self.extract_block(block, base_url, observed_at) {
                Ok(record) => page.records.push(record),
                Err(e) => {
                    page.blocks_dropped += 1;
                    tracing::debug!("Skipping vacancy block {}: {}", page.blocks_seen, e);
                }
            }
        }

        page
    }

    /// Extracts the skill tags of a vacancy's own page
    ///
    /// Tags are whitespace-normalized and deduplicated in display order.
    pub fn extract_detail_skills(&self, markup: &str) -> Vec<String> {
        let document = Html::parse_document(markup);
        let mut skills: Vec<String> = Vec::new();

        for element in document.select(&self.selectors.detail_skills) {
            let skill = element_text(element);
            if !skill.is_empty() && !skills.contains(&skill) {
                skills.push(skill);
            }
        }

        skills
    }

    fn extract_block(
        &self,
        block: ElementRef<'_>,
        base_url: &Url,
        observed_at: DateTime<Utc>,
    ) -> Result<VacancyRecord, BlockError> {
        let anchor = block
            .select(&self.selectors.title)
            .next()
            .ok_or(BlockError::MissingTitle)?;
        let href = anchor.value().attr("href").ok_or(BlockError::MissingLink)?;

        let title = element_text(anchor);
        if title.is_empty() {
            return Err(BlockError::EmptyTitle);
        }

        let link = canonical_link(href, base_url)?;
        let id = vacancy_id_from_link(&link)?;

        let mut record = VacancyRecord::new(id, title, link.to_string(), observed_at);
        record.company = self.field(block, &self.selectors.company);
        record.salary = self.field(block, &self.selectors.salary);
        record.location = self.field(block, &self.selectors.location);
        record.publication_date = self.field(block, &self.selectors.publication_date);

        let snippet = first_text(block, &self.selectors.requirement);
        if let Some(snippet) = &snippet {
            record.skills = split_skills(snippet);
        }

        record.experience = first_text(block, &self.selectors.experience)
            .and_then(|text| parse_experience(&text))
            .or_else(|| snippet.as_deref().and_then(parse_experience))
            .unwrap_or_else(|| NOT_SPECIFIED.to_string());

        Ok(record)
    }

    fn field(&self, block: ElementRef<'_>, selector: &Selector) -> String {
        first_text(block, selector).unwrap_or_else(|| NOT_SPECIFIED.to_string())
    }
}

/// Text of the first match under `block`, if it is not blank
fn first_text(block: ElementRef<'_>, selector: &Selector) -> Option<String> {
    block
        .select(selector)
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty())
}

fn element_text(element: ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<String>())
}
