//! Free-text field parsing for listing blocks
//!
//! Listing snippets are prose, not structured data. Skills and experience are
//! recovered from them by best-effort text segmentation and phrase matching.

use regex::Regex;
use std::sync::LazyLock;

/// Experience phrases, most specific first. The first pattern that matches wins.
static EXPERIENCE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // "опыт работы от 1 до 3 лет"
        r"(?i)(?:опыт(?:\s+работы)?:?\s*)?от\s+\d{1,2}\s+до\s+\d{1,2}\s*(?:год[аов]*|лет)\b",
        // "Опыт 1–3 года", "3-6 лет"
        r"(?i)(?:опыт(?:\s+работы)?:?\s*)?\b\d{1,2}\s*[-–—]\s*\d{1,2}\s*(?:год[аов]*|лет)\b",
        // "experience from 1 to 3 years"
        r"(?i)(?:experience:?\s*)?from\s+\d{1,2}\s+to\s+\d{1,2}\s*years?\b",
        // "Experience 1-3 years"
        r"(?i)(?:experience:?\s*)?\b\d{1,2}\s*[-–—]\s*\d{1,2}\s*years?\b",
        // "опыт от 3 лет", "более 6 лет"
        r"(?i)(?:опыт(?:\s+работы)?:?\s*)?(?:от|более)\s+\d{1,2}\s*(?:год[аов]*|лет)\b",
        // "experience from 2 years", "over 5 years", "more than 3 years"
        r"(?i)(?:experience:?\s*)?(?:from|over|more\s+than)\s+\d{1,2}\+?\s*years?\b",
        // "3+ years", "5 лет"; a year number like "2024 году" is not experience
        r"(?i)\b\d{1,2}\+?\s*(?:год[аов]*|лет|years?)\b",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("experience pattern must compile"))
    .collect()
});

/// Collapses every run of whitespace (including non-breaking spaces) into one space
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits a requirement snippet into skill fragments
///
/// Fragments are separated by `,` `;` or `.`, trimmed, and dropped when empty.
/// Display order is kept.
pub fn split_skills(snippet: &str) -> Vec<String> {
    snippet
        .split([',', ';', '.'])
        .map(normalize_whitespace)
        .filter(|fragment| !fragment.is_empty())
        .collect()
}

/// Finds the first experience phrase in the text
///
/// # Returns
///
/// * `Some(String)` - The matched phrase with whitespace normalized
/// * `None` - No pattern matched
pub fn parse_experience(text: &str) -> Option<String> {
    EXPERIENCE_PATTERNS
        .iter()
        .find_map(|pattern| pattern.find(text))
        .map(|found| normalize_whitespace(found.as_str()))
}
