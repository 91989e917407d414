//! Message bodies for chat notifications
//!
//! Messages use Telegram's HTML parse mode, so every scraped value is escaped.

use crate::vacancy::VacancyRecord;
use html_escape::{encode_double_quoted_attribute, encode_text};

/// Renders one vacancy as an HTML message
pub fn format_vacancy(record: &VacancyRecord) -> String {
    let mut message = format!(
        "<b>Vacancy:</b> {}\n<b>Company:</b> {}\n<b>Salary:</b> {}\n<b>Experience:</b> {}\n<b>Location:</b> {}\n<b>Link:</b> <a href=\"{}\">Open vacancy</a>",
        encode_text(&record.title),
        encode_text(&record.company),
        encode_text(&record.salary),
        encode_text(&record.experience),
        encode_text(&record.location),
        encode_double_quoted_attribute(&record.link),
    );

    if !record.skills.is_empty() {
        message.push_str(&format!(
            "\n<b>Skills:</b> {}",
            encode_text(&record.skills.join(", "))
        ));
    }

    message.push_str(&format!(
        "\n<b>Added:</b> {}",
        record.created_at.format("%Y-%m-%d %H:%M")
    ));

    message
}

/// First message of a notification
pub fn format_header(count: usize) -> String {
    if count == 1 {
        "🔔 Found 1 new vacancy!".to_string()
    } else {
        format!("🔔 Found {} new vacancies!", count)
    }
}

/// Last message when only a preview was sent
pub fn format_trailer(remaining: usize) -> String {
    format!(
        "And {} more. Run the `latest` command to see the most recent vacancies.",
        remaining
    )
}
