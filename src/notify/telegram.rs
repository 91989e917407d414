//! Telegram Bot API sink

use crate::config::TelegramConfig;
use crate::notify::format::{format_header, format_trailer, format_vacancy};
use crate::notify::traits::{Notifier, NotifyError};
use crate::vacancy::VacancyRecord;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

/// Response envelope of the Bot API
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Sends notifications through a Telegram bot
///
/// A notification is a header with the count, up to `preview_limit` vacancies
/// as separate messages, and a trailer naming how many were left out.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    bot_token: String,
    preview_limit: usize,
}

impl TelegramNotifier {
    pub fn new(client: Client, config: &TelegramConfig) -> Self {
        Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            bot_token: config.bot_token.clone(),
            preview_limit: config.preview_limit,
        }
    }

    /// Posts one message to `sendMessage`
    pub async fn send_message(&self, chat_id: i64, text: &str, html: bool) -> Result<(), NotifyError> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.bot_token);

        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });
        if html {
            body["parse_mode"] = serde_json::json!("HTML");
        }

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        let reply: Option<ApiResponse> = response.json().await.ok();

        match reply {
            Some(reply) if status.is_success() && reply.ok => Ok(()),
            reply => Err(NotifyError::Api {
                status: status.as_u16(),
                description: reply
                    .and_then(|r| r.description)
                    .unwrap_or_else(|| "no description".to_string()),
            }),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, recipient: i64, records: &[VacancyRecord]) -> Result<(), NotifyError> {
        if records.is_empty() {
            return Ok(());
        }

        self.send_message(recipient, &format_header(records.len()), false)
            .await?;

        for record in records.iter().take(self.preview_limit) {
            self.send_message(recipient, &format_vacancy(record), true)
                .await?;
        }

        if records.len() > self.preview_limit {
            self.send_message(recipient, &format_trailer(records.len() - self.preview_limit), false)
                .await?;
        }

        tracing::debug!("Notified chat {} about {} vacancies", recipient, records.len());
        Ok(())
    }
}
