//! Fan-out of new vacancies to every subscribed chat

use crate::notify::traits::Notifier;
use crate::storage::{self, SharedStore, StorageResult};
use crate::vacancy::VacancyRecord;
use std::collections::HashMap;
use std::sync::Arc;

/// Outcome of one delivery round
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliverySummary {
    /// Subscribed chats at the time of delivery
    pub recipients: usize,

    /// Chats that received a notification
    pub notified: usize,

    /// Chats whose notification failed
    pub failed: usize,

    /// Vacancies delivered, summed over chats
    pub records_sent: usize,
}

/// Delivers changed vacancies to subscribers, at most once per chat and vacancy
pub struct Dispatcher {
    store: SharedStore,
    notifier: Arc<dyn Notifier>,
}

impl Dispatcher {
    pub fn new(store: SharedStore, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Notifies every subscriber about the records it has not been sent yet
    ///
    /// A failure for one chat is logged and does not stop delivery to the
    /// others. Deliveries are recorded in the sent-log only after the chat
    /// was notified successfully.
    pub async fn deliver(&self, records: &[VacancyRecord]) -> DeliverySummary {
        let mut summary = DeliverySummary::default();
        if records.is_empty() {
            return summary;
        }

        let records = latest_per_id(records);
        let subscribers = match storage::lock(&self.store).and_then(|store| store.list_subscribers()) {
            Ok(subscribers) => subscribers,
            Err(e) => {
                tracing::error!("Could not load subscribers: {}", e);
                return summary;
            }
        };
        summary.recipients = subscribers.len();

        for chat_id in subscribers {
            let unsent = match self.unsent_for(chat_id, &records) {
                Ok(unsent) => unsent,
                Err(e) => {
                    tracing::warn!("Could not read sent-log for chat {}: {}", chat_id, e);
                    summary.failed += 1;
                    continue;
                }
            };

            if unsent.is_empty() {
                continue;
            }

            if let Err(e) = self.notifier.notify(chat_id, &unsent).await {
                tracing::warn!("Failed to notify chat {}: {}", chat_id, e);
                summary.failed += 1;
                continue;
            }

            if let Err(e) = self.mark_sent(chat_id, &unsent) {
                tracing::warn!("Could not record deliveries for chat {}: {}", chat_id, e);
            }
            summary.notified += 1;
            summary.records_sent += unsent.len();
        }

        tracing::info!(
            "Notified {}/{} subscribers ({} failed)",
            summary.notified,
            summary.recipients,
            summary.failed
        );
        summary
    }

    fn unsent_for(&self, chat_id: i64, records: &[VacancyRecord]) -> StorageResult<Vec<VacancyRecord>> {
        let store = storage::lock(&self.store)?;
        let mut unsent = Vec::new();
        for record in records {
            if !store.was_sent(chat_id, &record.id)? {
                unsent.push(record.clone());
            }
        }
        Ok(unsent)
    }

    fn mark_sent(&self, chat_id: i64, records: &[VacancyRecord]) -> StorageResult<()> {
        let mut store = storage::lock(&self.store)?;
        for record in records {
            store.record_sent(chat_id, &record.id)?;
        }
        Ok(())
    }
}

/// One record per id, at the position of its first occurrence, with its last content
fn latest_per_id(records: &[VacancyRecord]) -> Vec<VacancyRecord> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut unique: Vec<VacancyRecord> = Vec::with_capacity(records.len());

    for record in records {
        match positions.get(record.id.as_str()) {
            Some(&index) => unique[index] = record.clone(),
            None => {
                positions.insert(&record.id, unique.len());
                unique.push(record.clone());
            }
        }
    }

    unique
}
