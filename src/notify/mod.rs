//! Notification module
//!
//! This module delivers new and updated vacancies to subscribed chats:
//! - `Notifier` is the sink interface
//! - `TelegramNotifier` posts to the Telegram Bot API
//! - `Dispatcher` fans out to subscribers and keeps the sent-log

mod dispatcher;
mod format;
mod telegram;
mod traits;

pub use dispatcher::{DeliverySummary, Dispatcher};
pub use format::{format_header, format_trailer, format_vacancy};
pub use telegram::TelegramNotifier;
pub use traits::{Notifier, NotifyError};
