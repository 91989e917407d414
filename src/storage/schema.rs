//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Vacancy Watch database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per vacancy id ever seen
CREATE TABLE IF NOT EXISTS vacancies (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    company TEXT NOT NULL,
    link TEXT NOT NULL,
    skills TEXT NOT NULL DEFAULT '[]',
    salary TEXT NOT NULL,
    experience TEXT NOT NULL,
    location TEXT NOT NULL,
    publication_date TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_vacancies_created_at ON vacancies(created_at);

-- Chats that receive new-vacancy notifications
CREATE TABLE IF NOT EXISTS subscriptions (
    chat_id INTEGER PRIMARY KEY,
    created_at TEXT NOT NULL
);

-- Which vacancy has already been delivered to which chat
CREATE TABLE IF NOT EXISTS sent_notifications (
    chat_id INTEGER NOT NULL,
    vacancy_id TEXT NOT NULL,
    sent_at TEXT NOT NULL,
    PRIMARY KEY (chat_id, vacancy_id)
);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
