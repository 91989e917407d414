//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the VacancyStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{StorageResult, VacancyStore};
use crate::vacancy::VacancyRecord;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const VACANCY_COLUMNS: &str = "id, title, company, link, skills, salary, experience, location, \
                               publication_date, created_at";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(WatchError)` - Failed to open database
    pub fn new(path: &Path) -> crate::Result<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> crate::Result<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

/// Timestamps are stored with a fixed width so that text order is time order
fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_vacancy(row: &Row<'_>) -> rusqlite::Result<VacancyRecord> {
    let skills: String = row.get(4)?;
    let created_at: String = row.get(9)?;

    Ok(VacancyRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        company: row.get(2)?,
        link: row.get(3)?,
        skills: serde_json::from_str(&skills)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?,
        salary: row.get(5)?,
        experience: row.get(6)?,
        location: row.get(7)?,
        publication_date: row.get(8)?,
        created_at: parse_timestamp(9, &created_at)?,
    })
}

fn skills_json(record: &VacancyRecord) -> StorageResult<String> {
    serde_json::to_string(&record.skills)
        .map_err(|e| crate::storage::StorageError::Serialization(e.to_string()))
}

/// Escapes LIKE wildcards so the keyword matches literally
fn like_pattern(keyword: &str) -> String {
    let escaped = keyword
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn insert_vacancy(conn: &Connection, record: &VacancyRecord) -> StorageResult<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO vacancies
         (id, title, company, link, skills, salary, experience, location, publication_date, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            record.id,
            record.title,
            record.company,
            record.link,
            skills_json(record)?,
            record.salary,
            record.experience,
            record.location,
            record.publication_date,
            format_timestamp(&record.created_at),
        ],
    )?;
    Ok(inserted > 0)
}

impl VacancyStore for SqliteStorage {
    // ===== Vacancies =====

    fn get_vacancy(&self, id: &str) -> StorageResult<Option<VacancyRecord>> {
        let query = format!("SELECT {} FROM vacancies WHERE id = ?1", VACANCY_COLUMNS);
        let record = self
            .conn
            .query_row(&query, params![id], row_to_vacancy)
            .optional()?;
        Ok(record)
    }

    fn insert_if_absent(&mut self, record: &VacancyRecord) -> StorageResult<bool> {
        insert_vacancy(&self.conn, record)
    }

    fn bulk_insert_if_absent(&mut self, records: &[VacancyRecord]) -> StorageResult<usize> {
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        for record in records {
            if insert_vacancy(&tx, record)? {
                inserted += 1;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    fn update_vacancy(&mut self, record: &VacancyRecord) -> StorageResult<bool> {
        let updated = self.conn.execute(
            "UPDATE vacancies SET title = ?2, company = ?3, link = ?4, skills = ?5, salary = ?6,
             experience = ?7, location = ?8, publication_date = ?9
             WHERE id = ?1",
            params![
                record.id,
                record.title,
                record.company,
                record.link,
                skills_json(record)?,
                record.salary,
                record.experience,
                record.location,
                record.publication_date,
            ],
        )?;
        Ok(updated > 0)
    }

    fn query_latest(&self, limit: usize) -> StorageResult<Vec<VacancyRecord>> {
        let query = format!(
            "SELECT {} FROM vacancies ORDER BY created_at DESC, rowid DESC LIMIT ?1",
            VACANCY_COLUMNS
        );
        let mut stmt = self.conn.prepare(&query)?;
        let rows = stmt.query_map(params![limit as i64], row_to_vacancy)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn query_by_keyword(&self, keyword: &str, limit: usize) -> StorageResult<Vec<VacancyRecord>> {
        let query = format!(
            "SELECT {} FROM vacancies
             WHERE title LIKE ?1 ESCAPE '\\' OR skills LIKE ?1 ESCAPE '\\'
             ORDER BY created_at DESC, rowid DESC LIMIT ?2",
            VACANCY_COLUMNS
        );
        let mut stmt = self.conn.prepare(&query)?;
        let rows = stmt.query_map(
            params![like_pattern(keyword.trim()), limit as i64],
            row_to_vacancy,
        )?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn count_vacancies(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM vacancies", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn latest_created_at(&self) -> StorageResult<Option<DateTime<Utc>>> {
        let latest: Option<String> = self
            .conn
            .query_row("SELECT MAX(created_at) FROM vacancies", [], |row| row.get(0))?;

        latest
            .map(|value| parse_timestamp(0, &value))
            .transpose()
            .map_err(Into::into)
    }

    // ===== Subscriptions =====

    fn add_subscription(&mut self, chat_id: i64) -> StorageResult<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO subscriptions (chat_id, created_at) VALUES (?1, ?2)",
            params![chat_id, format_timestamp(&Utc::now())],
        )?;
        Ok(inserted > 0)
    }

    fn remove_subscription(&mut self, chat_id: i64) -> StorageResult<bool> {
        let removed = self.conn.execute(
            "DELETE FROM subscriptions WHERE chat_id = ?1",
            params![chat_id],
        )?;
        Ok(removed > 0)
    }

    fn list_subscribers(&self) -> StorageResult<Vec<i64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT chat_id FROM subscriptions ORDER BY created_at, rowid")?;
        let rows = stmt.query_map([], |row| row.get::<_, i64>(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    // ===== Sent-log =====

    fn was_sent(&self, chat_id: i64, vacancy_id: &str) -> StorageResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM sent_notifications WHERE chat_id = ?1 AND vacancy_id = ?2",
                params![chat_id, vacancy_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn record_sent(&mut self, chat_id: i64, vacancy_id: &str) -> StorageResult<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO sent_notifications (chat_id, vacancy_id, sent_at)
             VALUES (?1, ?2, ?3)",
            params![chat_id, vacancy_id, format_timestamp(&Utc::now())],
        )?;
        Ok(inserted > 0)
    }

    fn count_sent(&self) -> StorageResult<u64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM sent_notifications", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
