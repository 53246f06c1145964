//! SQLite-backed record of scheduled bots.
//!
//! One row per bot, keyed by event so a meeting is never double-booked.
//! This is an audit/idempotency record, not the application's source of
//! truth for meetings.

use chrono::{DateTime, Utc};
use meetingpost_core::error::{RusqliteErrorExt, StorageError};
use rusqlite::{params, Connection};
use std::path::Path;

use meetingpost_calendar::Platform;

use crate::plan::{JoinMode, JoinPlan};

/// A scheduled bot and the plan that produced it.
#[derive(Debug, Clone)]
pub struct BotRecord {
    pub bot_id: String,
    pub event_id: String,
    pub user_id: String,
    pub platform: Platform,
    pub join_url: String,
    pub title: Option<String>,
    pub attendees: Vec<String>,
    pub start_at: DateTime<Utc>,
    pub desired_at: DateTime<Utc>,
    pub actual_join_at: DateTime<Utc>,
    pub mode: JoinMode,
    pub lead_minutes: f64,
    pub is_late: bool,
    pub transcript_ready: bool,
    pub processed: bool,
    pub created_at: DateTime<Utc>,
}

impl BotRecord {
    /// Reconstruct the join plan this record was created from.
    pub fn plan(&self) -> JoinPlan {
        JoinPlan {
            start_at: self.start_at,
            desired_at: self.desired_at,
            actual_join_at: self.actual_join_at,
            is_late: self.is_late,
            mode: self.mode,
        }
    }
}

pub struct BotStore {
    conn: Connection,
}

impl BotStore {
    /// Open (or create) the store at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let conn = Connection::open(path)
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    #[cfg(test)]
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Initialize the database schema.
    fn init_schema(&self) -> Result<(), StorageError> {
        self.conn
            .execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS bots (
                    bot_id TEXT PRIMARY KEY,
                    event_id TEXT NOT NULL UNIQUE,
                    user_id TEXT NOT NULL,
                    platform TEXT NOT NULL,
                    join_url TEXT NOT NULL,
                    title TEXT,
                    attendees_json TEXT NOT NULL,
                    start_ms INTEGER NOT NULL,
                    desired_ms INTEGER NOT NULL,
                    actual_join_ms INTEGER NOT NULL,
                    mode TEXT NOT NULL,
                    lead_minutes REAL NOT NULL,
                    is_late INTEGER NOT NULL,
                    transcript_ready INTEGER NOT NULL,
                    processed INTEGER NOT NULL,
                    created_ms INTEGER NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_bots_event ON bots(event_id);
                CREATE INDEX IF NOT EXISTS idx_bots_processed ON bots(processed);
                "#,
            )
            .map_err(|e| e.into_storage_error())?;
        Ok(())
    }

    /// Store a scheduled bot.
    pub fn record_bot(&self, record: &BotRecord) -> Result<(), StorageError> {
        let attendees_json =
            serde_json::to_string(&record.attendees).unwrap_or_else(|_| "[]".to_string());

        self.conn
            .execute(
                r#"
                INSERT OR REPLACE INTO bots
                (bot_id, event_id, user_id, platform, join_url, title, attendees_json,
                 start_ms, desired_ms, actual_join_ms, mode, lead_minutes, is_late,
                 transcript_ready, processed, created_ms)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
                "#,
                params![
                    record.bot_id,
                    record.event_id,
                    record.user_id,
                    record.platform.as_str(),
                    record.join_url,
                    record.title,
                    attendees_json,
                    record.start_at.timestamp_millis(),
                    record.desired_at.timestamp_millis(),
                    record.actual_join_at.timestamp_millis(),
                    record.mode.as_str(),
                    record.lead_minutes,
                    record.is_late as i32,
                    record.transcript_ready as i32,
                    record.processed as i32,
                    record.created_at.timestamp_millis(),
                ],
            )
            .map_err(|e| e.into_storage_error())?;
        Ok(())
    }

    /// Look up the bot already scheduled for an event, if any.
    pub fn find_by_event(&self, event_id: &str) -> Result<Option<BotRecord>, StorageError> {
        self.query_one("SELECT * FROM bots WHERE event_id = ?1", event_id)
    }

    /// Look up a bot by its id.
    pub fn find_by_bot(&self, bot_id: &str) -> Result<Option<BotRecord>, StorageError> {
        self.query_one("SELECT * FROM bots WHERE bot_id = ?1", bot_id)
    }

    /// Bots whose transcript has not been processed yet.
    pub fn list_pending(&self) -> Result<Vec<BotRecord>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM bots WHERE processed = 0 ORDER BY actual_join_ms")
            .map_err(|e| e.into_storage_error())?;

        let rows = stmt
            .query_map([], row_to_record)
            .map_err(|e| e.into_storage_error())?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(|e| e.into_storage_error())?);
        }
        Ok(records)
    }

    /// Flag a bot's transcript as available for download.
    pub fn mark_transcript_ready(&self, bot_id: &str) -> Result<(), StorageError> {
        self.conn
            .execute(
                "UPDATE bots SET transcript_ready = 1 WHERE bot_id = ?1",
                params![bot_id],
            )
            .map_err(|e| e.into_storage_error())?;
        Ok(())
    }

    /// Flag a bot as fully processed downstream.
    pub fn mark_processed(&self, bot_id: &str) -> Result<(), StorageError> {
        self.conn
            .execute(
                "UPDATE bots SET processed = 1 WHERE bot_id = ?1",
                params![bot_id],
            )
            .map_err(|e| e.into_storage_error())?;
        Ok(())
    }

    fn query_one(&self, sql: &str, key: &str) -> Result<Option<BotRecord>, StorageError> {
        let mut stmt = self.conn.prepare(sql).map_err(|e| e.into_storage_error())?;
        let mut rows = stmt
            .query_map(params![key], row_to_record)
            .map_err(|e| e.into_storage_error())?;

        match rows.next() {
            Some(row) => Ok(Some(row.map_err(|e| e.into_storage_error())?)),
            None => Ok(None),
        }
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<BotRecord> {
    let platform_str: String = row.get("platform")?;
    let platform = match platform_str.as_str() {
        "zoom" => Platform::Zoom,
        "meet" => Platform::Meet,
        "teams" => Platform::Teams,
        _ => Platform::Unknown,
    };

    let mode_str: String = row.get("mode")?;
    let mode = match mode_str.as_str() {
        "lead" => JoinMode::Lead,
        "just_before" => JoinMode::JustBefore,
        _ => JoinMode::Asap,
    };

    let attendees_json: String = row.get("attendees_json")?;
    let attendees: Vec<String> = serde_json::from_str(&attendees_json).unwrap_or_default();

    Ok(BotRecord {
        bot_id: row.get("bot_id")?,
        event_id: row.get("event_id")?,
        user_id: row.get("user_id")?,
        platform,
        join_url: row.get("join_url")?,
        title: row.get("title")?,
        attendees,
        start_at: ms_to_datetime(row.get("start_ms")?),
        desired_at: ms_to_datetime(row.get("desired_ms")?),
        actual_join_at: ms_to_datetime(row.get("actual_join_ms")?),
        mode,
        lead_minutes: row.get("lead_minutes")?,
        is_late: row.get::<_, i32>("is_late")? != 0,
        transcript_ready: row.get::<_, i32>("transcript_ready")? != 0,
        processed: row.get::<_, i32>("processed")? != 0,
        created_at: ms_to_datetime(row.get("created_ms")?),
    })
}

fn ms_to_datetime(ms: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(ms).unwrap_or(DateTime::<Utc>::MIN_UTC)
}
