//! SQLite persistence for users, conversations, messages and analytics events.
//!
//! A single connection sits behind a `parking_lot::Mutex`. Every query takes
//! the lock for its own duration only, so callers must never hold a guard
//! across an `.await`.

mod analytics;
mod conversations;
mod models;
mod users;

pub use analytics::{AnalyticsSummary, TimelinePoint};
pub use conversations::ConversationFilter;
pub use models::{
    Channel, Conversation, ConversationDetail, ConversationStatus, ConversationSummary, Message,
    NewMessage, User,
};
pub use users::Credentials;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::path::Path;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    salt TEXT NOT NULL,
    is_admin INTEGER NOT NULL DEFAULT 0,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS conversations (
    id TEXT PRIMARY KEY,
    user_id TEXT REFERENCES users(id) ON DELETE SET NULL,
    channel TEXT NOT NULL DEFAULT 'web',
    language TEXT NOT NULL DEFAULT 'en',
    status TEXT NOT NULL DEFAULT 'active',
    sentiment_avg REAL NOT NULL DEFAULT 0.0,
    started_at INTEGER NOT NULL,
    ended_at INTEGER
);
CREATE INDEX IF NOT EXISTS idx_conversations_started ON conversations(started_at);
CREATE INDEX IF NOT EXISTS idx_conversations_status ON conversations(status);

CREATE TABLE IF NOT EXISTS messages (
    id TEXT PRIMARY KEY,
    conversation_id TEXT NOT NULL REFERENCES conversations(id) ON DELETE CASCADE,
    role TEXT NOT NULL,
    content TEXT NOT NULL,
    sentiment_score REAL,
    emotion TEXT,
    is_urgent INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_messages_conversation ON messages(conversation_id);

CREATE TABLE IF NOT EXISTS analytics_events (
    id TEXT PRIMARY KEY,
    event_type TEXT NOT NULL,
    event_data TEXT,
    conversation_id TEXT,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_events_type ON analytics_events(event_type);
";

pub struct Database {
    conn: Mutex<rusqlite::Connection>,
}

impl Database {
    /// Open (or create) the database file and apply the schema.
    ///
    /// A path of `:memory:` opens a throwaway in-memory database.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        if path.as_os_str() == ":memory:" {
            return Self::in_memory();
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = rusqlite::Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        Self::init(conn)
    }

    pub fn in_memory() -> Result<Self, DbError> {
        Self::init(rusqlite::Connection::open_in_memory()?)
    }

    fn init(conn: rusqlite::Connection) -> Result<Self, DbError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("failed to create database directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("username or email already exists")]
    Duplicate,
    #[error("{0} not found")]
    NotFound(&'static str),
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub(crate) fn epoch_secs(at: DateTime<Utc>) -> i64 {
    at.timestamp()
}

pub(crate) fn from_epoch(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _) if err.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_applies_twice() {
        let db = Database::in_memory().unwrap();
        db.conn.lock().execute_batch(SCHEMA).unwrap();
    }

    #[test]
    fn epoch_conversion_round_trips_seconds() {
        let now = Utc::now();
        assert_eq!(from_epoch(epoch_secs(now)).timestamp(), now.timestamp());
    }

    #[test]
    fn opens_file_database() {
        let dir = std::env::temp_dir().join(format!("voicebot-db-{}", new_id()));
        let path = dir.join("nested").join("voicebot.db");
        let db = Database::open(&path).unwrap();
        assert_eq!(db.count_users().unwrap(), 0);
        drop(db);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn memory_path_skips_filesystem() {
        let db = Database::open(Path::new(":memory:")).unwrap();
        assert_eq!(db.count_users().unwrap(), 0);
        assert!(!Path::new(":memory:").exists());
    }
}
