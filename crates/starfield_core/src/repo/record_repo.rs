//! Keyed JSON-list persistence over SQLite.
//!
//! # Responsibility
//! - Store entries, stars and categories as three independently keyed
//!   JSON lists.
//! - Keep SQL and JSON details inside the persistence boundary.
//!
//! # Invariants
//! - Every save rewrites the full list for its key; there are no deltas.
//! - An absent key loads as `None`, distinct from a stored empty list.
//! - Read paths reject malformed payloads instead of masking them.

use crate::db::DbError;
use log::{debug, error};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error for record lists.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Encode(serde_json::Error),
    InvalidData { key: RecordKey, message: String },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode record list: {err}"),
            Self::InvalidData { key, message } => {
                write!(f, "invalid persisted `{}` data: {message}", key.as_str())
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::InvalidData { .. } => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// The three persisted record lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKey {
    Entries,
    Stars,
    Categories,
}

impl RecordKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Entries => "entries",
            Self::Stars => "stars",
            Self::Categories => "categories",
        }
    }
}

/// Storage contract for keyed record lists.
pub trait RecordRepository {
    /// Loads the list stored under `key`, or `None` when never saved.
    fn load_list<T: DeserializeOwned>(&self, key: RecordKey) -> RepoResult<Option<Vec<T>>>;
    /// Replaces the full list stored under `key`.
    fn save_list<T: Serialize>(&self, key: RecordKey, items: &[T]) -> RepoResult<()>;
}

/// SQLite-backed record repository.
pub struct SqliteRecordRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl RecordRepository for SqliteRecordRepository<'_> {
    fn load_list<T: DeserializeOwned>(&self, key: RecordKey) -> RepoResult<Option<Vec<T>>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM records WHERE key = ?1;",
                [key.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        let Some(payload) = payload else {
            debug!(
                "event=records_load module=repo status=absent key={}",
                key.as_str()
            );
            return Ok(None);
        };

        let items: Vec<T> = serde_json::from_str(&payload).map_err(|err| {
            error!(
                "event=records_load module=repo status=error key={} error_code=invalid_payload",
                key.as_str()
            );
            RepoError::InvalidData {
                key,
                message: err.to_string(),
            }
        })?;
        debug!(
            "event=records_load module=repo status=ok key={} count={}",
            key.as_str(),
            items.len()
        );
        Ok(Some(items))
    }

    fn save_list<T: Serialize>(&self, key: RecordKey, items: &[T]) -> RepoResult<()> {
        let payload = serde_json::to_string(items).map_err(RepoError::Encode)?;
        self.conn.execute(
            "INSERT INTO records (key, payload, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at;",
            params![key.as_str(), payload],
        )?;
        debug!(
            "event=records_save module=repo status=ok key={} count={}",
            key.as_str(),
            items.len()
        );
        Ok(())
    }
}
