//! RecordStore trait - flat `{username, password}` tables.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One row of a user table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub password: String,
}

impl UserRecord {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Errors raised by a record table.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt record at {path}:{line}: {source}")]
    Corrupt {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for record table operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// A table of user records.
///
/// Tables are append-only apart from `rewrite_excluding`, which drops every
/// row for one username and keeps the rest verbatim and in order.
pub trait RecordStore: Send + Sync {
    /// All records in insertion order.
    fn records(&self) -> StoreResult<Vec<UserRecord>>;

    /// Append one record.
    fn append(&mut self, record: UserRecord) -> StoreResult<()>;

    /// Rewrite the table without any record for `username`.
    fn rewrite_excluding(&mut self, username: &str) -> StoreResult<()>;

    /// First record for `username`, if any.
    fn lookup(&self, username: &str) -> StoreResult<Option<UserRecord>> {
        Ok(self
            .records()?
            .into_iter()
            .find(|r| r.username == username))
    }

    /// Check if any record exists for `username`.
    fn contains(&self, username: &str) -> StoreResult<bool> {
        Ok(self.lookup(username)?.is_some())
    }
}
