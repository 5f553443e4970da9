//! Active-session registry - which users currently hold a login.
//!
//! Entries are advisory. A server that dies without a logout leaves stale
//! rows behind, and nothing here corrects them.

use crate::error::{RfaError, RfaResult};
use crate::store::{RecordStore, UserRecord};

/// Durable set of logged-in usernames.
pub struct SessionRegistry {
    table: Box<dyn RecordStore>,
}

impl SessionRegistry {
    pub fn new(table: Box<dyn RecordStore>) -> Self {
        Self { table }
    }

    /// Record that `username` holds a login. No-op if already recorded.
    pub fn mark_logged_in(&mut self, username: &str, password: &str) -> RfaResult<()> {
        if self
            .table
            .contains(username)
            .map_err(RfaError::RegistryUnavailable)?
        {
            return Ok(());
        }
        self.table
            .append(UserRecord::new(username, password))
            .map_err(RfaError::RegistryUnavailable)
    }

    /// Check if `username` holds a login. An unreadable table reads as false.
    pub fn is_logged_in(&self, username: &str) -> bool {
        self.table.contains(username).unwrap_or(false)
    }

    /// Drop every entry for `username`, keeping all other rows.
    pub fn clear(&mut self, username: &str) -> RfaResult<()> {
        self.table
            .rewrite_excluding(username)
            .map_err(RfaError::RegistryUnavailable)
    }

    /// Usernames currently recorded, in login order.
    pub fn active_users(&self) -> RfaResult<Vec<String>> {
        Ok(self
            .table
            .records()?
            .into_iter()
            .map(|r| r.username)
            .collect())
    }
}
