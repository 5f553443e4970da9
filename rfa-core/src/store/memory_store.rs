//! In-memory record table.

use super::record_store::{RecordStore, StoreResult, UserRecord};

/// Record table held in memory. Nothing survives a restart.
#[derive(Debug, Default, Clone)]
pub struct MemoryRecordStore {
    records: Vec<UserRecord>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with initial records.
    pub fn with_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = UserRecord>,
    {
        Self {
            records: records.into_iter().collect(),
        }
    }
}

impl RecordStore for MemoryRecordStore {
    fn records(&self) -> StoreResult<Vec<UserRecord>> {
        Ok(self.records.clone())
    }

    fn append(&mut self, record: UserRecord) -> StoreResult<()> {
        self.records.push(record);
        Ok(())
    }

    fn rewrite_excluding(&mut self, username: &str) -> StoreResult<()> {
        self.records.retain(|r| r.username != username);
        Ok(())
    }
}
