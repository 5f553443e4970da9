//! Record tables backing the credential store and the session registry.
//!
//! - `RecordStore`: lookup / append / rewrite-excluding interface
//! - `MemoryRecordStore`: in-memory table
//! - `FileRecordStore`: durable JSON Lines table

mod file_store;
mod memory_store;
mod record_store;

pub use file_store::FileRecordStore;
pub use memory_store::MemoryRecordStore;
pub use record_store::{RecordStore, StoreError, StoreResult, UserRecord};
