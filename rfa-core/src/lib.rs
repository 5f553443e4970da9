//! rfa - remote file-access session engine
//!
//! This crate provides the core of a line-oriented file server:
//! - Record tables for registered and logged-in users
//! - A per-user sandbox over a real directory tree
//! - The per-connection `Session` state machine
//! - The command grammar and dispatcher
//!
//! # Architecture
//!
//! - `RecordStore` trait: lookup / append / rewrite-excluding tables
//! - `Sandbox`: path resolution fenced to each user's folder
//! - `Workspace`: shared handle bundling the tables and the sandbox
//! - `Session`: one per connection, owns login state and read cursors
//!
//! The transport layer feeds each input line to [`Session::handle_line`] and
//! writes the reply back verbatim.

pub mod command;
pub mod config;
pub mod credentials;
pub mod error;
pub mod registry;
pub mod sandbox;
pub mod session;
pub mod store;
pub mod workspace;

pub use command::Command;
pub use config::ServerConfig;
pub use credentials::{CredentialStore, MIN_PASSWORD_LEN};
pub use error::{RfaError, RfaResult};
pub use registry::SessionRegistry;
pub use sandbox::{EntryInfo, Sandbox, VirtualPath, WriteOutcome};
pub use session::{LoginOutcome, LogoutOutcome, Page, Session, SessionState};
pub use store::{FileRecordStore, MemoryRecordStore, RecordStore, StoreError, UserRecord};
pub use workspace::Workspace;

/// Sentinel line that closes a connection.
pub const EXIT_SENTINEL: &str = "exit";
