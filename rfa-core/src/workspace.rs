//! Workspace - state shared by every connection of one server.
//!
//! A Workspace bundles:
//! - The credential store (registered users)
//! - The active-session registry (logged-in users)
//! - The sandbox directory tree
//!
//! Each connection clones the handle into its own `Session`. The lock only
//! keeps the tables memory-safe; multi-step operations are not atomic.

use std::sync::{Arc, RwLock};

use crate::config::ServerConfig;
use crate::credentials::CredentialStore;
use crate::error::{RfaError, RfaResult};
use crate::registry::SessionRegistry;
use crate::sandbox::Sandbox;
use crate::store::{FileRecordStore, MemoryRecordStore, RecordStore};

/// Mutable tables (interior of Arc<RwLock<...>>).
struct WorkspaceInner {
    credentials: CredentialStore,
    registry: SessionRegistry,
}

/// Shared server state.
///
/// Workspaces are thread-safe and can be shared across connections.
/// Clone is cheap (just clones the Arcs).
#[derive(Clone)]
pub struct Workspace {
    inner: Arc<RwLock<WorkspaceInner>>,
    sandbox: Arc<Sandbox>,
    page_size: usize,
}

impl Workspace {
    /// Assemble a workspace from explicit tables.
    pub fn new(
        sandbox: Sandbox,
        users: Box<dyn RecordStore>,
        active: Box<dyn RecordStore>,
        page_size: usize,
    ) -> Self {
        Self {
            inner: Arc::new(RwLock::new(WorkspaceInner {
                credentials: CredentialStore::new(users),
                registry: SessionRegistry::new(active),
            })),
            sandbox: Arc::new(sandbox),
            page_size: page_size.max(1),
        }
    }

    /// Open the durable workspace described by `config`.
    pub fn open(config: &ServerConfig) -> RfaResult<Self> {
        let sandbox = Sandbox::new(&config.sandbox_root)?;
        Ok(Self::new(
            sandbox,
            Box::new(FileRecordStore::new(config.registered_users_path())),
            Box::new(FileRecordStore::new(config.logged_in_users_path())),
            config.page_size,
        ))
    }

    /// Workspace with in-memory tables over a real sandbox directory.
    pub fn ephemeral(sandbox: Sandbox, page_size: usize) -> Self {
        Self::new(
            sandbox,
            Box::new(MemoryRecordStore::new()),
            Box::new(MemoryRecordStore::new()),
            page_size,
        )
    }

    pub fn sandbox(&self) -> &Sandbox {
        &self.sandbox
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Register a user and provision their folder.
    pub fn register(&self, username: &str, password: &str) -> RfaResult<()> {
        let mut inner = self.inner.write().map_err(|_| RfaError::LockPoisoned)?;
        inner.credentials.register(&self.sandbox, username, password)
    }

    /// Check credentials.
    pub fn verify(&self, username: &str, password: &str) -> RfaResult<()> {
        let inner = self.inner.read().map_err(|_| RfaError::LockPoisoned)?;
        inner.credentials.verify(username, password)
    }

    /// Check if `username` holds a login somewhere.
    pub fn is_logged_in(&self, username: &str) -> bool {
        match self.inner.read() {
            Ok(inner) => inner.registry.is_logged_in(username),
            Err(_) => false,
        }
    }

    /// Record a login for `username`.
    pub fn mark_logged_in(&self, username: &str, password: &str) -> RfaResult<()> {
        let mut inner = self.inner.write().map_err(|_| RfaError::LockPoisoned)?;
        inner.registry.mark_logged_in(username, password)
    }

    /// Drop the login record for `username`.
    pub fn clear_login(&self, username: &str) -> RfaResult<()> {
        let mut inner = self.inner.write().map_err(|_| RfaError::LockPoisoned)?;
        inner.registry.clear(username)
    }

    /// Usernames currently holding a login.
    pub fn active_users(&self) -> RfaResult<Vec<String>> {
        let inner = self.inner.read().map_err(|_| RfaError::LockPoisoned)?;
        inner.registry.active_users()
    }
}
