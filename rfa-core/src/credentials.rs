//! Credential store - registered users and their passwords.

use tracing::info;

use crate::error::{RfaError, RfaResult};
use crate::sandbox::{validate_name, Sandbox};
use crate::store::{RecordStore, UserRecord};

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Append-only table of registered users.
pub struct CredentialStore {
    table: Box<dyn RecordStore>,
}

impl CredentialStore {
    pub fn new(table: Box<dyn RecordStore>) -> Self {
        Self { table }
    }

    /// Register a new user and provision their sandbox folder.
    ///
    /// A taken username is reported before a weak password.
    pub fn register(&mut self, sandbox: &Sandbox, username: &str, password: &str) -> RfaResult<()> {
        validate_name(username)?;
        if self.table.contains(username)? {
            return Err(RfaError::DuplicateUser(username.to_string()));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(RfaError::WeakPassword {
                min: MIN_PASSWORD_LEN,
            });
        }

        sandbox.provision_user(username)?;
        self.table.append(UserRecord::new(username, password))?;
        info!(username, "registered user");
        Ok(())
    }

    /// Check a username/password pair.
    pub fn verify(&self, username: &str, password: &str) -> RfaResult<()> {
        match self.table.lookup(username)? {
            None => Err(RfaError::UnknownUser(username.to_string())),
            Some(record) if record.password != password => Err(RfaError::WrongPassword),
            Some(_) => Ok(()),
        }
    }

}
