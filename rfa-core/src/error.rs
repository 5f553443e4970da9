//! Error types for the session engine.
//!
//! Every variant renders as the text sent back to the client, so the
//! `#[error]` strings double as the protocol's rejection messages.

use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur while executing a command.
#[derive(Error, Debug)]
pub enum RfaError {
    #[error("Login to continue")]
    LoginRequired,

    #[error("Username {0} not available")]
    DuplicateUser(String),

    #[error("Password length should be at least {min} characters")]
    WeakPassword { min: usize },

    #[error("You haven't registered! command: register <username> <password>")]
    UnknownUser(String),

    #[error("Sorry, the password you entered is wrong. Please try again")]
    WrongPassword,

    #[error("Already logged in")]
    AlreadyLoggedIn,

    #[error("The folder {0} already exists")]
    AlreadyExists(String),

    #[error("No such folder {0} exists")]
    NoSuchFolder(String),

    #[error("Cannot move back from {0} root folder")]
    CannotLeaveRoot(String),

    #[error("Cannot write to {0}: it is a folder")]
    IsAFolder(String),

    #[error("No such file {0} exists")]
    FileNotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Enter correct command: {0}")]
    MalformedCommand(&'static str),

    #[error("Session registry unavailable")]
    RegistryUnavailable(#[source] StoreError),

    #[error("Invalid name: {0:?}")]
    InvalidName(String),

    #[error("Path escapes sandbox: {0}")]
    PathEscapesRoot(String),

    #[error("Lock poisoned")]
    LockPoisoned,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for session operations.
pub type RfaResult<T> = Result<T, RfaError>;
