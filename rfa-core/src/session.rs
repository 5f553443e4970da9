//! Per-connection session state machine.
//!
//! A session starts `Anonymous` at the sandbox root. A successful `login`
//! moves it to `Authenticated` with the cursor at the user's home folder;
//! `quit` moves it back. Everything except `commands`, `register` and
//! `login` needs an authenticated session.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::command::{self, Command};
use crate::error::{RfaError, RfaResult};
use crate::sandbox::{validate_name, EntryInfo, VirtualPath, WriteOutcome};
use crate::workspace::Workspace;

/// Login state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

/// How a successful login went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// No other login was recorded for the user.
    Fresh,
    /// The registry already held a login for the user (stale or live).
    ActiveElsewhere,
    /// The registry could not be read or written; the login was not recorded.
    Unrecorded,
}

/// How a logout went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoutOutcome {
    Clean,
    /// The registry could not be rewritten; the session was reset anyway.
    Forced(String),
}

/// One page returned by `read_file`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Byte offset of the first byte returned.
    pub start: usize,
    /// Byte offset one past the last byte returned.
    pub end: usize,
    pub text: String,
}

/// State of one client connection.
pub struct Session {
    workspace: Workspace,
    identity: Option<String>,
    state: SessionState,
    current_path: VirtualPath,
    /// Next page index per canonical file path.
    read_cursors: HashMap<PathBuf, usize>,
}

impl Session {
    /// Create an anonymous session at the sandbox root.
    pub fn new(workspace: Workspace) -> Self {
        Self {
            workspace,
            identity: None,
            state: SessionState::Anonymous,
            current_path: VirtualPath::root(),
            read_cursors: HashMap::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_logged_in(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn current_path(&self) -> &VirtualPath {
        &self.current_path
    }

    fn require_login(&self) -> RfaResult<&str> {
        match (&self.state, &self.identity) {
            (SessionState::Authenticated, Some(user)) => Ok(user),
            _ => Err(RfaError::LoginRequired),
        }
    }

    /// Static catalogue of supported commands.
    pub fn commands(&self) -> String {
        command::catalogue()
    }

    /// Register a new account. Does not log in.
    pub fn register(&mut self, username: &str, password: &str) -> RfaResult<()> {
        self.workspace.register(username, password)?;
        if !self.is_logged_in() {
            self.identity = Some(username.to_string());
        }
        Ok(())
    }

    /// Log in. Read cursors start fresh.
    pub fn login(&mut self, username: &str, password: &str) -> RfaResult<LoginOutcome> {
        if self.is_logged_in() {
            return Err(RfaError::AlreadyLoggedIn);
        }
        self.workspace.verify(username, password)?;

        let outcome = if self.workspace.is_logged_in(username) {
            LoginOutcome::ActiveElsewhere
        } else {
            match self.workspace.mark_logged_in(username, password) {
                Ok(()) => LoginOutcome::Fresh,
                Err(e @ RfaError::RegistryUnavailable(_)) => {
                    warn!(username, error = ?e, "login not recorded");
                    LoginOutcome::Unrecorded
                }
                Err(e) => return Err(e),
            }
        };

        self.identity = Some(username.to_string());
        self.state = SessionState::Authenticated;
        self.current_path = VirtualPath::user_root(username);
        self.read_cursors.clear();
        info!(username, ?outcome, "login");
        Ok(outcome)
    }

    /// Log out. Always resets the session, even if the registry is unusable.
    pub fn quit(&mut self) -> RfaResult<LogoutOutcome> {
        let user = self.require_login()?.to_string();

        let outcome = match self.workspace.clear_login(&user) {
            Ok(()) => LogoutOutcome::Clean,
            Err(e) => {
                warn!(username = %user, error = ?e, "forced logout");
                LogoutOutcome::Forced(e.to_string())
            }
        };

        self.identity = None;
        self.state = SessionState::Anonymous;
        self.current_path = VirtualPath::root();
        self.read_cursors.clear();
        info!(username = %user, "logout");
        Ok(outcome)
    }

    /// Release the login when the connection goes away without `quit`.
    pub fn disconnect(&mut self) {
        if self.is_logged_in() {
            let _ = self.quit();
        }
    }

    /// Create a folder in the current directory.
    pub fn create_folder(&mut self, name: &str) -> RfaResult<()> {
        self.require_login()?;
        self.workspace.sandbox().create_dir(&self.current_path, name)
    }

    /// Move into a child folder, or up with `..`. Never above the user's home.
    pub fn change_folder(&mut self, name: &str) -> RfaResult<&VirtualPath> {
        let user = self.require_login()?.to_string();

        if name == ".." {
            if self.current_path.depth() <= 1 {
                return Err(RfaError::CannotLeaveRoot(user));
            }
            self.current_path.pop();
            return Ok(&self.current_path);
        }

        validate_name(name).map_err(|_| RfaError::NoSuchFolder(name.to_string()))?;
        let target = self.current_path.join(name);
        if !self.workspace.sandbox().is_dir(&target)? {
            return Err(RfaError::NoSuchFolder(name.to_string()));
        }
        self.current_path = target;
        Ok(&self.current_path)
    }

    /// Append to a file in the current directory, creating it if needed.
    pub fn write_file(&mut self, name: &str, content: &str) -> RfaResult<WriteOutcome> {
        self.require_login()?;
        self.workspace
            .sandbox()
            .append_or_create(&self.current_path, name, content)
    }

    /// Return the next page of a file and advance its cursor.
    ///
    /// The file is re-read on every call, so pages reflect its current
    /// content. The cursor wraps after the last page.
    pub fn read_file(&mut self, name: &str) -> RfaResult<Page> {
        self.require_login()?;
        let (path, data) = self
            .workspace
            .sandbox()
            .read_file(&self.current_path, name)?;

        let size = self.workspace.page_size();
        let pages = data.len().div_ceil(size).max(1);
        let cursor = self.read_cursors.entry(path).or_insert(0);

        let index = *cursor % pages;
        let start = index * size;
        let end = (start + size).min(data.len());
        *cursor = (index + 1) % pages;

        Ok(Page {
            start,
            end,
            text: String::from_utf8_lossy(&data[start..end]).into_owned(),
        })
    }

    /// Entries of the current directory.
    pub fn list(&self) -> RfaResult<Vec<EntryInfo>> {
        self.require_login()?;
        self.workspace.sandbox().list(&self.current_path)
    }

    /// Parse and run one input line.
    ///
    /// Returns `None` for command names outside the grammar.
    pub fn handle_line(&mut self, line: &str) -> Option<String> {
        match Command::parse(line) {
            Ok(cmd) => self.execute(cmd),
            Err(e) => Some(e.to_string()),
        }
    }

    /// Run a parsed command and render its reply.
    pub fn execute(&mut self, cmd: Command) -> Option<String> {
        debug!(command = cmd.name(), path = %self.current_path, "execute");
        if !cmd.is_anonymous() && !self.is_logged_in() {
            return Some(RfaError::LoginRequired.to_string());
        }
        let reply = match cmd {
            Command::Unknown(_) => return None,
            Command::Commands => Ok(self.commands()),
            Command::Register { username, password } => self
                .register(&username, &password)
                .map(|()| format!("Success! Registered {}", username)),
            Command::Login { username, password } => {
                self.login(&username, &password).map(|outcome| match outcome {
                    LoginOutcome::Fresh => format!("Success! {} logged into the system", username),
                    LoginOutcome::ActiveElsewhere => format!(
                        "Success! {} logged into the system (also logged in from another session)",
                        username
                    ),
                    LoginOutcome::Unrecorded => format!(
                        "Success! {} logged into the system (session registry unavailable)",
                        username
                    ),
                })
            }
            Command::Quit => self.quit().map(|outcome| match outcome {
                LogoutOutcome::Clean => "Logged out".to_string(),
                LogoutOutcome::Forced(reason) => format!("Forced logout ({})", reason),
            }),
            Command::CreateFolder { name } => self
                .create_folder(&name)
                .map(|()| format!("Successfully created folder {}", name)),
            Command::ChangeFolder { name } => self
                .change_folder(&name)
                .map(|path| format!("Successfully moved to folder {}", path)),
            Command::WriteFile { name, content } => {
                self.write_file(&name, &content).map(|outcome| match outcome {
                    WriteOutcome::Created => format!("Created and written data to file {}", name),
                    WriteOutcome::Appended => format!("Appended data to file {}", name),
                })
            }
            Command::ReadFile { name } => self.read_file(&name).map(|page| {
                format!(
                    "Reading file from {} bytes to {} bytes\n{}",
                    page.start, page.end, page.text
                )
            }),
            Command::List => self.list().map(|entries| format_listing(&entries)),
        };

        Some(reply.unwrap_or_else(|e| e.to_string()))
    }
}

/// Render a directory listing as a small table.
fn format_listing(entries: &[EntryInfo]) -> String {
    let mut out = String::from("File | Size | Modified Date\n");
    for entry in entries {
        let modified: DateTime<Local> = entry.modified.into();
        let name = if entry.is_dir {
            format!("{}/", entry.name)
        } else {
            entry.name.clone()
        };
        out.push_str("-----------------------\n");
        out.push_str(&format!(
            "{} | {} | {}\n",
            name,
            entry.size,
            modified.format("%a %b %e %H:%M:%S %Y")
        ));
    }
    out
}
