//! Server configuration.

use std::path::PathBuf;

/// Default sandbox root, relative to the working directory.
pub const DEFAULT_SANDBOX_ROOT: &str = "Root";

/// Default directory for the user tables.
pub const DEFAULT_STATE_DIR: &str = "AccessSession";

/// Bytes returned per `read_file` call.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// File name of the registered-users table inside the state directory.
pub const REGISTERED_USERS_FILE: &str = "registered_users.jsonl";

/// File name of the logged-in-users table inside the state directory.
pub const LOGGED_IN_USERS_FILE: &str = "logged_in_users.jsonl";

/// Where the server keeps its state.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Directory holding one folder per registered user.
    pub sandbox_root: PathBuf,
    /// Directory holding the user tables.
    pub state_dir: PathBuf,
    /// Page size for paginated reads.
    pub page_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            sandbox_root: PathBuf::from(DEFAULT_SANDBOX_ROOT),
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ServerConfig {
    pub fn registered_users_path(&self) -> PathBuf {
        self.state_dir.join(REGISTERED_USERS_FILE)
    }

    pub fn logged_in_users_path(&self) -> PathBuf {
        self.state_dir.join(LOGGED_IN_USERS_FILE)
    }
}
