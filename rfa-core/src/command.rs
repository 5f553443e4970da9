//! Command grammar.
//!
//! One command per line: the first space-separated token names the command,
//! the rest are positional arguments. `write_file` is the only command whose
//! trailing tokens are joined back into one argument.

use crate::error::{RfaError, RfaResult};

/// A parsed client command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Commands,
    Register { username: String, password: String },
    Login { username: String, password: String },
    Quit,
    CreateFolder { name: String },
    ChangeFolder { name: String },
    List,
    ReadFile { name: String },
    WriteFile { name: String, content: String },
    /// Command name outside the grammar. Produces no reply.
    Unknown(String),
}

/// Catalogue entry: name, usage form, description.
struct CommandSpec {
    name: &'static str,
    usage: &'static str,
    about: &'static str,
}

const CATALOGUE: &[CommandSpec] = &[
    CommandSpec {
        name: "register",
        usage: "register <username> <password>",
        about: "To register as a new user",
    },
    CommandSpec {
        name: "login",
        usage: "login <username> <password>",
        about: "To login",
    },
    CommandSpec {
        name: "quit",
        usage: "quit",
        about: "To logout",
    },
    CommandSpec {
        name: "change_folder",
        usage: "change_folder <name>",
        about: "To change the current path",
    },
    CommandSpec {
        name: "list",
        usage: "list",
        about: "Lists all files in the current path",
    },
    CommandSpec {
        name: "read_file",
        usage: "read_file <name>",
        about: "To read content from the file",
    },
    CommandSpec {
        name: "write_file",
        usage: "write_file <name> <content>",
        about: "To write content into the file",
    },
    CommandSpec {
        name: "create_folder",
        usage: "create_folder <name>",
        about: "To create new folder",
    },
    CommandSpec {
        name: "commands",
        usage: "commands",
        about: "Lists the supported commands",
    },
];

/// Usage form for a command name in the grammar.
pub fn usage(name: &str) -> Option<&'static str> {
    CATALOGUE.iter().find(|c| c.name == name).map(|c| c.usage)
}

/// Human-readable list of every supported command.
pub fn catalogue() -> String {
    CATALOGUE
        .iter()
        .map(|c| format!("{} : {},\n    command: {}\n", c.name, c.about, c.usage))
        .collect()
}

fn malformed(name: &str) -> RfaError {
    RfaError::MalformedCommand(usage(name).unwrap_or("commands"))
}

impl Command {
    /// Parse one input line.
    ///
    /// Fails with `MalformedCommand` when a known command has the wrong
    /// number of arguments.
    pub fn parse(line: &str) -> RfaResult<Self> {
        let tokens: Vec<&str> = line.trim().split(' ').collect();
        let (name, args) = match tokens.split_first() {
            Some((name, args)) => (*name, args),
            None => return Ok(Self::Unknown(String::new())),
        };

        let cmd = match (name, args) {
            ("commands", []) => Self::Commands,
            ("register", [username, password]) => Self::Register {
                username: username.to_string(),
                password: password.to_string(),
            },
            ("login", [username, password]) => Self::Login {
                username: username.to_string(),
                password: password.to_string(),
            },
            ("quit", []) => Self::Quit,
            ("create_folder", [name]) => Self::CreateFolder {
                name: name.to_string(),
            },
            ("change_folder", [name]) => Self::ChangeFolder {
                name: name.to_string(),
            },
            ("list", []) => Self::List,
            ("read_file", [name]) => Self::ReadFile {
                name: name.to_string(),
            },
            ("write_file", [name, content @ ..]) => Self::WriteFile {
                name: name.to_string(),
                content: content.join(" "),
            },
            (name, _) if usage(name).is_some() => return Err(malformed(name)),
            (name, _) => Self::Unknown(name.to_string()),
        };
        Ok(cmd)
    }

    /// Command name as typed by the client. Arguments are left out so
    /// passwords never reach the logs.
    pub fn name(&self) -> &str {
        match self {
            Self::Commands => "commands",
            Self::Register { .. } => "register",
            Self::Login { .. } => "login",
            Self::Quit => "quit",
            Self::CreateFolder { .. } => "create_folder",
            Self::ChangeFolder { .. } => "change_folder",
            Self::List => "list",
            Self::ReadFile { .. } => "read_file",
            Self::WriteFile { .. } => "write_file",
            Self::Unknown(name) => name,
        }
    }

    /// Whether this command may run before login.
    pub fn is_anonymous(&self) -> bool {
        matches!(
            self,
            Self::Commands | Self::Register { .. } | Self::Login { .. } | Self::Unknown(_)
        )
    }
}
