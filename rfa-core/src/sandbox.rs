//! Sandbox filesystem - maps session paths onto the real directory tree.
//!
//! Every session path is a list of segments under the sandbox root. The
//! first segment is the owning user's folder and acts as the fence: a
//! resolved path must stay inside it, symlinks included.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::warn;

use crate::error::{RfaError, RfaResult};

/// Path inside the sandbox, as a list of folder names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VirtualPath {
    segments: Vec<String>,
}

impl VirtualPath {
    /// The sandbox root itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// The home folder of `username`.
    pub fn user_root(username: &str) -> Self {
        Self {
            segments: vec![username.to_string()],
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Path of a direct child.
    pub fn join(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self { segments }
    }

    /// Drop the last segment. Returns false at the sandbox root.
    pub fn pop(&mut self) -> bool {
        self.segments.pop().is_some()
    }
}

impl fmt::Display for VirtualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}

/// A directory entry as reported by `list`.
#[derive(Debug, Clone)]
pub struct EntryInfo {
    pub name: String,
    pub size: u64,
    pub modified: SystemTime,
    pub is_dir: bool,
}

/// Result of `write_file`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    Appended,
}

/// Check that `name` is a single normal path component.
pub fn validate_name(name: &str) -> RfaResult<()> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(|c: char| matches!(c, '/' | '\\' | '\0'));
    if bad {
        Err(RfaError::InvalidName(name.to_string()))
    } else {
        Ok(())
    }
}

/// Real directory tree holding one folder per registered user.
#[derive(Debug, Clone)]
pub struct Sandbox {
    root: PathBuf,
}

impl Sandbox {
    /// Open (creating if needed) the sandbox rooted at `root`.
    ///
    /// The root is canonicalized so later prefix checks compare like with like.
    pub fn new(root: impl Into<PathBuf>) -> RfaResult<Self> {
        let root: PathBuf = root.into();
        fs::create_dir_all(&root)?;
        let root = root.canonicalize()?;
        Ok(Self { root })
    }

    /// Get the canonical root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the home folder for a newly registered user.
    pub fn provision_user(&self, username: &str) -> RfaResult<()> {
        validate_name(username)?;
        fs::create_dir_all(self.root.join(username))?;
        Ok(())
    }

    /// Resolve a session path to a real path inside its owner's fence.
    ///
    /// Existing paths are canonicalized; for a missing leaf the parent is
    /// canonicalized and the file name appended.
    pub fn resolve(&self, path: &VirtualPath) -> RfaResult<PathBuf> {
        let mut full = self.root.clone();
        full.extend(path.segments());

        let canonical = if full.exists() {
            full.canonicalize()?
        } else {
            match (full.parent(), full.file_name()) {
                (Some(parent), Some(name)) if parent.exists() => {
                    parent.canonicalize()?.join(name)
                }
                _ => full,
            }
        };

        let fence = match path.segments().first() {
            Some(owner) => self.root.join(owner),
            None => self.root.clone(),
        };
        if !canonical.starts_with(&fence) {
            warn!(path = %path, resolved = %canonical.display(), "rejected sandbox escape");
            return Err(RfaError::PathEscapesRoot(path.to_string()));
        }

        Ok(canonical)
    }

    /// Check whether a session path is an existing directory.
    pub fn is_dir(&self, path: &VirtualPath) -> RfaResult<bool> {
        let full = self.resolve(path)?;
        Ok(full.is_dir())
    }

    /// Create folder `name` inside `dir`.
    pub fn create_dir(&self, dir: &VirtualPath, name: &str) -> RfaResult<()> {
        validate_name(name)?;
        let target = self.resolve(&dir.join(name))?;
        fs::create_dir(&target).map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => RfaError::AlreadyExists(name.to_string()),
            _ => RfaError::Io(e),
        })
    }

    /// Append `content` to file `name` in `dir`, creating it if missing.
    pub fn append_or_create(
        &self,
        dir: &VirtualPath,
        name: &str,
        content: &str,
    ) -> RfaResult<WriteOutcome> {
        validate_name(name)?;
        let target = self.resolve(&dir.join(name))?;

        if target.is_dir() {
            return Err(RfaError::IsAFolder(name.to_string()));
        }
        if target.is_file() {
            let mut file = OpenOptions::new().append(true).open(&target)?;
            file.write_all(content.as_bytes())?;
            return Ok(WriteOutcome::Appended);
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => RfaError::IsAFolder(name.to_string()),
                _ => RfaError::Io(e),
            })?;
        file.write_all(content.as_bytes())?;
        Ok(WriteOutcome::Created)
    }

    /// Read the whole of file `name` in `dir`.
    ///
    /// Returns the canonical path alongside the content so callers can key
    /// per-file state on it.
    pub fn read_file(&self, dir: &VirtualPath, name: &str) -> RfaResult<(PathBuf, Vec<u8>)> {
        validate_name(name).map_err(|_| RfaError::FileNotFound(name.to_string()))?;
        let target = self.resolve(&dir.join(name))?;
        if !target.is_file() {
            return Err(RfaError::FileNotFound(name.to_string()));
        }
        let data = fs::read(&target).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => RfaError::FileNotFound(name.to_string()),
            _ => RfaError::Io(e),
        })?;
        Ok((target, data))
    }

    /// List the immediate entries of `dir`, sorted by name.
    pub fn list(&self, dir: &VirtualPath) -> RfaResult<Vec<EntryInfo>> {
        let full = self.resolve(dir)?;
        if !full.is_dir() {
            return Err(RfaError::NotADirectory(dir.to_string()));
        }

        let mut entries = Vec::new();
        for entry in fs::read_dir(&full)? {
            let entry = entry?;
            let meta = entry.metadata()?;
            entries.push(EntryInfo {
                name: entry.file_name().to_string_lossy().into_owned(),
                size: meta.len(),
                modified: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
                is_dir: meta.is_dir(),
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}
