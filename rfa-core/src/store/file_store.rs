//! Durable record table stored as JSON Lines.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

use super::record_store::{RecordStore, StoreError, StoreResult, UserRecord};

/// Record table persisted to a file, one JSON object per line.
///
/// A missing file reads as an empty table. The file and its parent
/// directories are created on the first write.
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    path: PathBuf,
}

impl FileRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn io_err(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn ensure_parent(&self) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
            }
        }
        Ok(())
    }
}

impl RecordStore for FileRecordStore {
    fn records(&self) -> StoreResult<Vec<UserRecord>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_err(e)),
        };

        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str(line).map_err(|source| StoreError::Corrupt {
                    path: self.path.clone(),
                    line: i + 1,
                    source,
                })
            })
            .collect()
    }

    fn append(&mut self, record: UserRecord) -> StoreResult<()> {
        self.ensure_parent()?;
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_err(e))?;
        file.write_all(line.as_bytes()).map_err(|e| self.io_err(e))
    }

    fn rewrite_excluding(&mut self, username: &str) -> StoreResult<()> {
        let kept = self.records()?;

        let mut out = String::new();
        for record in kept.iter().filter(|r| r.username != username) {
            out.push_str(&serde_json::to_string(record)?);
            out.push('\n');
        }

        self.ensure_parent()?;
        fs::write(&self.path, out).map_err(|e| self.io_err(e))
    }
}
