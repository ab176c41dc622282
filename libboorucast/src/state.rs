//! Persisted notification cursor
//!
//! A single integer in a flat file: the id of the last notification the bot
//! processed. Anything at or below it is never handled again, across
//! restarts included.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

use crate::error::{Result, StateError};

#[derive(Debug)]
pub struct CursorFile {
    path: PathBuf,
    cursor: Option<u64>,
}

impl CursorFile {
    /// Load the cursor. A missing file or unparsable content both mean "no
    /// prior state".
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cursor = fs::read_to_string(&path)
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok());
        match cursor {
            Some(id) => debug!("recovered state, last notification id is {id}"),
            None => debug!("no previous state found at {}", path.display()),
        }
        Self { path, cursor }
    }

    /// `None` means the bot has never processed a notification.
    pub fn cursor(&self) -> Option<u64> {
        self.cursor
    }

    /// Raise the cursor; it never moves backwards.
    pub fn advance(&mut self, id: u64) {
        if self.cursor.is_none_or(|current| id > current) {
            self.cursor = Some(id);
        }
    }

    /// Overwrite the state file with the current cursor and flush it to
    /// disk before returning.
    pub fn persist(&self) -> Result<()> {
        let id = self.cursor.unwrap_or(0);
        let write = || -> std::io::Result<()> {
            let mut file = fs::File::create(&self.path)?;
            write!(file, "{id}")?;
            file.sync_all()
        };
        write().map_err(|source| StateError::Write {
            path: self.path.display().to_string(),
            source,
        })?;
        Ok(())
    }
}
