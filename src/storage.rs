//! Storage layer for todos
//!
//! The whole task list lives in one durable slot: a named key holding a JSON
//! array of task records. On disk a slot is a single file:
//!
//! ```text
//! <data_dir>/
//!   <key>.json        # e.g. todos.json
//! ```
//!
//! Reading never fails from the caller's point of view: a missing slot or
//! malformed content yields an empty list. Writing always replaces the whole
//! value.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::task::TaskRecord;

/// Default slot key
pub const DEFAULT_KEY: &str = "todos";

/// A single named key-value slot
pub trait Slot {
    /// Raw slot content, or `None` if the slot has never been written
    fn read(&self) -> Result<Option<String>>;

    /// Replace the slot content
    fn write(&self, content: &str) -> Result<()>;

    /// Human-readable location, for logs and CLI output
    fn location(&self) -> String;
}

/// Slot backed by a JSON file in a data directory
#[derive(Debug, Clone)]
pub struct FileSlot {
    dir: PathBuf,
    key: String,
}

impl FileSlot {
    pub fn new(dir: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            key: key.into(),
        }
    }

    /// Path to the slot file
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.key))
    }
}

impl Slot for FileSlot {
    fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(self.path()) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Error::Io(err)),
        }
    }

    /// Write atomically: temp file in the same directory, then rename, so a
    /// reader never sees a truncated slot.
    fn write(&self, content: &str) -> Result<()> {
        let path = self.path();
        let wrap = |source: io::Error| Error::SlotWrite {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(wrap)?;
        let mut temp = NamedTempFile::new_in(&self.dir).map_err(wrap)?;
        temp.write_all(content.as_bytes()).map_err(wrap)?;
        temp.as_file().sync_all().map_err(wrap)?;
        temp.persist(&path).map_err(|err| wrap(err.error))?;
        Ok(())
    }

    fn location(&self) -> String {
        self.path().display().to_string()
    }
}

/// In-memory slot, for tests and embedding
#[derive(Debug, Default)]
pub struct MemorySlot {
    content: RefCell<Option<String>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            content: RefCell::new(Some(content.into())),
        }
    }

    pub fn content(&self) -> Option<String> {
        self.content.borrow().clone()
    }
}

impl Slot for MemorySlot {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.content.borrow().clone())
    }

    fn write(&self, content: &str) -> Result<()> {
        *self.content.borrow_mut() = Some(content.to_string());
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

impl<S: Slot + ?Sized> Slot for &S {
    fn read(&self) -> Result<Option<String>> {
        (**self).read()
    }

    fn write(&self, content: &str) -> Result<()> {
        (**self).write(content)
    }

    fn location(&self) -> String {
        (**self).location()
    }
}

// =========================================================================
// Snapshot load/save
// =========================================================================

/// Load the task list from a slot.
///
/// Any failure (unreadable slot, invalid JSON, a value that is not a list of
/// records) is logged and recovered as an empty list.
pub fn load<S: Slot + ?Sized>(slot: &S) -> Vec<TaskRecord> {
    let raw = match slot.read() {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            tracing::debug!(slot = %slot.location(), "slot empty; starting with no tasks");
            return Vec::new();
        }
        Err(err) => {
            tracing::warn!(slot = %slot.location(), error = %err, "slot unreadable; starting with no tasks");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<TaskRecord>>(&raw) {
        Ok(records) => {
            let total = records.len();
            let tasks = normalize(records);
            if tasks.len() != total {
                tracing::warn!(
                    slot = %slot.location(),
                    dropped = total - tasks.len(),
                    "dropped blank or duplicate task records"
                );
            }
            tracing::debug!(slot = %slot.location(), count = tasks.len(), "loaded tasks");
            tasks
        }
        Err(err) => {
            tracing::warn!(slot = %slot.location(), error = %err, "slot malformed; starting with no tasks");
            Vec::new()
        }
    }
}

/// Trim task text, then drop blank records and repeated ids (first wins)
fn normalize(records: Vec<TaskRecord>) -> Vec<TaskRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter_map(|mut record| {
            let text = record.text.trim();
            if text.is_empty() || !seen.insert(record.id.clone()) {
                return None;
            }
            if text.len() != record.text.len() {
                record.text = text.to_string();
            }
            Some(record)
        })
        .collect()
}

/// Serialize the full task list and overwrite the slot
pub fn save<S: Slot + ?Sized>(slot: &S, tasks: &[TaskRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(tasks)?;
    slot.write(&json)?;
    tracing::debug!(slot = %slot.location(), count = tasks.len(), "saved tasks");
    Ok(())
}
