//! Persistence of the task collection.
//!
//! The schedule model only needs two calls from storage: fetch the initial
//! collection, and persist the full collection after a mutation. Stores
//! never hand malformed data to the model; unreadable or unparsable input
//! falls back to an empty collection.

use std::cell::RefCell;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::db::Database;
use crate::error::Result;
use crate::task::Task;

/// File name of the JSON store inside the data directory.
pub const STORAGE_KEY: &str = "workhand_v2_tasks.json";

pub trait TaskStore {
    /// Initial collection, or an empty one when nothing usable is stored.
    fn load(&self) -> Database;

    /// Persist the full collection.
    fn persist(&self, db: &Database) -> Result<()>;
}

/// Flat JSON array of task records on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TaskStore for JsonFileStore {
    fn load(&self) -> Database {
        if !self.path.exists() {
            return Database::default();
        }
        let mut buf = String::new();
        match File::open(&self.path).and_then(|mut f| f.read_to_string(&mut buf)) {
            Ok(_) => match serde_json::from_str::<Vec<Task>>(&buf) {
                Ok(tasks) => {
                    debug!(path = %self.path.display(), count = tasks.len(), "Loaded tasks");
                    Database::new(tasks)
                }
                Err(e) => {
                    warn!(path = %self.path.display(), "Error parsing task store, starting fresh: {e}");
                    Database::default()
                }
            },
            Err(e) => {
                warn!(path = %self.path.display(), "Error reading task store, starting fresh: {e}");
                Database::default()
            }
        }
    }

    /// Atomic-ish write via temp file + rename.
    fn persist(&self, db: &Database) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(db)?;
        let mut f = File::create(&tmp)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), count = db.len(), "Persisted tasks");
        Ok(())
    }
}

/// Store kept in memory, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: RefCell<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Raw serialised form of the last persisted collection.
    pub fn raw(&self) -> Option<String> {
        self.snapshot.borrow().clone()
    }

    pub fn with_raw(raw: impl Into<String>) -> Self {
        MemoryStore {
            snapshot: RefCell::new(Some(raw.into())),
        }
    }
}

impl TaskStore for MemoryStore {
    fn load(&self) -> Database {
        match self.snapshot.borrow().as_deref() {
            None => Database::default(),
            Some(raw) => serde_json::from_str::<Vec<Task>>(raw)
                .map(Database::new)
                .unwrap_or_else(|e| {
                    warn!("Error parsing in-memory snapshot, starting fresh: {e}");
                    Database::default()
                }),
        }
    }

    fn persist(&self, db: &Database) -> Result<()> {
        let data = serde_json::to_string(db)?;
        *self.snapshot.borrow_mut() = Some(data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Level;
    use chrono::NaiveDate;

    fn sample_db() -> Database {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        Database::new(vec![Task::new("Foundation", Level::Workphase, day, day).with_id("1")])
    }

    #[test]
    fn test_file_store_persists_flat_array() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join(STORAGE_KEY));
        assert!(store.load().is_empty());

        store.persist(&sample_db()).unwrap();
        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.trim_start().starts_with('['));
        assert_eq!(store.load(), sample_db());
    }

    #[test]
    fn test_file_store_falls_back_on_malformed_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORAGE_KEY);
        fs::write(&path, "{\"not\": \"an array\"").unwrap();
        assert!(JsonFileStore::new(&path).load().is_empty());

        fs::write(&path, "[{\"id\": \"1\"}]").unwrap();
        assert!(JsonFileStore::new(&path).load().is_empty());
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(store.load().is_empty());
        store.persist(&sample_db()).unwrap();
        assert_eq!(store.load(), sample_db());
        assert!(MemoryStore::with_raw("garbage").load().is_empty());
    }
}
