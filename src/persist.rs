//! JSON-document persistence for domain state
//!
//! One pretty-printed UTF-8 document per domain, human-readable and
//! field-compatible with external consumers. Single-record domains are
//! overwritten whole; log-style domains (leads, check-ins) are read,
//! appended to, and rewritten. There is no cross-crash transaction: at
//! most one flush happens per completed mutating tool call, and a crash
//! before that flush loses only the in-progress turn's mutation.
//!
//! Concurrent sessions writing the same file are last-write-wins; the
//! store takes no locks.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to create data directory {path}: {source}")]
    CreateDir {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to serialize {path}: {source}")]
    Serialize {
        path: String,
        source: serde_json::Error,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Store of JSON documents under a single data directory.
///
/// Keys are bare file stems; `open("data")` + key `"game_state"` maps
/// to `data/game_state.json`.
#[derive(Clone)]
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    pub fn open<P: AsRef<Path>>(root: P) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|source| StoreError::CreateDir {
            path: root.display().to_string(),
            source,
        })?;
        Ok(Self { root })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    /// Load a single-record document, falling back to the provided
    /// default when the file is missing or unreadable. A corrupt file
    /// never blocks startup.
    pub fn load_or<T, F>(&self, key: &str, default: F) -> T
    where
        T: DeserializeOwned,
        F: FnOnce() -> T,
    {
        let path = self.path(key);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read state file, using default");
                return default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "corrupt state file, using default");
                default()
            }
        }
    }

    pub fn load_or_default<T>(&self, key: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        self.load_or(key, T::default)
    }

    /// Overwrite the whole document for a single-record domain.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> StoreResult<()> {
        let path = self.path(key);
        let body = serde_json::to_string_pretty(value).map_err(|source| StoreError::Serialize {
            path: path.display().to_string(),
            source,
        })?;
        fs::write(&path, body).map_err(|source| StoreError::Write {
            path: path.display().to_string(),
            source,
        })
    }

    /// Load a log-style document. A corrupt or missing log is empty.
    pub fn load_log<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        self.load_or(key, Vec::new)
    }

    /// Append a record to a log-style document: read the existing
    /// collection, push the new record last, rewrite the whole file.
    pub fn append<T>(&self, key: &str, record: T) -> StoreResult<()>
    where
        T: Serialize + DeserializeOwned,
    {
        let mut records: Vec<T> = self.load_log(key);
        records.push(record);
        self.save(key, &records)
    }

    pub fn exists(&self, key: &str) -> bool {
        self.path(key).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
    struct Record {
        name: String,
        count: u32,
    }

    fn store() -> (TempDir, JsonStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn save_then_load_round_trips() {
        let (_dir, store) = store();
        let record = Record {
            name: "milk".into(),
            count: 3,
        };
        store.save("record", &record).unwrap();
        let loaded: Record = store.load_or_default("record");
        assert_eq!(loaded, record);
    }

    #[test]
    fn missing_file_yields_default() {
        let (_dir, store) = store();
        let loaded: Record = store.load_or_default("nothing_here");
        assert_eq!(loaded, Record::default());
    }

    #[test]
    fn corrupt_file_yields_default() {
        let (dir, store) = store();
        std::fs::write(dir.path().join("record.json"), "{ not json").unwrap();
        let loaded: Record = store.load_or_default("record");
        assert_eq!(loaded, Record::default());
    }

    #[test]
    fn corrupt_log_treated_as_empty() {
        let (dir, store) = store();
        std::fs::write(dir.path().join("log.json"), "][").unwrap();
        let loaded: Vec<Record> = store.load_log("log");
        assert!(loaded.is_empty());

        // appending after corruption starts a fresh log
        store
            .append(
                "log",
                Record {
                    name: "first".into(),
                    count: 1,
                },
            )
            .unwrap();
        let loaded: Vec<Record> = store.load_log("log");
        assert_eq!(loaded.len(), 1);
    }

    #[test]
    fn append_keeps_newest_last() {
        let (_dir, store) = store();
        for i in 0..3 {
            store
                .append(
                    "log",
                    Record {
                        name: format!("r{i}"),
                        count: i,
                    },
                )
                .unwrap();
        }
        let loaded: Vec<Record> = store.load_log("log");
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.last().unwrap().name, "r2");
    }

    #[test]
    fn save_overwrites_whole_file() {
        let (_dir, store) = store();
        store
            .save(
                "record",
                &Record {
                    name: "a".into(),
                    count: 1,
                },
            )
            .unwrap();
        store
            .save(
                "record",
                &Record {
                    name: "b".into(),
                    count: 2,
                },
            )
            .unwrap();
        let loaded: Record = store.load_or_default("record");
        assert_eq!(loaded.name, "b");
    }

    #[test]
    fn documents_are_pretty_printed() {
        let (dir, store) = store();
        store
            .save(
                "record",
                &Record {
                    name: "a".into(),
                    count: 1,
                },
            )
            .unwrap();
        let raw = std::fs::read_to_string(dir.path().join("record.json")).unwrap();
        assert!(raw.contains('\n'));
    }
}
