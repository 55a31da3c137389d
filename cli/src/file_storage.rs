//! JSON-file backend for the session store.
//!
//! The file holds one flat JSON object of string values, the same shape as
//! browser `localStorage`, so both profiles can share one state file under
//! their own keys.
//!
//! ERROR HANDLING
//! ==============
//! A missing or unreadable file reads as empty. Writes surface as
//! `StorageError::Write`; removals are best-effort and only logged.

#[cfg(test)]
#[path = "file_storage_test.rs"]
mod file_storage_test;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use campus_core::StorageError;
use campus_core::storage::KeyValueStorage;
use serde_json::{Map, Value};

#[derive(Clone, Debug)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Map<String, Value> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Map::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "state file unreadable");
                return Map::new();
            }
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                tracing::warn!(path = %self.path.display(), "state file is not a JSON object; ignoring");
                Map::new()
            }
        }
    }

    fn write_map(&self, map: &Map<String, Value>) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let rendered = serde_json::to_string_pretty(map).map_err(io::Error::other)?;
        fs::write(&self.path, rendered)
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        match self.read_map().remove(key)? {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut map = self.read_map();
        map.insert(key.to_owned(), Value::String(value.to_owned()));
        self.write_map(&map).map_err(|e| StorageError::Write {
            key: key.to_owned(),
            reason: e.to_string(),
        })
    }

    fn remove_item(&self, key: &str) {
        let mut map = self.read_map();
        if map.remove(key).is_none() {
            return;
        }
        if let Err(e) = self.write_map(&map) {
            tracing::warn!(key, error = %e, "failed to remove key from state file");
        }
    }
}
