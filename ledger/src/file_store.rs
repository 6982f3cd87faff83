//! Durable [`DocumentStore`] backed by one JSON file per key.

use reservation_ledger_core::store::{DocumentStore, StoreError};
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Stores each document as `<dir>/<key>.json`.
///
/// Writes go to a sibling temporary file that is then renamed over the target,
/// so a crash mid-write leaves the previous document intact.
///
/// All I/O is blocking `std::fs` and runs on the calling task. Documents are
/// small and local; a store shared by many concurrent server tasks should move
/// these calls onto `tokio::task::spawn_blocking`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Store documents under `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory holding the documents.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::Backend(format!("invalid document key '{key}'")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

fn io_error(key: &str, source: std::io::Error) -> StoreError {
    StoreError::Io {
        key: key.to_string(),
        source,
    }
}

impl DocumentStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let path = self.path_for(key)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(key, e)),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StoreError::Serialization {
                key: key.to_string(),
                message: e.to_string(),
            })
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(|e| io_error(key, e))?;

        let bytes = serde_json::to_vec_pretty(&value).map_err(|e| StoreError::Serialization {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, bytes).map_err(|e| io_error(key, e))?;
        fs::rename(&tmp, &path).map_err(|e| io_error(key, e))?;

        tracing::trace!(key, path = %path.display(), "document written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(key, e)),
        }
    }

    fn contains(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.path_for(key)?.is_file())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round_trip_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("data"));

        assert_eq!(store.get("events").unwrap(), None);
        assert!(!store.contains("events").unwrap());

        store.set("events", json!([{ "id": 1 }])).unwrap();
        assert!(store.contains("events").unwrap());
        assert_eq!(store.get("events").unwrap(), Some(json!([{ "id": 1 }])));
        assert!(dir.path().join("data/events.json").is_file());

        store.remove("events").unwrap();
        store.remove("events").unwrap();
        assert_eq!(store.get("events").unwrap(), None);
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        assert!(matches!(store.get("../etc/passwd"), Err(StoreError::Backend(_))));
        assert!(matches!(store.set("", json!([])), Err(StoreError::Backend(_))));
    }

    #[test]
    fn test_corrupt_file_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("users.json"), b"{not json").unwrap();
        let store = JsonFileStore::new(dir.path());
        assert!(matches!(
            store.get("users"),
            Err(StoreError::Serialization { ref key, .. }) if key == "users"
        ));
    }
}
