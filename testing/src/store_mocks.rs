//! In-memory document store testing utilities
//!
//! Provides fast, deterministic storage for ledger tests:
//! - [`InMemoryDocumentStore`]: HashMap-based document storage
//! - Write-failure injection for exercising rollback paths

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Test utilities document panics where critical

use reservation_ledger_core::store::{DocumentStore, StoreError};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

/// In-memory document store for fast, deterministic testing.
///
/// Clones share the same underlying map, so a test can hand one clone to the
/// ledger and keep another for assertions.
///
/// # Example
///
/// ```
/// use reservation_ledger_testing::InMemoryDocumentStore;
/// use reservation_ledger_core::store::DocumentStore;
/// use serde_json::json;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryDocumentStore::new();
///
/// store.set("events", json!([]))?;
/// assert_eq!(store.get("events")?, Some(json!([])));
/// assert_eq!(store.get("users")?, None);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryDocumentStore {
    data: Arc<RwLock<HashMap<String, Value>>>,
    failing_keys: Arc<RwLock<HashSet<String>>>,
    writes: Arc<RwLock<Vec<String>>>,
}

impl InMemoryDocumentStore {
    /// Create a new empty in-memory store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write to `key` fail with [`StoreError::Backend`].
    pub fn fail_writes_to(&self, key: &str) {
        self.failing_keys.write().unwrap().insert(key.to_string());
    }

    /// Stop injecting write failures.
    pub fn heal(&self) {
        self.failing_keys.write().unwrap().clear();
    }

    /// Keys written so far, in write order (failed writes excluded).
    #[must_use]
    pub fn write_log(&self) -> Vec<String> {
        self.writes.read().unwrap().clone()
    }

    /// Clear all documents (for test isolation)
    pub fn clear(&self) {
        self.data.write().unwrap().clear();
        self.writes.write().unwrap().clear();
    }

    /// Get the number of stored documents
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.read().unwrap().len()
    }

    /// Check if the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.read().unwrap().is_empty()
    }

    /// Get all keys in the store
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.data.read().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    fn check_writable(&self, key: &str) -> Result<(), StoreError> {
        let failing = self
            .failing_keys
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        if failing.contains(key) {
            return Err(StoreError::Backend(format!("injected write failure for '{key}'")));
        }
        Ok(())
    }

    fn record_write(&self, key: &str) -> Result<(), StoreError> {
        self.writes
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?
            .push(key.to_string());
        Ok(())
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self
            .data
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.check_writable(key)?;
        self.data
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?
            .insert(key.to_string(), value);
        self.record_write(key)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.check_writable(key)?;
        self.data
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?
            .remove(key);
        self.record_write(key)
    }
}
