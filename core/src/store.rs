//! Document store abstraction backing the ledger.
//!
//! The ledger persists three independent documents, each a JSON array:
//!
//! - `users`: user accounts
//! - `events`: cultural events with their availability
//! - `reservations`: every reservation ever made (never physically deleted)
//!
//! A [`DocumentStore`] maps keys to whole JSON documents with synchronous reads
//! and writes, mirroring the process-local key-value storage the ledger was
//! designed around.
//!
//! # Implementations
//!
//! - `JsonFileStore` (in `reservation-ledger` crate): one JSON file per key on disk
//! - `InMemoryDocumentStore` (in `reservation-ledger-testing` crate): fast, deterministic testing

use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Key of the users collection.
pub const USERS_KEY: &str = "users";

/// Key of the events collection.
pub const EVENTS_KEY: &str = "events";

/// Key of the reservations collection.
pub const RESERVATIONS_KEY: &str = "reservations";

/// Errors that can occur while reading or writing documents.
#[derive(Error, Debug)]
pub enum StoreError {
    /// General I/O error.
    #[error("I/O error on document '{key}': {source}")]
    Io {
        /// Document key
        key: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A document could not be encoded or decoded.
    #[error("Serialization error on document '{key}': {message}")]
    Serialization {
        /// Document key
        key: String,
        /// Decoder message
        message: String,
    },

    /// Backend-specific failure.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Key to JSON-document storage.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the ledger serializes its own
/// operations, so implementations only need each call to be individually safe.
pub trait DocumentStore: Send + Sync {
    /// Read the document stored under `key`, or `None` if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be read or the document is corrupt.
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Replace the document stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be written.
    fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    /// Delete the document stored under `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Whether a document exists under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be read.
    fn contains(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.get(key)?.is_some())
    }
}

impl<S: DocumentStore + ?Sized> DocumentStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }

    fn contains(&self, key: &str) -> Result<bool, StoreError> {
        (**self).contains(key)
    }
}
