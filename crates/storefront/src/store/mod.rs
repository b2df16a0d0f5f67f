//! Key-value persistence: the browser `localStorage` analog.
//!
//! Every durable piece of session state (cart, pending payment, auth
//! session) lives under a well-known key as a JSON string. Two backends are
//! provided: [`FileStore`] for real use and [`MemoryStore`] for tests.
//!
//! Persistence is deliberately best-effort at the call sites that mutate
//! state: the in-memory value stays authoritative for the session, so the
//! JSON helpers here log failures instead of propagating them.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Well-known storage keys.
pub mod keys {
    /// The serialized cart line array.
    pub const CART: &str = "shopping-cart";

    /// The pending payment bridging the redirect to the hosted page and back.
    pub const PENDING_PAYMENT: &str = "pending-payment";

    /// The auth session (user record plus token pair).
    pub const AUTH_SESSION: &str = "auth-session";
}

/// Errors that can occur in a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem operation failed (quota, permissions, missing directory).
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A concurrent writer panicked while holding the store lock.
    #[error("storage lock poisoned")]
    Poisoned,
}

/// A string key-value store with last-writer-wins semantics.
///
/// Mirrors the browser storage contract: no locking across writers, values
/// are opaque strings, and removal of a missing key is not an error.
pub trait KvStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Shared handle to a storage backend.
pub type SharedStore = Arc<dyn KvStore>;

/// Read and decode a JSON value; `None` when absent, unreadable, or corrupt.
///
/// Corruption is logged and treated as absence - a damaged record must never
/// take the session down.
pub fn read_json<T: DeserializeOwned>(store: &dyn KvStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(raw) => raw?,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to read from store");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "corrupt record in store, ignoring");
            None
        }
    }
}

/// Encode and persist a JSON value, logging (not propagating) failures.
pub fn write_json<T: Serialize>(store: &dyn KvStore, key: &str, value: &T) {
    let raw = match serde_json::to_string(value) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to serialize record");
            return;
        }
    };

    if let Err(e) = store.set(key, &raw) {
        tracing::warn!(key, error = %e, "failed to persist record, in-memory state unaffected");
    }
}

/// Remove a key, logging (not propagating) failures.
pub fn remove(store: &dyn KvStore, key: &str) {
    if let Err(e) = store.remove(key) {
        tracing::warn!(key, error = %e, "failed to remove record from store");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_roundtrip() {
        let store = MemoryStore::new();
        write_json(&store, "numbers", &vec![1, 2, 3]);

        let numbers: Option<Vec<i32>> = read_json(&store, "numbers");
        assert_eq!(numbers, Some(vec![1, 2, 3]));
    }

    #[test]
    fn corrupt_record_reads_as_absent() {
        let store = MemoryStore::new();
        store.set("numbers", "{definitely not json").unwrap();

        let numbers: Option<Vec<i32>> = read_json(&store, "numbers");
        assert_eq!(numbers, None);
    }

    #[test]
    fn missing_key_reads_as_absent() {
        let store = MemoryStore::new();
        let value: Option<String> = read_json(&store, "nope");
        assert_eq!(value, None);
    }
}
