//! Durable key-value slot abstraction.
//!
//! The session store mirrors its whole state into a single key. Writes are
//! synchronous full replacements, so implementations only need whole-value
//! get/set semantics.

use crate::error::Result;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Key under which the session list is stored.
pub const SESSIONS_KEY: &str = "chat_sessions";

/// A string-valued key-value store.
///
/// Implementations must make `set` all-or-nothing: a reader sees either the
/// previous value or the new one, never a mix.
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`.
    ///
    /// - `Ok(Some(value))`: key present
    /// - `Ok(None)`: key never written or removed
    /// - `Err(_)`: the backing medium could not be read
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replaces the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Process-local store, used for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct InMemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with one entry.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let store = Self::default();
        store
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
        store
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}
