//! Persisted session storage
//!
//! A small key-value abstraction holding the two values that survive
//! restarts: the bearer token and the cached captain profile.

mod encrypted;

pub use encrypted::EncryptedFileStore;

use anyhow::{Context, Result, anyhow};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::models::Captain;
use crate::paths;

/// Key holding the opaque bearer token
pub const AUTH_TOKEN_KEY: &str = "auth_token";

/// Key holding the JSON-serialized captain profile
pub const CAPTAIN_DATA_KEY: &str = "captain_data";

/// String key-value storage with single-key atomic writes
pub trait KeyValueStore: Send + Sync {
    /// Read a value
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value (missing keys are not an error)
    fn remove(&self, key: &str) -> Result<()>;

    /// Delete several values
    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        for key in keys {
            self.remove(key)?;
        }
        Ok(())
    }
}

/// Process-local store, used in mock runs and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| anyhow!("Memory store lock poisoned"))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries()?.remove(key);
        Ok(())
    }
}

/// Typed access to the persisted session keys
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Wrap a key-value store
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    /// Store kept in memory only
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Encrypted store at the default session path
    pub fn open_default() -> Result<Self> {
        let path = paths::session_path()?;
        Ok(Self::new(EncryptedFileStore::new(path)))
    }

    /// Stored bearer token
    pub fn token(&self) -> Result<Option<String>> {
        self.inner.get(AUTH_TOKEN_KEY)
    }

    /// Persist a bearer token
    pub fn set_token(&self, token: &str) -> Result<()> {
        self.inner.set(AUTH_TOKEN_KEY, token)
    }

    /// Cached captain profile.
    ///
    /// A profile that no longer parses is treated as absent.
    pub fn profile(&self) -> Result<Option<Captain>> {
        let Some(json) = self.inner.get(CAPTAIN_DATA_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&json) {
            Ok(captain) => Ok(Some(captain)),
            Err(e) => {
                tracing::warn!("Ignoring unreadable cached profile: {}", e);
                Ok(None)
            }
        }
    }

    /// Cache a captain profile
    pub fn set_profile(&self, captain: &Captain) -> Result<()> {
        let json = serde_json::to_string(captain).context("Failed to serialize profile")?;
        self.inner.set(CAPTAIN_DATA_KEY, &json)
    }

    /// Remove token and profile together
    pub fn clear(&self) -> Result<()> {
        self.inner.remove_many(&[AUTH_TOKEN_KEY, CAPTAIN_DATA_KEY])
    }
}
