//! In-memory key-value store.

use crate::error::{ChirpError, Result};
use crate::storage::SnapshotStore;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// In-memory store backed by a shared map.
///
/// Clones share the same backing map, so a test can keep a handle to the
/// bytes while the engine owns another clone.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    /// True when no keys are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SnapshotStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let map = self
            .inner
            .read()
            .map_err(|_| ChirpError::storage("memory store lock poisoned"))?;
        Ok(map.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<()> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| ChirpError::storage("memory store lock poisoned"))?;
        map.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}
