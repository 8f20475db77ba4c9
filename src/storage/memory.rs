//! In-memory store, used for session scope and in tests.

use super::KeyValueStore;
use crate::error::WhoopError;
use dashmap::DashMap;

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.value().clone())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), WhoopError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), WhoopError> {
        self.entries.remove(key);
        Ok(())
    }

    fn take(&self, key: &str) -> Result<Option<String>, WhoopError> {
        Ok(self.entries.remove(key).map(|(_, v)| v))
    }
}
