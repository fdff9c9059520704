//! In-memory storage for native runs and tests

use std::collections::HashMap;

use super::Storage;
use crate::error::StorageError;

/// HashMap-backed `Storage`
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
    /// Reject writes, to exercise failure paths
    pub read_only: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with one key
    pub fn with_item(key: &str, value: &str) -> Self {
        let mut storage = Self::new();
        storage.items.insert(key.to_string(), value.to_string());
        storage
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::WriteFailed {
                key: key.to_string(),
                reason: "read-only storage".to_string(),
            });
        }
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
