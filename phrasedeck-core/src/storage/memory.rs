use crate::{KeyValueStore, StoreError};
use parking_lot::RwLock;
use std::collections::HashMap;

/// In-process store. With a quota, a write that would push the total size of
/// keys and values past the limit fails and leaves the old value in place.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    max_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(max_bytes: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_bytes: Some(max_bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut v: Vec<String> = self.entries.read().keys().cloned().collect();
        v.sort();
        v
    }
}

/// Total bytes of keys and values once `key` holds `value`.
pub fn projected_size(
    entries: &HashMap<String, String>,
    key: &str,
    value: &str,
) -> usize {
    let current: usize = entries.iter().map(|(k, v)| k.len() + v.len()).sum();
    let replaced = entries.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
    current - replaced + key.len() + value.len()
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut m = self.entries.write();
        if let Some(limit) = self.max_bytes {
            let needed = projected_size(&m, key, value);
            if needed > limit {
                return Err(StoreError::QuotaExceeded { needed, limit });
            }
        }
        m.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().remove(key);
        Ok(())
    }
}
