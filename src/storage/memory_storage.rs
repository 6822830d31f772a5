use crate::{
    error::{Result, SwimlaneError},
    storage::KeyValueStore,
};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

/// In-process key/value store.
///
/// Writes to keys marked with [`MemoryStore::fail_writes_to`] return a
/// storage error, which lets callers exercise quota and partial-write paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
    failing_keys: RefCell<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `set` on `key` fail
    pub fn fail_writes_to(&self, key: &str) {
        self.failing_keys.borrow_mut().insert(key.to_string());
    }

    pub fn clear_failures(&self) {
        self.failing_keys.borrow_mut().clear();
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.failing_keys.borrow().contains(key) {
            return Err(SwimlaneError::StorageError(format!(
                "write to `{}` rejected",
                key
            )));
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}
