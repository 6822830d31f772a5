use crate::{
    error::{Result, SwimlaneError},
    storage::KeyValueStore,
};
use wasm_bindgen::JsValue;
use web_sys::Storage;

/// `window.localStorage` as a key-value store
pub struct LocalStorage {
    storage: Storage,
}

fn storage_error(operation: &str, key: &str, err: JsValue) -> SwimlaneError {
    SwimlaneError::StorageError(format!("localStorage {} `{}` failed: {:?}", operation, key, err))
}

impl LocalStorage {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Opens the current window's local storage.
    ///
    /// # Errors
    /// - Returns `StorageError` outside a window or when storage is disabled.
    pub fn from_window() -> Result<Self> {
        let window = web_sys::window()
            .ok_or_else(|| SwimlaneError::StorageError("no global window".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(|err| storage_error("open", "", err))?
            .ok_or_else(|| SwimlaneError::StorageError("localStorage is unavailable".to_string()))?;
        Ok(Self::new(storage))
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|err| storage_error("read", key, err))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.storage
            .set_item(key, value)
            .map_err(|err| storage_error("write", key, err))
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.storage
            .remove_item(key)
            .map_err(|err| storage_error("remove", key, err))
    }
}
