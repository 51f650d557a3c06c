//! Browser `localStorage` implementation for WebAssembly.

use super::{KeyValueStore, StorageError, StorageResult};
use wasm_bindgen::JsValue;

/// `window.localStorage`-backed storage.
///
/// Writes may fail once the origin quota is exhausted; callers treat that
/// as a non-fatal condition.
#[derive(Default)]
pub struct LocalStorageStore;

impl LocalStorageStore {
    /// Create a new handle. The storage object is resolved on each access.
    pub fn new() -> Self {
        Self
    }

    fn storage(&self) -> StorageResult<web_sys::Storage> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Other("No window object".to_string()))?;
        window
            .local_storage()
            .map_err(js_error)?
            .ok_or_else(|| StorageError::Other("localStorage not available".to_string()))
    }
}

fn js_error(e: JsValue) -> StorageError {
    StorageError::Other(format!("localStorage error: {:?}", e))
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.storage()?.get_item(key).map_err(js_error)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.storage()?.set_item(key, value).map_err(js_error)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.storage()?.remove_item(key).map_err(js_error)
    }
}
