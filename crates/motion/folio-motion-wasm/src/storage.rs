//! `localStorage`-backed preference store.

use folio_motion_core::{PreferenceStore, StoreError};
use web_sys::Storage;

/// Falls back to "nothing stored" when storage is disabled (private mode,
/// sandboxed iframes); writes then fail with a StoreError.
pub struct LocalStorageStore {
    storage: Option<Storage>,
}

impl LocalStorageStore {
    pub fn open() -> Self {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        Self { storage }
    }
}

impl PreferenceStore for LocalStorageStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let storage = self.storage.as_ref().ok_or_else(|| StoreError {
            key: key.to_string(),
            reason: "localStorage unavailable".into(),
        })?;
        storage.set_item(key, value).map_err(|e| StoreError {
            key: key.to_string(),
            reason: format!("{e:?}"),
        })
    }
}
