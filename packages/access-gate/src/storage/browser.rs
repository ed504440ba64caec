use super::{KeyValueStorage, StorageError};

/// `window.localStorage` backend
///
/// Looks the storage object up on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStorage;

impl BrowserStorage {
    fn local_storage() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .ok_or(StorageError::Unavailable)?
            .local_storage()
            .map_err(|_| StorageError::Unavailable)?
            .ok_or(StorageError::Unavailable)
    }
}

impl KeyValueStorage for BrowserStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::local_storage()?
            .get_item(key)
            .map_err(|e| StorageError::Backend(format!("{:?}", e)))
    }

    fn set_batch(&self, entries: &[(&str, String)]) -> Result<(), StorageError> {
        let storage = Self::local_storage()?;
        for (key, value) in entries {
            storage
                .set_item(key, value)
                .map_err(|e| StorageError::Backend(format!("{:?}", e)))?;
        }
        Ok(())
    }

    fn remove_batch(&self, keys: &[&str]) -> Result<(), StorageError> {
        let storage = Self::local_storage()?;
        for key in keys {
            storage
                .remove_item(key)
                .map_err(|e| StorageError::Backend(format!("{:?}", e)))?;
        }
        Ok(())
    }
}
