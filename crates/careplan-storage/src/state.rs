use serde::{de::DeserializeOwned, Serialize};

use crate::client::LocalStore;
use crate::error::StorageError;
use crate::objects;

/// Load a JSON document from the store.
pub fn load_state<T: DeserializeOwned>(store: &LocalStore, key: &str) -> Result<T, StorageError> {
    let output = objects::get_object(store, key)?;
    let value: T = serde_json::from_slice(&output.body)?;
    Ok(value)
}

/// Load a JSON document, returning `T::default()` when the key is absent.
pub fn load_state_or_default<T: DeserializeOwned + Default>(
    store: &LocalStore,
    key: &str,
) -> Result<T, StorageError> {
    match load_state(store, key) {
        Ok(value) => Ok(value),
        Err(StorageError::NotFound { .. }) => Ok(T::default()),
        Err(e) => Err(e),
    }
}

/// Save a JSON document, replacing whatever was stored under `key`.
pub fn save_state<T: Serialize + ?Sized>(
    store: &LocalStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let body = serde_json::to_vec_pretty(value)?;
    objects::put_object(store, key, &body)
}
