//! The model API key stored under `geminiApiKey`.

use crate::kv::{KeyValueStore, StoreError};

/// Store key holding the API key.
pub const API_KEY_KEY: &str = "geminiApiKey";

/// Read the stored API key. Blank values count as absent.
pub fn get_api_key<S: KeyValueStore + ?Sized>(store: &S) -> Result<Option<String>, StoreError> {
    Ok(store
        .get(API_KEY_KEY)?
        .map(|k| k.trim().to_owned())
        .filter(|k| !k.is_empty()))
}

/// Store an API key (trimmed). Returns `false` and stores nothing when the
/// key is blank.
pub fn set_api_key<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Result<bool, StoreError> {
    let key = key.trim();
    if key.is_empty() {
        return Ok(false);
    }
    store.set(API_KEY_KEY, key)?;
    Ok(true)
}

/// Remove the stored API key.
pub fn clear_api_key<S: KeyValueStore + ?Sized>(store: &S) -> Result<(), StoreError> {
    store.remove(API_KEY_KEY)
}
