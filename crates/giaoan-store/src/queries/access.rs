//! The access-gate flag stored under `loggedIn`.

use crate::kv::{KeyValueStore, StoreError};

/// Store key holding the access flag.
pub const LOGGED_IN_KEY: &str = "loggedIn";

/// Value written when a login succeeds.
pub const LOGGED_IN_VALUE: &str = "yes";

/// Whether a login has been recorded.
pub fn is_logged_in<S: KeyValueStore + ?Sized>(store: &S) -> Result<bool, StoreError> {
    Ok(store.get(LOGGED_IN_KEY)?.as_deref() == Some(LOGGED_IN_VALUE))
}

/// Record a successful login.
pub fn set_logged_in<S: KeyValueStore + ?Sized>(store: &S) -> Result<(), StoreError> {
    store.set(LOGGED_IN_KEY, LOGGED_IN_VALUE)
}

/// Forget the recorded login.
pub fn clear_logged_in<S: KeyValueStore + ?Sized>(store: &S) -> Result<(), StoreError> {
    store.remove(LOGGED_IN_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;

    #[test]
    fn flag_lifecycle() {
        let store = MemoryStore::new();
        assert!(!is_logged_in(&store).unwrap());
        set_logged_in(&store).unwrap();
        assert!(is_logged_in(&store).unwrap());
        clear_logged_in(&store).unwrap();
        assert!(!is_logged_in(&store).unwrap());
    }

    #[test]
    fn other_values_do_not_count() {
        let store = MemoryStore::new();
        store.set(LOGGED_IN_KEY, "no").unwrap();
        assert!(!is_logged_in(&store).unwrap());
    }
}
