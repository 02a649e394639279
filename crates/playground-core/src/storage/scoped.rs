//! Account-scoped, non-failing view over a `KeyValueStore`.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use super::{KeyValueStore, read_json, write_json};
use crate::session::AccountIdentity;

/// Keys that live inside an account's namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopedKey {
    UserId,
    Messages,
    History,
}

impl ScopedKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopedKey::UserId => "user_id",
            ScopedKey::Messages => "messages",
            ScopedKey::History => "history",
        }
    }
}

/// Write-through cache semantics over a durable store.
///
/// Reads fall back to a caller-supplied default, writes that the medium
/// rejects are dropped. Neither ever surfaces an error: the in-memory state
/// of the caller stays authoritative until the next successful write.
#[derive(Clone)]
pub struct ScopedStore {
    store: Arc<dyn KeyValueStore>,
    prefix: String,
    account: AccountIdentity,
}

impl ScopedStore {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        prefix: impl Into<String>,
        account: AccountIdentity,
    ) -> Self {
        Self {
            store,
            prefix: prefix.into(),
            account,
        }
    }

    pub fn account(&self) -> &AccountIdentity {
        &self.account
    }

    /// Full storage key, `prefix:email:key`.
    pub fn key(&self, key: ScopedKey) -> String {
        format!("{}:{}:{}", self.prefix, self.account.email(), key.as_str())
    }

    /// Reads `key`, returning `default` when absent or undecodable.
    pub fn get<T: DeserializeOwned>(&self, key: ScopedKey, default: T) -> T {
        self.get_or_else(key, || default)
    }

    pub fn get_or_else<T, F>(&self, key: ScopedKey, default: F) -> T
    where
        T: DeserializeOwned,
        F: FnOnce() -> T,
    {
        read_json(self.store.as_ref(), &self.key(key)).unwrap_or_else(default)
    }

    /// Writes `value` under `key`. Returns whether the write landed.
    pub fn set<T: Serialize + ?Sized>(&self, key: ScopedKey, value: &T) -> bool {
        let full_key = self.key(key);
        match write_json(self.store.as_ref(), &full_key, value) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(key = %full_key, error = %err, "dropping failed storage write");
                false
            }
        }
    }

    /// Removes `key`. Returns whether the removal landed.
    pub fn remove(&self, key: ScopedKey) -> bool {
        let full_key = self.key(key);
        match self.store.remove(&full_key) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(key = %full_key, error = %err, "failed to remove stored value");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_support::TestStore;

    fn scoped(store: Arc<TestStore>, email: &str) -> ScopedStore {
        ScopedStore::new(store, "playground", AccountIdentity::new(email))
    }

    #[test]
    fn test_key_is_namespaced_by_account() {
        let store = scoped(Arc::new(TestStore::default()), "admin@admin");
        assert_eq!(store.key(ScopedKey::Messages), "playground:admin@admin:messages");
        assert_eq!(store.key(ScopedKey::History), "playground:admin@admin:history");
        assert_eq!(store.key(ScopedKey::UserId), "playground:admin@admin:user_id");
    }

    #[test]
    fn test_accounts_do_not_see_each_other() {
        let backing = Arc::new(TestStore::default());
        let alice = scoped(backing.clone(), "admin@admin");
        let bob = scoped(backing, "admin1@admin");

        assert!(alice.set(ScopedKey::History, &vec!["alice".to_string()]));
        let seen: Vec<String> = bob.get(ScopedKey::History, Vec::new());
        assert!(seen.is_empty());
    }

    #[test]
    fn test_corrupt_value_falls_back_to_default() {
        let backing = Arc::new(TestStore::default());
        backing.put_raw("playground:guest:history", "not json at all");
        let store = scoped(backing, "guest");

        let history: Vec<String> = store.get(ScopedKey::History, vec!["default".to_string()]);
        assert_eq!(history, vec!["default".to_string()]);
    }

    #[test]
    fn test_failed_write_is_swallowed() {
        let backing = Arc::new(TestStore::failing_writes());
        let store = scoped(backing.clone(), "guest");

        assert!(!store.set(ScopedKey::History, &vec!["x".to_string()]));
        assert!(backing.raw("playground:guest:history").is_none());
    }
}
