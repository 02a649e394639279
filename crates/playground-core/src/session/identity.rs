//! Identity resolution.
//!
//! Derives the account from the stored login record and the durable
//! per-account user instance id, generating and persisting one on first use.

use rand::rngs::{OsRng, StdRng};
use rand::{Rng, RngCore, SeedableRng};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use super::record::{AccountIdentity, SessionRecord, UserInstanceId};
use crate::storage::{KeyValueStore, SESSION_RECORD_KEY, ScopedKey, ScopedStore, read_json};

/// Identity values of one mounted session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub account: AccountIdentity,
    pub user_id: UserInstanceId,
}

/// Resolves `AccountIdentity` and `UserInstanceId` once and caches them.
///
/// Both resolutions are idempotent: later calls return the cached values
/// even if the underlying storage changes.
pub struct IdentityResolver {
    store: Arc<dyn KeyValueStore>,
    prefix: String,
    account: OnceLock<AccountIdentity>,
    user_ids: Mutex<HashMap<AccountIdentity, UserInstanceId>>,
}

impl IdentityResolver {
    pub fn new(store: Arc<dyn KeyValueStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
            account: OnceLock::new(),
            user_ids: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the logged-in account, or the guest sentinel when no valid
    /// login record is stored.
    pub fn resolve_account(&self) -> AccountIdentity {
        self.account
            .get_or_init(|| {
                let record: Option<SessionRecord> =
                    read_json(self.store.as_ref(), SESSION_RECORD_KEY);
                match record {
                    Some(record) if !record.email.trim().is_empty() => {
                        tracing::debug!(email = %record.email, "resolved account from login record");
                        AccountIdentity::from(&record)
                    }
                    _ => {
                        tracing::debug!("no usable login record, using guest account");
                        AccountIdentity::guest()
                    }
                }
            })
            .clone()
    }

    /// Returns the durable user instance id for `account`, creating and
    /// persisting it if none is stored yet.
    pub fn resolve_user_instance_id(&self, account: &AccountIdentity) -> UserInstanceId {
        let mut cache = self.user_ids.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(id) = cache.get(account) {
            return id.clone();
        }

        let scoped = ScopedStore::new(self.store.clone(), self.prefix.clone(), account.clone());
        let stored: Option<UserInstanceId> = scoped.get(ScopedKey::UserId, None);
        let id = match stored {
            Some(id) if !id.as_str().is_empty() => id,
            _ => {
                let id = generate_user_instance_id();
                tracing::info!(account = %account, user_id = %id, "generated user instance id");
                // A dropped write only means the id is regenerated next session.
                scoped.set(ScopedKey::UserId, &id);
                id
            }
        };

        cache.insert(account.clone(), id.clone());
        id
    }

    /// Resolves both values for the current account.
    pub fn resolve(&self) -> SessionIdentity {
        let account = self.resolve_account();
        let user_id = self.resolve_user_instance_id(&account);
        SessionIdentity { account, user_id }
    }
}

/// Generates a random v4 UUID from the OS random source, falling back to a
/// time-seeded generator if the OS source is unavailable.
pub fn generate_user_instance_id() -> UserInstanceId {
    let mut bytes = [0u8; 16];
    match OsRng.try_fill_bytes(&mut bytes) {
        Ok(()) => {
            UserInstanceId::new(uuid::Builder::from_random_bytes(bytes).into_uuid().to_string())
        }
        Err(err) => {
            tracing::warn!(error = %err, "OS random source unavailable, using fallback id");
            fallback_user_instance_id()
        }
    }
}

fn fallback_user_instance_id() -> UserInstanceId {
    let now = chrono::Utc::now();
    let seed = now.timestamp_nanos_opt().unwrap_or_default() as u64;
    let noise: u64 = StdRng::seed_from_u64(seed).r#gen();
    UserInstanceId::new(format!("{:x}-{:016x}", now.timestamp_millis(), noise))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_support::TestStore;
    use crate::storage::write_json;

    fn resolver(store: Arc<TestStore>) -> IdentityResolver {
        IdentityResolver::new(store, "playground")
    }

    #[test]
    fn test_missing_record_resolves_to_guest() {
        let resolver = resolver(Arc::new(TestStore::default()));
        assert!(resolver.resolve_account().is_guest());
    }

    #[test]
    fn test_malformed_record_resolves_to_guest() {
        let store = Arc::new(TestStore::default());
        store.put_raw(SESSION_RECORD_KEY, "{\"role\": \"admin\"}");
        assert!(resolver(store).resolve_account().is_guest());
    }

    #[test]
    fn test_record_email_becomes_account() {
        let store = Arc::new(TestStore::default());
        let record = SessionRecord {
            email: "admin@admin".to_string(),
            role: "admin".to_string(),
        };
        write_json(store.as_ref(), SESSION_RECORD_KEY, &record).unwrap();

        let account = resolver(store).resolve_account();
        assert_eq!(account.email(), "admin@admin");
    }

    #[test]
    fn test_account_is_cached_after_first_resolution() {
        let store = Arc::new(TestStore::default());
        let resolver = resolver(store.clone());
        assert!(resolver.resolve_account().is_guest());

        store.put_raw(SESSION_RECORD_KEY, r#"{"email":"admin@admin","role":"admin"}"#);
        assert!(resolver.resolve_account().is_guest());
    }

    #[test]
    fn test_user_id_is_generated_once_and_persisted() {
        let store = Arc::new(TestStore::default());
        let account = AccountIdentity::new("admin@admin");

        let first = resolver(store.clone()).resolve_user_instance_id(&account);
        let raw = store.raw("playground:admin@admin:user_id").expect("persisted");
        assert_eq!(raw, format!("\"{}\"", first));

        // A new resolver (next session) reads the same id back.
        let second = resolver(store).resolve_user_instance_id(&account);
        assert_eq!(first, second);
    }

    #[test]
    fn test_user_ids_are_per_account() {
        let resolver = resolver(Arc::new(TestStore::default()));
        let a = resolver.resolve_user_instance_id(&AccountIdentity::new("admin@admin"));
        let b = resolver.resolve_user_instance_id(&AccountIdentity::new("admin1@admin"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_user_id_survives_dropped_write_within_session() {
        let resolver = resolver(Arc::new(TestStore::failing_writes()));
        let account = AccountIdentity::guest();
        let first = resolver.resolve_user_instance_id(&account);
        let second = resolver.resolve_user_instance_id(&account);
        assert_eq!(first, second);
    }

    #[test]
    fn test_generated_ids_are_uuids() {
        let id = generate_user_instance_id();
        assert!(uuid::Uuid::parse_str(id.as_str()).is_ok());
        assert_ne!(id, generate_user_instance_id());
    }

    #[test]
    fn test_fallback_ids_are_non_empty() {
        let id = fallback_user_instance_id();
        assert!(id.as_str().contains('-'));
    }
}
