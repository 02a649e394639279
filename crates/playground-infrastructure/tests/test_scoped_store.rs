use playground_core::session::{AccountIdentity, IdentityResolver, Message};
use playground_core::storage::{KeyValueStore, SESSION_RECORD_KEY, ScopedKey, ScopedStore};
use playground_infrastructure::{JsonFileStore, MemoryStore};
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn test_scoped_logs_survive_reload() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("store.json");
    let account = AccountIdentity::new("admin@admin");

    {
        let store: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::open(&path));
        let scoped = ScopedStore::new(store, "playground", account.clone());
        assert!(scoped.set(ScopedKey::Messages, &vec![Message::greeting(), Message::user("hi")]));
        assert!(scoped.set(ScopedKey::History, &vec!["hi".to_string()]));
    }

    let store: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::open(&path));
    let scoped = ScopedStore::new(store, "playground", account);
    let messages: Vec<Message> = scoped.get(ScopedKey::Messages, Vec::new());
    let history: Vec<String> = scoped.get(ScopedKey::History, Vec::new());

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1], Message::user("hi"));
    assert_eq!(history, vec!["hi".to_string()]);
}

#[test]
fn test_write_over_quota_is_dropped_silently() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::with_capacity_bytes(128));
    let scoped = ScopedStore::new(store.clone(), "playground", AccountIdentity::guest());

    assert!(scoped.set(ScopedKey::History, &vec!["short".to_string()]));
    assert!(!scoped.set(ScopedKey::History, &vec!["x".repeat(512)]));

    // Previous value is still the one on record.
    let history: Vec<String> = scoped.get(ScopedKey::History, Vec::new());
    assert_eq!(history, vec!["short".to_string()]);
}

#[test]
fn test_identity_resolution_against_file_store() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("store.json");
    let store: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::open(&path));
    store
        .set(SESSION_RECORD_KEY, r#"{"email":"admin1@admin","role":"user"}"#)
        .unwrap();

    let first = IdentityResolver::new(store, "playground").resolve();
    assert_eq!(first.account.email(), "admin1@admin");

    let reopened: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::open(&path));
    let second = IdentityResolver::new(reopened, "playground").resolve();
    assert_eq!(first, second);
}
