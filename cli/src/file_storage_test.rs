use super::*;
use std::sync::Arc;

use campus_core::config::StorageKeys;
use campus_core::{SessionStore, UserInfo};
use serde_json::json;

fn storage_in(dir: &tempfile::TempDir) -> FileStorage {
    FileStorage::new(dir.path().join("state.json"))
}

// =============================================================
// KeyValueStorage
// =============================================================

#[test]
fn missing_file_reads_empty() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(storage_in(&dir).get_item("token"), None);
}

#[test]
fn set_then_get_persists_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage_in(&dir);
    storage.set_item("token", "jwt").unwrap();

    let reopened = FileStorage::new(storage.path());
    assert_eq!(reopened.get_item("token"), Some("jwt".to_owned()));
}

#[test]
fn keys_for_other_profiles_are_preserved() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage_in(&dir);
    storage.set_item("token", "consumer-jwt").unwrap();
    storage.set_item("admin_token", "admin-jwt").unwrap();
    storage.remove_item("token");

    assert_eq!(storage.get_item("token"), None);
    assert_eq!(storage.get_item("admin_token"), Some("admin-jwt".to_owned()));
}

#[test]
fn corrupt_file_reads_empty_and_is_replaced_on_write() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage_in(&dir);
    fs::write(storage.path(), "not json").unwrap();

    assert_eq!(storage.get_item("token"), None);
    storage.set_item("token", "jwt").unwrap();
    assert_eq!(storage.get_item("token"), Some("jwt".to_owned()));
}

#[test]
fn non_string_values_read_as_absent() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage_in(&dir);
    fs::write(storage.path(), r#"{"token": 42}"#).unwrap();
    assert_eq!(storage.get_item("token"), None);
}

#[test]
fn write_into_missing_directory_creates_it() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path().join("nested/deeper/state.json"));
    storage.set_item("token", "jwt").unwrap();
    assert_eq!(storage.get_item("token"), Some("jwt".to_owned()));
}

#[test]
fn write_failure_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    // A directory where the file should be makes the write fail.
    let path = dir.path().join("state.json");
    fs::create_dir(&path).unwrap();
    let storage = FileStorage::new(path);

    let result = storage.set_item("token", "jwt");
    assert!(matches!(result, Err(StorageError::Write { key, .. }) if key == "token"));
}

// =============================================================
// SessionStore over a state file
// =============================================================

#[test]
fn session_survives_process_restart() {
    let dir = tempfile::tempdir().unwrap();
    let keys = StorageKeys::new("admin_token", "admin_user_info");
    let user: UserInfo = json!({ "id": 1, "username": "admin" }).as_object().cloned().unwrap();

    let first = SessionStore::load(Arc::new(storage_in(&dir)), keys.clone());
    first.login("jwt", user.clone());

    let second = SessionStore::load(Arc::new(storage_in(&dir)), keys);
    assert_eq!(second.token(), "jwt");
    assert_eq!(second.user_info(), user);
}

#[test]
fn logout_clears_both_keys_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let keys = StorageKeys::new("token", "user");
    let store = SessionStore::load(Arc::new(storage_in(&dir)), keys.clone());
    store.login("jwt", UserInfo::new());
    store.logout();

    let storage = storage_in(&dir);
    assert_eq!(storage.get_item(&keys.token), None);
    assert_eq!(storage.get_item(&keys.user_info), None);
}
