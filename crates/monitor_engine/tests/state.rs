use std::fs;

use monitor_core::{EndpointSet, TargetKey};
use monitor_engine::{StateStore, STATE_DIR_NAME};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn set(items: &[&str]) -> EndpointSet {
    items.iter().copied().collect()
}

fn key() -> TargetKey {
    TargetKey::from_hostname("example.com")
}

#[test]
fn record_lives_under_latest_endpoints() {
    let temp = TempDir::new().unwrap();
    let store = StateStore::new(temp.path());
    assert_eq!(
        store.record_path(&key()),
        temp.path().join(STATE_DIR_NAME).join("example-com.txt")
    );
}

#[test]
fn missing_record_loads_as_empty() {
    let temp = TempDir::new().unwrap();
    let store = StateStore::new(temp.path());
    assert!(store.load(&key()).is_empty());
}

#[test]
fn empty_and_corrupt_records_load_as_empty() {
    let temp = TempDir::new().unwrap();
    let store = StateStore::new(temp.path());
    let path = store.record_path(&key());
    fs::create_dir_all(path.parent().unwrap()).unwrap();

    fs::write(&path, "").unwrap();
    assert!(store.load(&key()).is_empty());

    fs::write(&path, b"\xff\xfe\x00garbage").unwrap();
    assert!(store.load(&key()).is_empty());
}

#[test]
fn persist_writes_flat_sorted_record() {
    let temp = TempDir::new().unwrap();
    let store = StateStore::new(temp.path());

    let stored = store
        .persist(&key(), &EndpointSet::new(), &set(&["/a/c", "/a/b.js"]))
        .unwrap();
    assert_eq!(stored, set(&["/a/b.js", "/a/c"]));
    assert_eq!(
        fs::read_to_string(store.record_path(&key())).unwrap(),
        "/a/b.js\n/a/c\n"
    );
}

#[test]
fn persisted_state_is_superset_of_old_and_new() {
    let temp = TempDir::new().unwrap();
    let store = StateStore::new(temp.path());
    let old = set(&["/a/b.js", "/a/c"]);
    let new = set(&["/a/c", "/a/d"]);

    store.persist(&key(), &EndpointSet::new(), &old).unwrap();
    store.persist(&key(), &old, &new).unwrap();

    let loaded = store.load(&key());
    assert!(loaded.is_superset(&old));
    assert!(loaded.is_superset(&new));
    assert_eq!(loaded, set(&["/a/b.js", "/a/c", "/a/d"]));
}

#[test]
fn persisting_an_empty_diff_keeps_the_record() {
    let temp = TempDir::new().unwrap();
    let store = StateStore::new(temp.path());
    let old = set(&["/x", "/y"]);
    store.persist(&key(), &EndpointSet::new(), &old).unwrap();

    let loaded = store.load(&key());
    store.persist(&key(), &loaded, &set(&["/x"])).unwrap();
    store.persist(&key(), &loaded, &EndpointSet::new()).unwrap();
    assert_eq!(store.load(&key()), old);
}

#[test]
fn keys_do_not_share_records() {
    let temp = TempDir::new().unwrap();
    let store = StateStore::new(temp.path());
    let other = TargetKey::from_hostname("api.example.org");
    store.persist(&key(), &EndpointSet::new(), &set(&["/a"])).unwrap();
    store.persist(&other, &EndpointSet::new(), &set(&["/b"])).unwrap();
    assert_eq!(store.load(&key()), set(&["/a"]));
    assert_eq!(store.load(&other), set(&["/b"]));
}

#[test]
fn write_failure_is_reported_and_old_record_survives() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("blocked");
    fs::write(&blocker, "not a directory").unwrap();
    let store = StateStore::at(blocker.join("latest"));

    let result = store.persist(&key(), &EndpointSet::new(), &set(&["/a"]));
    assert!(result.is_err());
    assert!(store.load(&key()).is_empty());
}
