//! Preference Integration Tests
//!
//! End-to-end tests of the seek bar preference over an on-disk store.

use std::sync::Arc;

use preference::{KeyCode, KeyEvent, SeekBarAttributes, SeekBarPreference};
use storage::{KvConfig, KvStore, Parcelable, PreferenceStore, SharedPreference};
use tempfile::TempDir;

fn open(dir: &TempDir) -> Arc<KvStore> {
    let path = dir.path().join("settings.db");
    let config = KvConfig::new(path.to_string_lossy()).flush_every_ms(None);
    Arc::new(KvStore::new(config).unwrap())
}

fn brightness() -> SeekBarAttributes {
    SeekBarAttributes::new("brightness").range(10, 90).increment(5).default_value(50)
}

/// A committed value survives reopening the store
#[test]
fn test_value_survives_restart() {
    let temp_dir = TempDir::new().unwrap();

    // Phase 1: first launch picks the default, the user steps it up
    {
        let store = open(&temp_dir);
        let mut pref = SeekBarPreference::new(brightness(), store.clone());
        pref.on_attached().unwrap();
        pref.bind();
        assert_eq!(pref.value(), 50);
        assert_eq!(pref.label(), Some("50"));

        assert!(pref.on_key(KeyEvent::down(KeyCode::DpadRight)).unwrap());
        assert!(pref.on_key(KeyEvent::down(KeyCode::DpadRight)).unwrap());
        assert_eq!(pref.value(), 60);
        store.flush().unwrap();
    }

    // Phase 2: relaunch reads the persisted value back
    {
        let store = open(&temp_dir);
        let mut pref = SeekBarPreference::new(brightness(), store.clone());
        pref.on_attached().unwrap();
        assert_eq!(pref.value(), 60);

        let handle = SharedPreference::new("brightness", 0);
        assert_eq!(handle.get(store.as_ref()).unwrap(), 60);
    }
}

/// Narrowing the configured range clamps the stored value on load
#[test]
fn test_range_change_between_launches() {
    let temp_dir = TempDir::new().unwrap();

    {
        let store = open(&temp_dir);
        store.put_int("brightness", 85).unwrap();
        store.flush().unwrap();
    }

    let store = open(&temp_dir);
    let attrs = brightness().range(10, 40);
    let mut pref = SeekBarPreference::new(attrs, store.clone());
    pref.on_attached().unwrap();

    assert_eq!(pref.value(), 40);
    assert_eq!(store.get_int("brightness", 0).unwrap(), 40);
}

/// A drag only reaches the store once the finger lifts
#[test]
fn test_drag_persists_on_release() {
    let temp_dir = TempDir::new().unwrap();
    let store = open(&temp_dir);
    let mut pref = SeekBarPreference::new(brightness(), store.clone());
    pref.on_attached().unwrap();
    pref.bind();

    pref.start_tracking_touch();
    pref.drag_to(0).unwrap();
    pref.drag_to(70).unwrap();
    assert_eq!(pref.label(), Some("80"));
    assert_eq!(pref.value(), 50);
    assert_eq!(store.get_int("brightness", 0).unwrap(), 50);

    pref.stop_tracking_touch().unwrap();
    assert_eq!(store.get_int("brightness", 0).unwrap(), 80);
}

/// A vetoed change leaves both the store and the slider untouched
#[test]
fn test_listener_veto_keeps_store() {
    let temp_dir = TempDir::new().unwrap();
    let store = open(&temp_dir);
    store.put_int("brightness", 30).unwrap();

    let mut pref = SeekBarPreference::new(brightness(), store.clone());
    pref.on_attached().unwrap();
    pref.set_on_preference_change(|v| v <= 60);
    pref.bind();

    pref.drag_to(70).unwrap();
    assert_eq!(pref.value(), 30);
    assert_eq!(pref.slider().map(|s| s.progress()), Some(20));
    assert_eq!(store.get_int("brightness", 0).unwrap(), 30);

    pref.drag_to(45).unwrap();
    assert_eq!(store.get_int("brightness", 0).unwrap(), 55);
}

/// Non-persistent preferences carry their state through a parcel instead
#[test]
fn test_instance_state_through_parcel() {
    let temp_dir = TempDir::new().unwrap();
    let store = open(&temp_dir);
    let attrs = brightness().persistent(false);

    let mut pref = SeekBarPreference::new(attrs.clone(), store.clone());
    pref.on_attached().unwrap();
    pref.set_min(0).unwrap();
    pref.set_value(5).unwrap();
    let parcel = pref.on_save_instance_state().unwrap().to_parcel();

    let mut rebuilt = SeekBarPreference::new(attrs, store.clone());
    rebuilt.bind();
    let mut parcel = storage::Parcel::from_bytes(parcel.into_bytes());
    rebuilt.restore_from_parcel(&mut parcel).unwrap();

    assert_eq!((rebuilt.value(), rebuilt.min(), rebuilt.max()), (5, 0, 90));
    assert_eq!(rebuilt.label(), Some("5"));
    assert!(store.is_empty());
}
