//! sled-backed settings store
//!
//! Each preference is one sled entry: the key is the preference name and
//! the value is the JSON encoding of its [`PreferenceValue`]. Grouped
//! changes go through an [`Editor`] and land in a single atomic batch.

use sled::Db;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

use crate::preferences::{self, PreferenceStore, PreferenceType, PreferenceValue};

/// Settings store error types
#[derive(Debug, Error)]
pub enum KvError {
    /// Sled database error
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    /// A stored entry is not a valid preference document
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for settings store operations
pub type Result<T> = std::result::Result<T, KvError>;

/// Settings store configuration
#[derive(Debug, Clone)]
pub struct KvConfig {
    /// Database directory
    pub path: String,
    /// Page cache size in bytes
    pub cache_capacity: u64,
    /// Compress pages on disk
    pub use_compression: bool,
    /// Background flush interval in milliseconds (None for explicit flushes only)
    pub flush_every_ms: Option<u64>,
}

impl Default for KvConfig {
    fn default() -> Self {
        Self {
            path: "preferences.db".to_string(),
            cache_capacity: 8 * 1024 * 1024, // 8MB
            use_compression: true,
            flush_every_ms: Some(500),
        }
    }
}

impl KvConfig {
    /// Default configuration at `path`
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), ..Default::default() }
    }

    /// Set the page cache size in bytes
    pub fn cache_capacity(mut self, bytes: u64) -> Self {
        self.cache_capacity = bytes;
        self
    }

    /// Enable or disable on-disk compression
    pub fn use_compression(mut self, enabled: bool) -> Self {
        self.use_compression = enabled;
        self
    }

    /// Set the background flush interval
    pub fn flush_every_ms(mut self, ms: Option<u64>) -> Self {
        self.flush_every_ms = ms;
        self
    }
}

/// Durable preference store
///
/// Cloning is cheap; clones share the same database.
#[derive(Clone)]
pub struct KvStore {
    db: Arc<Db>,
}

impl KvStore {
    /// Open (or create) the store described by `config`
    pub fn new(config: KvConfig) -> Result<Self> {
        let db = sled::Config::new()
            .path(&config.path)
            .cache_capacity(config.cache_capacity)
            .use_compression(config.use_compression)
            .flush_every_ms(config.flush_every_ms)
            .open()?;

        tracing::debug!(path = %config.path, entries = db.len(), "Opened preference store");

        Ok(Self { db: Arc::new(db) })
    }

    /// Create a temporary store that is discarded on drop (for testing)
    pub fn in_memory() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Read the preference stored under `name`
    pub fn read(&self, name: &str) -> Result<Option<PreferenceValue>> {
        self.db
            .get(name.as_bytes())?
            .map(|bytes| serde_json::from_slice(&bytes))
            .transpose()
            .map_err(KvError::from)
    }

    /// Store `value` under `name`
    pub fn write(&self, name: &str, value: &PreferenceValue) -> Result<()> {
        self.db.insert(name.as_bytes(), serde_json::to_vec(value)?)?;
        Ok(())
    }

    /// Delete the preference stored under `name`, returning whether it existed
    pub fn delete(&self, name: &str) -> Result<bool> {
        Ok(self.db.remove(name.as_bytes())?.is_some())
    }

    /// Whether a preference is stored under `name`
    pub fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.db.contains_key(name.as_bytes())?)
    }

    /// Names of all stored preferences starting with `prefix`, in order
    pub fn names_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for item in self.db.scan_prefix(prefix.as_bytes()) {
            let (key, _) = item?;
            match String::from_utf8(key.to_vec()) {
                Ok(name) => names.push(name),
                Err(_) => tracing::warn!("Skipping preference with a non UTF-8 name"),
            }
        }
        Ok(names)
    }

    /// Snapshot of every stored preference
    pub fn all(&self) -> Result<BTreeMap<String, PreferenceValue>> {
        let mut values = BTreeMap::new();
        for item in self.db.iter() {
            let (key, bytes) = item?;
            let Ok(name) = String::from_utf8(key.to_vec()) else {
                tracing::warn!("Skipping preference with a non UTF-8 name");
                continue;
            };
            values.insert(name, serde_json::from_slice(&bytes)?);
        }
        Ok(values)
    }

    /// Start a group of changes applied together by [`Editor::apply`]
    pub fn edit(&self) -> Editor<'_> {
        Editor { store: self, clear: false, pending: Vec::new() }
    }

    /// Delete every preference
    pub fn clear(&self) -> Result<()> {
        self.db.clear()?;
        Ok(())
    }

    /// Flush pending writes to disk
    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }

    /// Number of stored preferences
    pub fn len(&self) -> usize {
        self.db.len()
    }

    /// Whether no preference is stored
    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }
}

impl PreferenceStore for KvStore {
    fn get_value(&self, name: &str) -> preferences::Result<Option<PreferenceValue>> {
        Ok(self.read(name)?)
    }

    fn put_value(&self, name: &str, value: PreferenceValue) -> preferences::Result<()> {
        Ok(self.write(name, &value)?)
    }

    fn remove(&self, name: &str) -> preferences::Result<bool> {
        Ok(self.delete(name)?)
    }

    fn contains(&self, name: &str) -> preferences::Result<bool> {
        Ok(KvStore::contains(self, name)?)
    }
}

/// Pending changes to a [`KvStore`]
///
/// Nothing is visible until [`apply`](Editor::apply). A requested clear
/// runs before the puts and removes, whatever the call order, and lands
/// in the same batch as them.
#[must_use = "changes are discarded unless applied"]
pub struct Editor<'a> {
    store: &'a KvStore,
    clear: bool,
    pending: Vec<(String, Option<PreferenceValue>)>,
}

impl Editor<'_> {
    /// Set `name` to `value`
    pub fn put<T: PreferenceType>(mut self, name: impl Into<String>, value: T) -> Self {
        self.pending.push((name.into(), Some(value.into_value())));
        self
    }

    /// Delete `name`
    pub fn remove(mut self, name: impl Into<String>) -> Self {
        self.pending.push((name.into(), None));
        self
    }

    /// Delete every preference before the other changes are applied
    pub fn clear(mut self) -> Self {
        self.clear = true;
        self
    }

    /// Write the changes
    pub fn apply(self) -> Result<()> {
        let mut batch = sled::Batch::default();
        if self.clear {
            for key in self.store.db.iter().keys() {
                batch.remove(key?);
            }
        }
        // Later entries for a key replace earlier ones within a batch.
        for (name, value) in &self.pending {
            match value {
                Some(value) => batch.insert(name.as_bytes(), serde_json::to_vec(value)?),
                None => batch.remove(name.as_bytes()),
            }
        }

        self.store.db.apply_batch(batch)?;

        tracing::debug!(changes = self.pending.len(), cleared = self.clear, "Applied preference edits");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_new_store_is_empty() {
        let kv = KvStore::in_memory().unwrap();
        assert!(kv.is_empty());
        assert!(kv.all().unwrap().is_empty());
    }

    #[test]
    fn test_write_and_read() {
        let kv = KvStore::in_memory().unwrap();
        let tags: BTreeSet<String> = ["night", "quiet"].iter().map(|s| s.to_string()).collect();

        kv.write("tags", &PreferenceValue::StringSet(tags.clone())).unwrap();

        assert_eq!(kv.read("tags").unwrap(), Some(PreferenceValue::StringSet(tags)));
        assert_eq!(kv.read("missing").unwrap(), None);
    }

    #[test]
    fn test_delete() {
        let kv = KvStore::in_memory().unwrap();

        kv.write("theme", &PreferenceValue::String("dark".to_string())).unwrap();
        assert!(kv.contains("theme").unwrap());

        assert!(kv.delete("theme").unwrap());
        assert!(!kv.contains("theme").unwrap());
        assert!(!kv.delete("theme").unwrap());
    }

    #[test]
    fn test_corrupt_entry() {
        let kv = KvStore::in_memory().unwrap();
        kv.db.insert("broken", b"{not json".to_vec()).unwrap();

        assert!(matches!(kv.read("broken"), Err(KvError::Serialization(_))));
    }

    #[test]
    fn test_names_with_prefix_and_clear() {
        let kv = KvStore::in_memory().unwrap();

        kv.put_int("display.brightness", 40).unwrap();
        kv.put_int("display.contrast", 55).unwrap();
        kv.put_int("sound.volume", 3).unwrap();

        let names = kv.names_with_prefix("display.").unwrap();
        assert_eq!(names, vec!["display.brightness", "display.contrast"]);

        kv.clear().unwrap();
        assert!(kv.is_empty());
    }

    #[test]
    fn test_all_snapshot() {
        let kv = KvStore::in_memory().unwrap();
        kv.put_bool("wifi_only", true).unwrap();
        kv.put_long("last_sync", 1_700_000_000_000).unwrap();

        let all = kv.all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all["wifi_only"], PreferenceValue::Bool(true));
        assert_eq!(all["last_sync"], PreferenceValue::Long(1_700_000_000_000));
    }

    #[test]
    fn test_editor_applies_together() {
        let kv = KvStore::in_memory().unwrap();
        kv.put_string("stale", "x").unwrap();

        let editor = kv.edit().put("volume", 7).put("muted", false).remove("stale");
        assert!(kv.contains("stale").unwrap());
        assert!(!kv.contains("volume").unwrap());

        editor.apply().unwrap();
        assert_eq!(kv.get_int("volume", 0).unwrap(), 7);
        assert!(!kv.get_bool("muted", true).unwrap());
        assert!(!kv.contains("stale").unwrap());
    }

    #[test]
    fn test_editor_clear_runs_first() {
        let kv = KvStore::in_memory().unwrap();
        kv.put_int("a", 1).unwrap();
        kv.put_int("b", 2).unwrap();

        kv.edit().put("c", 3).clear().apply().unwrap();

        assert_eq!(kv.len(), 1);
        assert_eq!(kv.get_int("c", 0).unwrap(), 3);
    }

    #[test]
    fn test_editor_clear_and_rewrite_in_one_batch() {
        let kv = KvStore::in_memory().unwrap();
        kv.put_int("a", 1).unwrap();
        kv.put_int("b", 2).unwrap();

        let editor = kv.edit().clear().put("a", 5).remove("missing");
        assert_eq!(kv.len(), 2);
        editor.apply().unwrap();

        let all = kv.all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all["a"], PreferenceValue::Int(5));
    }

    #[test]
    fn test_preference_store_impl() {
        let kv = KvStore::in_memory().unwrap();

        kv.put_int("volume", 12).unwrap();
        assert_eq!(kv.get_int("volume", 0).unwrap(), 12);
        assert_eq!(kv.len(), 1);
        assert!(PreferenceStore::contains(&kv, "volume").unwrap());
        assert!(PreferenceStore::remove(&kv, "volume").unwrap());
        assert_eq!(kv.get_int("volume", 5).unwrap(), 5);
    }

    #[test]
    fn test_reopen_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.db");
        let config = KvConfig::new(path.to_string_lossy()).flush_every_ms(None);

        {
            let kv = KvStore::new(config.clone()).unwrap();
            kv.put_string("theme", "dark").unwrap();
            kv.flush().unwrap();
        }

        let kv = KvStore::new(config).unwrap();
        assert_eq!(kv.get_string("theme", "light").unwrap(), "dark");
    }

    #[test]
    fn test_config_builder() {
        let config = KvConfig::new("settings.db")
            .cache_capacity(1024)
            .use_compression(false)
            .flush_every_ms(Some(1000));

        assert_eq!(config.path, "settings.db");
        assert_eq!(config.cache_capacity, 1024);
        assert!(!config.use_compression);
        assert_eq!(config.flush_every_ms, Some(1000));
    }
}
