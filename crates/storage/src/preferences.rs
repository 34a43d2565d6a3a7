//! Typed preferences over a named key-value store
//!
//! A preference value is one of a closed set of kinds (boolean, float,
//! integer, long, string, string set). [`PreferenceStore`] is the storage
//! seam: it only has to move [`PreferenceValue`]s in and out by name, the
//! typed accessors are derived from that.
//!
//! [`SharedPreference`] names a single preference together with its
//! default, and reads or writes it against any store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::kv::KvError;

/// Preference error types
#[derive(Debug, Error)]
pub enum PreferenceError {
    /// Underlying store error
    #[error("Storage error: {0}")]
    Storage(#[from] KvError),

    /// The stored value is not of the requested kind
    #[error("Preference '{name}' holds a {found} value, expected {expected}")]
    TypeMismatch {
        /// Preference name
        name: String,
        /// Kind requested by the caller
        expected: PreferenceKind,
        /// Kind found in the store
        found: PreferenceKind,
    },
}

/// Result type for preference operations
pub type Result<T> = std::result::Result<T, PreferenceError>;

/// Kind of a persisted preference value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreferenceKind {
    /// `bool`
    Bool,
    /// `f32`
    Float,
    /// `i32`
    Int,
    /// `i64`
    Long,
    /// `String`
    String,
    /// `BTreeSet<String>`
    StringSet,
}

impl fmt::Display for PreferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PreferenceKind::Bool => "boolean",
            PreferenceKind::Float => "float",
            PreferenceKind::Int => "integer",
            PreferenceKind::Long => "long",
            PreferenceKind::String => "string",
            PreferenceKind::StringSet => "string set",
        };
        f.write_str(name)
    }
}

/// A persisted preference value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum PreferenceValue {
    /// Boolean value
    Bool(bool),
    /// Float value
    Float(f32),
    /// Integer value
    Int(i32),
    /// Long value
    Long(i64),
    /// String value
    String(String),
    /// Set of strings
    StringSet(BTreeSet<String>),
}

impl PreferenceValue {
    /// Kind of this value
    pub fn kind(&self) -> PreferenceKind {
        match self {
            PreferenceValue::Bool(_) => PreferenceKind::Bool,
            PreferenceValue::Float(_) => PreferenceKind::Float,
            PreferenceValue::Int(_) => PreferenceKind::Int,
            PreferenceValue::Long(_) => PreferenceKind::Long,
            PreferenceValue::String(_) => PreferenceKind::String,
            PreferenceValue::StringSet(_) => PreferenceKind::StringSet,
        }
    }
}

/// Rust types that can be persisted as a preference
///
/// Implemented for exactly the six supported kinds, so storing anything
/// else is rejected at compile time.
pub trait PreferenceType: Clone {
    /// Kind this type maps to
    const KIND: PreferenceKind;

    /// Wrap into the tagged value
    fn into_value(self) -> PreferenceValue;

    /// Unwrap from the tagged value, handing it back on kind mismatch
    fn from_value(value: PreferenceValue) -> std::result::Result<Self, PreferenceValue>;
}

macro_rules! preference_type {
    ($ty:ty, $variant:ident) => {
        impl PreferenceType for $ty {
            const KIND: PreferenceKind = PreferenceKind::$variant;

            fn into_value(self) -> PreferenceValue {
                PreferenceValue::$variant(self)
            }

            fn from_value(value: PreferenceValue) -> std::result::Result<Self, PreferenceValue> {
                match value {
                    PreferenceValue::$variant(v) => Ok(v),
                    other => Err(other),
                }
            }
        }
    };
}

preference_type!(bool, Bool);
preference_type!(f32, Float);
preference_type!(i32, Int);
preference_type!(i64, Long);
preference_type!(String, String);
preference_type!(BTreeSet<String>, StringSet);

/// Read a typed preference, falling back to `default` when absent
fn read<T, S>(store: &S, name: &str, default: T) -> Result<T>
where
    T: PreferenceType,
    S: PreferenceStore + ?Sized,
{
    match store.get_value(name)? {
        None => Ok(default),
        Some(value) => T::from_value(value).map_err(|found| PreferenceError::TypeMismatch {
            name: name.to_string(),
            expected: T::KIND,
            found: found.kind(),
        }),
    }
}

/// Named key-value store for preference values
pub trait PreferenceStore {
    /// Get the raw value stored under `name`
    fn get_value(&self, name: &str) -> Result<Option<PreferenceValue>>;

    /// Store `value` under `name`
    fn put_value(&self, name: &str, value: PreferenceValue) -> Result<()>;

    /// Remove the value stored under `name`, returning whether it existed
    fn remove(&self, name: &str) -> Result<bool>;

    /// Check whether a value is stored under `name`
    fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.get_value(name)?.is_some())
    }

    /// Get a boolean preference
    fn get_bool(&self, name: &str, default: bool) -> Result<bool> {
        read(self, name, default)
    }

    /// Get a float preference
    fn get_float(&self, name: &str, default: f32) -> Result<f32> {
        read(self, name, default)
    }

    /// Get an integer preference
    fn get_int(&self, name: &str, default: i32) -> Result<i32> {
        read(self, name, default)
    }

    /// Get a long preference
    fn get_long(&self, name: &str, default: i64) -> Result<i64> {
        read(self, name, default)
    }

    /// Get a string preference
    fn get_string(&self, name: &str, default: &str) -> Result<String> {
        read(self, name, default.to_string())
    }

    /// Get a string set preference
    fn get_string_set(&self, name: &str, default: BTreeSet<String>) -> Result<BTreeSet<String>> {
        read(self, name, default)
    }

    /// Put a boolean preference
    fn put_bool(&self, name: &str, value: bool) -> Result<()> {
        self.put_value(name, PreferenceValue::Bool(value))
    }

    /// Put a float preference
    fn put_float(&self, name: &str, value: f32) -> Result<()> {
        self.put_value(name, PreferenceValue::Float(value))
    }

    /// Put an integer preference
    fn put_int(&self, name: &str, value: i32) -> Result<()> {
        self.put_value(name, PreferenceValue::Int(value))
    }

    /// Put a long preference
    fn put_long(&self, name: &str, value: i64) -> Result<()> {
        self.put_value(name, PreferenceValue::Long(value))
    }

    /// Put a string preference
    fn put_string(&self, name: &str, value: &str) -> Result<()> {
        self.put_value(name, PreferenceValue::String(value.to_string()))
    }

    /// Put a string set preference
    fn put_string_set(&self, name: &str, value: BTreeSet<String>) -> Result<()> {
        self.put_value(name, PreferenceValue::StringSet(value))
    }
}

type DefaultFn<T> = Arc<dyn Fn() -> T + Send + Sync>;

/// A named preference with a lazily computed default
///
/// ```
/// use storage::{KvStore, SharedPreference};
///
/// let store = KvStore::in_memory().unwrap();
/// let volume = SharedPreference::new("volume", 50);
///
/// assert_eq!(volume.get(&store).unwrap(), 50);
/// volume.set(&store, 80).unwrap();
/// assert_eq!(volume.get(&store).unwrap(), 80);
/// ```
#[derive(Clone)]
pub struct SharedPreference<T> {
    name: String,
    default: DefaultFn<T>,
}

impl<T> SharedPreference<T>
where
    T: PreferenceType + Send + Sync + 'static,
{
    /// Create a preference with a constant default
    pub fn new(name: impl Into<String>, default: T) -> Self {
        Self::with_default(name, move || default.clone())
    }
}

impl<T: PreferenceType> SharedPreference<T> {
    /// Create a preference whose default is computed on each miss
    pub fn with_default<F>(name: impl Into<String>, default: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self { name: name.into(), default: Arc::new(default) }
    }

    /// Store key of this preference
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read the preference from `store`
    pub fn get<S: PreferenceStore + ?Sized>(&self, store: &S) -> Result<T> {
        read(store, &self.name, (self.default)())
    }

    /// Write the preference to `store`
    pub fn set<S: PreferenceStore + ?Sized>(&self, store: &S, value: T) -> Result<()> {
        store.put_value(&self.name, value.into_value())
    }

    /// Bind this preference to a store handle
    pub fn bind<S: PreferenceStore + ?Sized>(self, store: Arc<S>) -> BoundPreference<T, S> {
        BoundPreference { store, preference: self }
    }
}

impl<T> fmt::Debug for SharedPreference<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedPreference").field("name", &self.name).finish_non_exhaustive()
    }
}

/// A [`SharedPreference`] that carries its own store
pub struct BoundPreference<T, S: ?Sized> {
    store: Arc<S>,
    preference: SharedPreference<T>,
}

impl<T: PreferenceType, S: PreferenceStore + ?Sized> BoundPreference<T, S> {
    /// Store key of this preference
    pub fn name(&self) -> &str {
        self.preference.name()
    }

    /// Read the preference
    pub fn get(&self) -> Result<T> {
        self.preference.get(self.store.as_ref())
    }

    /// Write the preference
    pub fn set(&self, value: T) -> Result<()> {
        self.preference.set(self.store.as_ref(), value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::KvStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn set_of(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_typed_defaults_when_missing() {
        let store = KvStore::in_memory().unwrap();

        assert!(store.get_bool("flag", true).unwrap());
        assert_eq!(store.get_float("ratio", 0.5).unwrap(), 0.5);
        assert_eq!(store.get_int("count", 3).unwrap(), 3);
        assert_eq!(store.get_long("stamp", 1 << 40).unwrap(), 1 << 40);
        assert_eq!(store.get_string("name", "none").unwrap(), "none");
        assert!(store.get_string_set("tags", BTreeSet::new()).unwrap().is_empty());
    }

    #[test]
    fn test_typed_round_trip() {
        let store = KvStore::in_memory().unwrap();

        store.put_bool("flag", false).unwrap();
        store.put_float("ratio", 1.25).unwrap();
        store.put_int("count", -8).unwrap();
        store.put_long("stamp", i64::MAX).unwrap();
        store.put_string("name", "julien").unwrap();
        store.put_string_set("tags", set_of(&["a", "b"])).unwrap();

        assert!(!store.get_bool("flag", true).unwrap());
        assert_eq!(store.get_float("ratio", 0.0).unwrap(), 1.25);
        assert_eq!(store.get_int("count", 0).unwrap(), -8);
        assert_eq!(store.get_long("stamp", 0).unwrap(), i64::MAX);
        assert_eq!(store.get_string("name", "").unwrap(), "julien");
        assert_eq!(store.get_string_set("tags", BTreeSet::new()).unwrap(), set_of(&["a", "b"]));
    }

    #[test]
    fn test_type_mismatch_is_an_error() {
        let store = KvStore::in_memory().unwrap();
        store.put_string("count", "seven").unwrap();

        match store.get_int("count", 0) {
            Err(PreferenceError::TypeMismatch { name, expected, found }) => {
                assert_eq!(name, "count");
                assert_eq!(expected, PreferenceKind::Int);
                assert_eq!(found, PreferenceKind::String);
            }
            other => panic!("expected type mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_type_mismatch_message() {
        let err = PreferenceError::TypeMismatch {
            name: "tags".to_string(),
            expected: PreferenceKind::StringSet,
            found: PreferenceKind::Long,
        };
        assert_eq!(err.to_string(), "Preference 'tags' holds a long value, expected string set");
    }

    #[test]
    fn test_value_serialization_is_tagged() {
        let json = serde_json::to_value(PreferenceValue::Int(4)).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "int", "value": 4 }));

        let parsed: PreferenceValue =
            serde_json::from_value(serde_json::json!({ "type": "stringSet", "value": ["x"] }))
                .unwrap();
        assert_eq!(parsed, PreferenceValue::StringSet(set_of(&["x"])));
    }

    #[test]
    fn test_shared_preference() {
        let store = KvStore::in_memory().unwrap();
        let pref = SharedPreference::new("username", "guest".to_string());

        assert_eq!(pref.name(), "username");
        assert_eq!(pref.get(&store).unwrap(), "guest");

        pref.set(&store, "alice".to_string()).unwrap();
        assert_eq!(pref.get(&store).unwrap(), "alice");
        assert_eq!(store.get_string("username", "").unwrap(), "alice");
    }

    #[test]
    fn test_lazy_default_evaluated_on_each_miss() {
        let store = KvStore::in_memory().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let pref = SharedPreference::with_default("limit", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            10_i64
        });

        assert_eq!(pref.get(&store).unwrap(), 10);
        assert_eq!(pref.get(&store).unwrap(), 10);
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        pref.set(&store, 42).unwrap();
        assert_eq!(pref.get(&store).unwrap(), 42);
        // The default is still computed before the store is consulted.
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_bound_preference() {
        let store = Arc::new(KvStore::in_memory().unwrap());
        let dark_mode = SharedPreference::new("dark_mode", false).bind(store.clone());

        assert_eq!(dark_mode.name(), "dark_mode");
        assert!(!dark_mode.get().unwrap());

        dark_mode.set(true).unwrap();
        assert!(dark_mode.get().unwrap());
        assert!(store.get_bool("dark_mode", false).unwrap());
    }

    #[test]
    fn test_bound_preference_through_trait_object() {
        let store: Arc<dyn PreferenceStore> = Arc::new(KvStore::in_memory().unwrap());
        let ratio = SharedPreference::new("ratio", 1.0_f32).bind(store);

        ratio.set(0.75).unwrap();
        assert_eq!(ratio.get().unwrap(), 0.75);
    }
}
