//! Storage layer for application settings
//!
//! This crate provides the key-value store that backs persisted
//! preferences, typed preference accessors on top of it, and the
//! parcel container used to capture transient object state.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod kv;
pub mod parcel;
pub mod preferences;

pub use kv::{Editor, KvConfig, KvError, KvStore};
pub use parcel::{parcelable_creator, Parcel, ParcelError, Parcelable, ParcelableCreator};
pub use preferences::{
    BoundPreference, PreferenceError, PreferenceKind, PreferenceStore, PreferenceType,
    PreferenceValue, SharedPreference,
};
