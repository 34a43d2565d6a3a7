//! List reconciliation for displayed collections
//!
//! This crate diffs successive snapshots of a list and replays the
//! resulting edit script against whatever displays the list, so that
//! unchanged rows keep their state and only real edits are notified.
//!
//! # Modules
//!
//! - [`diff`] - Myers-based edit scripts between two lists
//! - [`auto_notify`] - Observed assignment that diffs on every set
//! - [`adapter`] - Holder/adapter scaffolding for list views

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapter;
pub mod auto_notify;
pub mod diff;

pub use adapter::{Bind, RecyclerAdapter, RecyclerHolder};
pub use auto_notify::AutoNotify;
pub use diff::{
    calculate_diff, diff, DiffCallback, DiffItem, DiffResult, EditOp, ListUpdateCallback,
    SliceDiffCallback,
};
