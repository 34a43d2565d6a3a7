//! Settings controls bound to persisted preferences
//!
//! The main type is [`SeekBarPreference`]: a slider bound to a persisted
//! integer kept within `[min, max]`, with an optional value label.
//!
//! # Modules
//!
//! - [`attributes`] - Construction-time configuration
//! - [`format`] - printf-style rendering of the value label
//! - [`slider`] - Slider widget model and key events
//! - [`seek_bar`] - The preference state machine
//! - [`state`] - Instance state captured across reconstruction

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod attributes;
pub mod format;
pub mod seek_bar;
pub mod slider;
pub mod state;

pub use attributes::SeekBarAttributes;
pub use format::format_value;
pub use seek_bar::{Result, SeekBarError, SeekBarPreference};
pub use slider::{KeyAction, KeyCode, KeyEvent, SeekBar};
pub use state::SavedState;
