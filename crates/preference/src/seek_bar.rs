//! Seek bar preference
//!
//! [`SeekBarPreference`] keeps an integer `value` within `[min, max]` and
//! mirrors it onto a bound [`SeekBar`] whose progress is `value - min`.
//! The committed value is written to a [`PreferenceStore`] whenever it
//! changes, unless the preference is not persistent.
//!
//! While the user drags the thumb only the label follows; the value is
//! committed once tracking stops. Taps and key presses commit right away.
//! Every commit from the user is first offered to the change listener,
//! which may veto it.

use std::sync::Arc;

use storage::{Parcel, ParcelError, PreferenceError, PreferenceStore};
use thiserror::Error;

use crate::attributes::SeekBarAttributes;
use crate::format::format_value;
use crate::slider::{KeyAction, KeyCode, KeyEvent, SeekBar};
use crate::state::SavedState;

/// Seek bar preference errors
#[derive(Debug, Error)]
pub enum SeekBarError {
    /// Backing store failed or held a value of another type
    #[error("Preference error: {0}")]
    Preference(#[from] PreferenceError),

    /// Saved state could not be read
    #[error("Saved state error: {0}")]
    Parcel(#[from] ParcelError),
}

/// Result type for seek bar operations
pub type Result<T> = std::result::Result<T, SeekBarError>;

type ChangeListener = Box<dyn FnMut(i32) -> bool>;
type ChangedHook = Box<dyn FnMut()>;

/// Slider preference bound to a persisted integer
pub struct SeekBarPreference {
    key: String,
    store: Arc<dyn PreferenceStore>,
    persistent: bool,
    enabled: bool,
    default_value: Option<i32>,

    value: i32,
    min: i32,
    max: i32,
    increment: i32,
    adjustable: bool,
    show_value: bool,
    format: String,

    tracking_touch: bool,
    slider: Option<SeekBar>,
    label: Option<String>,

    change_listener: Option<ChangeListener>,
    changed_hook: Option<ChangedHook>,
}

impl SeekBarPreference {
    /// Create an unbound preference from `attrs`, backed by `store`
    ///
    /// Nothing is read from the store until [`on_attached`](Self::on_attached).
    pub fn new(attrs: SeekBarAttributes, store: Arc<dyn PreferenceStore>) -> Self {
        let min = attrs.min;
        let max = attrs.max.max(min);
        let span = max.saturating_sub(min);

        Self {
            key: attrs.key,
            store,
            persistent: attrs.persistent,
            enabled: attrs.enabled,
            default_value: attrs.default_value,
            value: 0_i32.clamp(min, max),
            min,
            max,
            increment: attrs.increment.saturating_abs().min(span),
            adjustable: attrs.adjustable,
            show_value: attrs.show_value,
            format: attrs.format,
            tracking_touch: false,
            slider: None,
            label: None,
            change_listener: None,
            changed_hook: None,
        }
    }

    /// Store key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Committed value
    pub fn value(&self) -> i32 {
        self.value
    }

    /// Lower bound
    pub fn min(&self) -> i32 {
        self.min
    }

    /// Upper bound
    pub fn max(&self) -> i32 {
        self.max
    }

    /// Key step; 0 until a slider supplies its default
    pub fn increment(&self) -> i32 {
        self.increment
    }

    /// Whether arrow keys adjust the value
    pub fn is_adjustable(&self) -> bool {
        self.adjustable
    }

    /// Whether the value label is shown
    pub fn shows_value(&self) -> bool {
        self.show_value
    }

    /// Label template
    pub fn format(&self) -> &str {
        &self.format
    }

    /// Whether committed values are written to the store
    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    /// Whether the control accepts input
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether a drag is in progress
    pub fn is_tracking_touch(&self) -> bool {
        self.tracking_touch
    }

    /// Bound slider, if any
    pub fn slider(&self) -> Option<&SeekBar> {
        self.slider.as_ref()
    }

    /// Displayed label, if bound with `show_value`
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Register the listener consulted before a user change is committed
    ///
    /// Returning `false` vetoes the change and restores the slider.
    pub fn set_on_preference_change<F>(&mut self, listener: F)
    where
        F: FnMut(i32) -> bool + 'static,
    {
        self.change_listener = Some(Box::new(listener));
    }

    /// Register the hook run whenever the displayed state must be refreshed
    pub fn set_on_changed<F>(&mut self, hook: F)
    where
        F: FnMut() + 'static,
    {
        self.changed_hook = Some(Box::new(hook));
    }

    /// Set the value, clamped into `[min, max]`
    ///
    /// A value equal to the current one after clamping does nothing, so
    /// the store is not rewritten.
    pub fn set_value(&mut self, value: i32) -> Result<()> {
        self.set_value_internal(value, true)
    }

    /// Set the lower bound, raising `max` if needed and re-clamping the value
    pub fn set_min(&mut self, min: i32) -> Result<()> {
        if min == self.min {
            return Ok(());
        }
        self.min = min;
        if self.max < min {
            self.max = min;
        }
        self.on_range_changed()
    }

    /// Set the upper bound, lowering `min` if needed and re-clamping the value
    pub fn set_max(&mut self, max: i32) -> Result<()> {
        if max == self.max {
            return Ok(());
        }
        self.max = max;
        if self.min > max {
            self.min = max;
        }
        self.on_range_changed()
    }

    /// Set the key step, taken by magnitude and capped to `max - min`
    pub fn set_increment(&mut self, increment: i32) {
        let increment = increment.saturating_abs().min(self.span());
        if increment != self.increment {
            self.increment = increment;
            self.notify_changed();
        }
    }

    /// Set whether arrow keys adjust the value
    pub fn set_adjustable(&mut self, adjustable: bool) {
        self.adjustable = adjustable;
    }

    /// Show or hide the value label
    pub fn set_show_value(&mut self, show_value: bool) {
        if show_value != self.show_value {
            self.show_value = show_value;
            if self.slider.is_some() {
                self.label = show_value.then(|| format_value(&self.format, self.value));
            }
            self.notify_changed();
        }
    }

    /// Change the label template
    pub fn set_format(&mut self, format: impl Into<String>) {
        let format = format.into();
        if format != self.format {
            self.format = format;
            self.notify_changed();
        }
    }

    /// Enable or disable input
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled != self.enabled {
            self.enabled = enabled;
            self.notify_changed();
        }
    }

    /// Load the initial value once the preference joins a hierarchy
    ///
    /// Reads the persisted integer, falling back to the configured default
    /// or 0, and applies it through [`set_value`](Self::set_value). An
    /// out-of-range persisted value is clamped and written back.
    pub fn on_attached(&mut self) -> Result<()> {
        self.on_set_initial_value(self.default_value)
    }

    /// Apply the persisted value, or `default` when nothing is stored
    pub fn on_set_initial_value(&mut self, default: Option<i32>) -> Result<()> {
        let fallback = default.unwrap_or(0);
        let initial = if self.should_persist() {
            self.store.get_int(&self.key, fallback)?
        } else {
            fallback
        };

        tracing::debug!(key = %self.key, initial, "Loading seek bar value");
        self.set_value(initial)
    }

    /// Create the slider and label for display
    pub fn bind(&mut self) {
        let span = self.span();
        let mut slider = SeekBar::new(span);

        if self.increment != 0 {
            slider.set_key_progress_increment(self.increment);
        } else {
            self.increment = slider.key_progress_increment().min(span);
        }
        slider.set_progress(self.progress_of(self.value));
        slider.set_enabled(self.enabled);

        self.slider = Some(slider);
        self.label = self.show_value.then(|| format_value(&self.format, self.value));
        self.tracking_touch = false;
    }

    /// Drop the slider and label
    pub fn unbind(&mut self) {
        self.slider = None;
        self.label = None;
        self.tracking_touch = false;
    }

    /// The user put a finger on the thumb
    pub fn start_tracking_touch(&mut self) {
        self.tracking_touch = true;
    }

    /// The user lifted the finger; commits the dragged value
    pub fn stop_tracking_touch(&mut self) -> Result<()> {
        self.tracking_touch = false;

        let Some(progress) = self.slider.as_ref().map(SeekBar::progress) else {
            return Ok(());
        };
        if self.value_at(progress) != self.value {
            self.sync_value_internal()?;
        }
        Ok(())
    }

    /// The user moved the thumb to `progress`
    ///
    /// Ignored while unbound or disabled.
    pub fn drag_to(&mut self, progress: i32) -> Result<()> {
        let moved = match self.slider.as_mut() {
            Some(slider) if slider.is_enabled() => slider.set_progress(progress),
            _ => false,
        };
        if !moved {
            return Ok(());
        }

        let progress = self.slider.as_ref().map_or(progress, SeekBar::progress);
        self.on_progress_changed(progress, true)
    }

    /// Deliver a key event to the focused preference
    ///
    /// Returns whether the event was consumed. Arrow keys are ignored when
    /// the preference is not adjustable; confirm keys are never consumed.
    pub fn on_key(&mut self, event: KeyEvent) -> Result<bool> {
        if event.action != KeyAction::Down {
            return Ok(false);
        }

        match event.code {
            KeyCode::DpadLeft | KeyCode::DpadRight if !self.adjustable => return Ok(false),
            KeyCode::DpadCenter | KeyCode::Enter => return Ok(false),
            _ => {}
        }

        let Some(slider) = self.slider.as_mut() else {
            tracing::error!(
                key = %self.key,
                "SeekBar view is not initialized and hence cannot be adjusted"
            );
            return Ok(false);
        };

        match slider.on_key_down(event.code) {
            Some(progress) => {
                self.on_progress_changed(progress, true)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Capture state worth keeping across reconstruction
    ///
    /// Persistent preferences return `None`: their value lives in the store.
    pub fn on_save_instance_state(&self) -> Option<SavedState> {
        if self.should_persist() {
            return None;
        }
        Some(SavedState { value: self.value, min: self.min, max: self.max })
    }

    /// Restore a snapshot verbatim
    pub fn on_restore_instance_state(&mut self, state: SavedState) {
        self.value = state.value;
        self.min = state.min;
        self.max = state.max;
        self.increment = self.increment.min(self.span());
        self.notify_changed();
    }

    /// Restore a snapshot written to `parcel`
    pub fn restore_from_parcel(&mut self, parcel: &mut Parcel) -> Result<()> {
        let state = SavedState::creator().create_from_parcel(parcel)?;
        self.on_restore_instance_state(state);
        Ok(())
    }

    fn on_progress_changed(&mut self, progress: i32, from_user: bool) -> Result<()> {
        tracing::trace!(key = %self.key, progress, from_user, tracking = self.tracking_touch, "Seek bar progress");
        if from_user && !self.tracking_touch {
            self.sync_value_internal()?;
        }

        // The listener may have reset the slider
        let shown = self.slider.as_ref().map_or(progress, SeekBar::progress);
        self.sync_label(self.value_at(shown));
        Ok(())
    }

    /// Commit the slider position, subject to the change listener
    fn sync_value_internal(&mut self) -> Result<()> {
        let Some(progress) = self.slider.as_ref().map(SeekBar::progress) else {
            return Ok(());
        };

        let candidate = self.value_at(progress);
        if candidate == self.value {
            return Ok(());
        }

        if self.call_change_listener(candidate) {
            self.set_value_internal(candidate, false)
        } else {
            tracing::debug!(key = %self.key, candidate, "Seek bar change rejected");
            let committed = self.progress_of(self.value);
            if let Some(slider) = self.slider.as_mut() {
                slider.set_progress(committed);
            }
            self.sync_label(self.value);
            Ok(())
        }
    }

    fn set_value_internal(&mut self, value: i32, notify: bool) -> Result<()> {
        let value = self.clamp_value(value);
        if value == self.value {
            return Ok(());
        }

        self.value = value;
        self.sync_label(value);
        let progress = self.progress_of(value);
        if let Some(slider) = self.slider.as_mut() {
            slider.set_progress(progress);
        }

        self.persist_int(value)?;
        if notify {
            self.notify_changed();
        }
        Ok(())
    }

    fn on_range_changed(&mut self) -> Result<()> {
        self.increment = self.increment.min(self.span());
        self.set_value_internal(self.value, false)?;
        self.notify_changed();
        Ok(())
    }

    fn call_change_listener(&mut self, value: i32) -> bool {
        match self.change_listener.as_mut() {
            Some(listener) => listener(value),
            None => true,
        }
    }

    fn persist_int(&self, value: i32) -> Result<()> {
        if self.should_persist() {
            self.store.put_int(&self.key, value)?;
        }
        Ok(())
    }

    fn should_persist(&self) -> bool {
        self.persistent && !self.key.is_empty()
    }

    /// Refresh the bound views and tell dependents
    fn notify_changed(&mut self) {
        let span = self.span();
        let progress = self.progress_of(self.value);
        if let Some(slider) = self.slider.as_mut() {
            slider.set_max(span);
            if self.increment != 0 {
                slider.set_key_progress_increment(self.increment);
            }
            slider.set_progress(progress);
            slider.set_enabled(self.enabled);
        }
        self.sync_label(self.value);

        if let Some(hook) = self.changed_hook.as_mut() {
            hook();
        }
    }

    fn sync_label(&mut self, value: i32) {
        if let Some(label) = self.label.as_mut() {
            *label = format_value(&self.format, value);
        }
    }

    fn span(&self) -> i32 {
        self.max.saturating_sub(self.min).max(0)
    }

    fn progress_of(&self, value: i32) -> i32 {
        value.saturating_sub(self.min)
    }

    fn value_at(&self, progress: i32) -> i32 {
        self.clamp_value(self.min.saturating_add(progress))
    }

    fn clamp_value(&self, value: i32) -> i32 {
        value.clamp(self.min, self.max.max(self.min))
    }
}

impl std::fmt::Debug for SeekBarPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeekBarPreference")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("increment", &self.increment)
            .field("persistent", &self.persistent)
            .field("enabled", &self.enabled)
            .field("bound", &self.slider.is_some())
            .finish()
    }
}
