//! Slider widget model
//!
//! [`SeekBar`] holds what the preference needs from a platform slider:
//! a progress in `[0, max]`, a key step and an enabled flag.

/// Key identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    /// Left arrow
    DpadLeft,
    /// Right arrow
    DpadRight,
    /// Directional pad center
    DpadCenter,
    /// Enter
    Enter,
    /// Any other key, by platform code
    Other(u32),
}

/// Key transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Pressed
    Down,
    /// Released
    Up,
}

/// Key event delivered to a focused control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Transition
    pub action: KeyAction,
    /// Key
    pub code: KeyCode,
}

impl KeyEvent {
    /// Key press
    pub fn down(code: KeyCode) -> Self {
        Self { action: KeyAction::Down, code }
    }

    /// Key release
    pub fn up(code: KeyCode) -> Self {
        Self { action: KeyAction::Up, code }
    }
}

/// Slider with a progress in `[0, max]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeekBar {
    progress: i32,
    max: i32,
    key_progress_increment: i32,
    enabled: bool,
}

impl SeekBar {
    /// Slider spanning `[0, max]` at progress 0
    pub fn new(max: i32) -> Self {
        let max = max.max(0);
        Self {
            progress: 0,
            max,
            key_progress_increment: default_key_increment(max),
            enabled: true,
        }
    }

    /// Current progress
    pub fn progress(&self) -> i32 {
        self.progress
    }

    /// Move to `progress`, clamped into `[0, max]`; returns whether it moved
    pub fn set_progress(&mut self, progress: i32) -> bool {
        let progress = progress.clamp(0, self.max);
        if progress == self.progress {
            return false;
        }
        self.progress = progress;
        true
    }

    /// Upper bound of the progress
    pub fn max(&self) -> i32 {
        self.max
    }

    /// Change the upper bound, pulling the progress back in range
    ///
    /// The key step is recomputed when it is unset or too fine for the
    /// new range.
    pub fn set_max(&mut self, max: i32) {
        self.max = max.max(0);
        if self.key_progress_increment == 0 || self.max / self.key_progress_increment > 20 {
            self.key_progress_increment = default_key_increment(self.max);
        }
        self.progress = self.progress.clamp(0, self.max);
    }

    /// Step applied by arrow keys
    pub fn key_progress_increment(&self) -> i32 {
        self.key_progress_increment
    }

    /// Set the arrow key step; negative steps are taken by magnitude
    pub fn set_key_progress_increment(&mut self, increment: i32) {
        self.key_progress_increment = increment.saturating_abs();
    }

    /// Whether the slider reacts to input
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable input
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Apply a key press; returns the new progress if the key moved it
    pub fn on_key_down(&mut self, code: KeyCode) -> Option<i32> {
        if !self.enabled {
            return None;
        }

        let delta = match code {
            KeyCode::DpadLeft => self.key_progress_increment.saturating_neg(),
            KeyCode::DpadRight => self.key_progress_increment,
            _ => return None,
        };

        self.set_progress(self.progress.saturating_add(delta))
            .then_some(self.progress)
    }
}

/// One twentieth of the range, at least 1
fn default_key_increment(max: i32) -> i32 {
    ((max as f32 / 20.0).round() as i32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_key_increment() {
        assert_eq!(SeekBar::new(100).key_progress_increment(), 5);
        assert_eq!(SeekBar::new(10).key_progress_increment(), 1);
        assert_eq!(SeekBar::new(0).key_progress_increment(), 1);
        assert_eq!(SeekBar::new(50).key_progress_increment(), 3);
    }

    #[test]
    fn test_progress_is_clamped() {
        let mut bar = SeekBar::new(10);

        assert!(bar.set_progress(25));
        assert_eq!(bar.progress(), 10);
        assert!(!bar.set_progress(10));
        assert!(bar.set_progress(-3));
        assert_eq!(bar.progress(), 0);
    }

    #[test]
    fn test_set_max_pulls_progress_back() {
        let mut bar = SeekBar::new(100);
        bar.set_progress(80);

        bar.set_max(40);
        assert_eq!(bar.progress(), 40);

        bar.set_max(1000);
        assert_eq!(bar.key_progress_increment(), 50);
    }

    #[test]
    fn test_arrow_keys() {
        let mut bar = SeekBar::new(10);
        bar.set_key_progress_increment(-4);
        assert_eq!(bar.key_progress_increment(), 4);

        assert_eq!(bar.on_key_down(KeyCode::DpadRight), Some(4));
        assert_eq!(bar.on_key_down(KeyCode::DpadRight), Some(8));
        assert_eq!(bar.on_key_down(KeyCode::DpadRight), Some(10));
        assert_eq!(bar.on_key_down(KeyCode::DpadRight), None);
        assert_eq!(bar.on_key_down(KeyCode::DpadLeft), Some(6));
        assert_eq!(bar.on_key_down(KeyCode::Enter), None);
        assert_eq!(bar.on_key_down(KeyCode::Other(29)), None);
    }

    #[test]
    fn test_disabled_ignores_keys() {
        let mut bar = SeekBar::new(10);
        bar.set_enabled(false);

        assert_eq!(bar.on_key_down(KeyCode::DpadRight), None);
        assert_eq!(bar.progress(), 0);
    }
}
