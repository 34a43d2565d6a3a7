//! Construction-time configuration of a seek bar preference

use serde::{Deserialize, Serialize};

/// Attributes consumed once when a [`SeekBarPreference`](crate::SeekBarPreference)
/// is created
///
/// Every field but `key` has a default, so a partial document deserializes:
///
/// ```
/// use preference::SeekBarAttributes;
///
/// let attrs: SeekBarAttributes =
///     serde_json::from_str(r#"{ "key": "volume", "max": 10, "format": "%d dB" }"#).unwrap();
/// assert_eq!(attrs.min, 0);
/// assert_eq!(attrs.max, 10);
/// assert!(attrs.adjustable);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeekBarAttributes {
    /// Store key of the persisted value
    pub key: String,

    /// Lower bound
    #[serde(default)]
    pub min: i32,

    /// Upper bound
    #[serde(default = "default_max")]
    pub max: i32,

    /// Key step; 0 lets the slider pick one
    #[serde(default)]
    pub increment: i32,

    /// Whether arrow keys adjust the value
    #[serde(default = "default_true")]
    pub adjustable: bool,

    /// Whether the value label is shown
    #[serde(default = "default_true")]
    pub show_value: bool,

    /// printf-style label template
    #[serde(default = "default_format")]
    pub format: String,

    /// Value used when nothing is persisted yet
    #[serde(default)]
    pub default_value: Option<i32>,

    /// Whether committed values are written to the store
    #[serde(default = "default_true")]
    pub persistent: bool,

    /// Whether the control accepts input
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for SeekBarAttributes {
    fn default() -> Self {
        Self {
            key: String::new(),
            min: 0,
            max: default_max(),
            increment: 0,
            adjustable: true,
            show_value: true,
            format: default_format(),
            default_value: None,
            persistent: true,
            enabled: true,
        }
    }
}

impl SeekBarAttributes {
    /// Default attributes for the preference stored under `key`
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into(), ..Default::default() }
    }

    /// Set the bounds
    pub fn range(mut self, min: i32, max: i32) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Set the key step
    pub fn increment(mut self, increment: i32) -> Self {
        self.increment = increment;
        self
    }

    /// Set whether arrow keys adjust the value
    pub fn adjustable(mut self, adjustable: bool) -> Self {
        self.adjustable = adjustable;
        self
    }

    /// Set whether the value label is shown
    pub fn show_value(mut self, show_value: bool) -> Self {
        self.show_value = show_value;
        self
    }

    /// Set the label template
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Set the fallback value used before anything is persisted
    pub fn default_value(mut self, value: i32) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Set whether committed values are persisted
    pub fn persistent(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }

    /// Set whether the control accepts input
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

fn default_max() -> i32 {
    100
}

fn default_true() -> bool {
    true
}

fn default_format() -> String {
    "%d".to_string()
}
