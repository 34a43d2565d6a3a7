//! Date formatting helpers

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, TimeZone, Utc};
use std::fmt::Display;
use thiserror::Error;

/// Date formatting errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateFormatError {
    /// Template contains an unknown or malformed directive
    #[error("Invalid date format: {0}")]
    InvalidFormat(String),

    /// Timestamp cannot be represented
    #[error("Timestamp out of range: {0}")]
    OutOfRange(i64),
}

/// Result type for date formatting
pub type Result<T> = std::result::Result<T, DateFormatError>;

/// Format `date` with a strftime-style template
///
/// ```
/// use app_utils::format_date;
/// use chrono::{TimeZone, Utc};
///
/// let date = Utc.with_ymd_and_hms(2019, 3, 14, 15, 9, 26).unwrap();
/// assert_eq!(format_date(&date, "%d/%m/%Y %H:%M").unwrap(), "14/03/2019 15:09");
/// ```
pub fn format_date<Tz>(date: &DateTime<Tz>, fmt: &str) -> Result<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let items: Vec<Item<'_>> = StrftimeItems::new(fmt).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        tracing::debug!(fmt, "Rejected date format");
        return Err(DateFormatError::InvalidFormat(fmt.to_string()));
    }

    Ok(date.format_with_items(items.iter()).to_string())
}

/// Format a Unix timestamp in milliseconds, read as UTC
pub fn format_timestamp_millis(millis: i64, fmt: &str) -> Result<String> {
    let date = DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or(DateFormatError::OutOfRange(millis))?;
    format_date(&date, fmt)
}
