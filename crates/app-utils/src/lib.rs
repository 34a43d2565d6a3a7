//! Small application helpers
//!
//! - [`success_fail`] - Success/failure continuation pairs
//! - [`dates`] - Date formatting

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dates;
pub mod success_fail;

pub use dates::{format_date, format_timestamp_millis, DateFormatError};
pub use success_fail::{success, Success, SuccessFail};
