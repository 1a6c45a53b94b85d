//! Budget month selection.
//!
//! A snapshot is taken either for the `current` month, whose figures are already
//! present in the bulk category listing, or for a specific `YYYY-MM` month that
//! requires one lookup per category.

use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Literal accepted for the current-month sentinel.
pub const CURRENT_MONTH: &str = "current";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MonthError {
    #[error("Invalid month {0:?}: expected \"current\" or YYYY-MM")]
    Malformed(String),
}

/// Month a snapshot is taken for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Month {
    /// Use the figures from the bulk listing as-is.
    #[default]
    Current,
    /// A specific calendar month, stored as its first day.
    Specific(NaiveDate),
}

impl Month {
    pub fn is_current(&self) -> bool {
        matches!(self, Month::Current)
    }

    /// Path segment used by the month-scoped category endpoint (`YYYY-MM-01`).
    ///
    /// Returns `None` for the current-month sentinel.
    pub fn path_segment(&self) -> Option<String> {
        match self {
            Month::Current => None,
            Month::Specific(date) => Some(date.format("%Y-%m-%d").to_string()),
        }
    }
}

impl FromStr for Month {
    type Err = MonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case(CURRENT_MONTH) {
            return Ok(Month::Current);
        }
        // Only the exact YYYY-MM shape is accepted; chrono alone would also take `2024-3`
        // or a signed year.
        let bytes = trimmed.as_bytes();
        if bytes.len() != 7
            || bytes[4] != b'-'
            || !bytes[..4].iter().all(u8::is_ascii_digit)
            || !bytes[5..].iter().all(u8::is_ascii_digit)
        {
            return Err(MonthError::Malformed(s.to_string()));
        }
        NaiveDate::parse_from_str(&format!("{}-01", trimmed), "%Y-%m-%d")
            .map(Month::Specific)
            .map_err(|_| MonthError::Malformed(s.to_string()))
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Month::Current => write!(f, "{}", CURRENT_MONTH),
            Month::Specific(date) => write!(f, "{}", date.format("%Y-%m")),
        }
    }
}
