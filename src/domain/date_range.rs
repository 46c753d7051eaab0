//! Closed date intervals.

use chrono::NaiveDate;
use std::fmt;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive `[start, end]` window.
///
/// An inverted range (`start > end`) is representable; it contains no dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Parses two `YYYY-MM-DD` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, chrono::ParseError> {
        Ok(Self {
            start: NaiveDate::parse_from_str(start, DATE_FORMAT)?,
            end: NaiveDate::parse_from_str(end, DATE_FORMAT)?,
        })
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// True when every date of `self` is also in `other`. Inverted ranges are
    /// empty and therefore contained in anything.
    pub fn is_within(&self, other: &DateRange) -> bool {
        self.is_inverted() || (other.start <= self.start && self.end <= other.end)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}
