//! Fixed textual formats for dates, times, and timestamps.
//!
//! The same strings are used for storage and for serialized output, except
//! times: they are stored with seconds (`HH:MM:SS`) and rendered as `HH:MM`.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::{Error, Result};

/// `YYYY-MM-DD`
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// `HH:MM`
pub const TIME_FORMAT: &str = "%H:%M";
/// `HH:MM:SS`, used for storage.
pub const STORED_TIME_FORMAT: &str = "%H:%M:%S";

/// Render a date as `YYYY-MM-DD`.
pub fn date(d: NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

/// Render a time as `HH:MM`.
pub fn time(t: NaiveTime) -> String {
    t.format(TIME_FORMAT).to_string()
}

/// Render a time for storage as `HH:MM:SS`.
pub fn stored_time(t: NaiveTime) -> String {
    t.format(STORED_TIME_FORMAT).to_string()
}

/// Render a timestamp as RFC 3339.
pub fn timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| Error::validation(format!("invalid date '{s}': {e}")))
}

/// Parse `HH:MM:SS` or `HH:MM`.
pub fn parse_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s, STORED_TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(s, TIME_FORMAT))
        .map_err(|e| Error::validation(format!("invalid time '{s}': {e}")))
}

pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::validation(format!("invalid timestamp '{s}': {e}")))
}
