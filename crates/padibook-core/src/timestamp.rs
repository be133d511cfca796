//! Text formats for timestamps and dates as they appear in stored records
//! and on the command line.

use serde::Serializer;
use time::{format_description::FormatItem, macros::format_description, Date, PrimitiveDateTime};

pub const TIMESTAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

const TIMESTAMP_SUBSECOND_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]");

const ISO_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

pub const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub fn format_timestamp(ts: PrimitiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).unwrap_or_else(|_| ts.to_string())
}

pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT).unwrap_or_else(|_| date.to_string())
}

/// Parses a stored timestamp. Accepts `YYYY-MM-DD HH:MM:SS` (optionally with
/// fractional seconds), the ISO `T` separator, or a bare date (midnight).
pub fn parse_timestamp(s: &str) -> Option<PrimitiveDateTime> {
    let s = s.trim();
    PrimitiveDateTime::parse(s, TIMESTAMP_FORMAT)
        .or_else(|_| PrimitiveDateTime::parse(s, TIMESTAMP_SUBSECOND_FORMAT))
        .or_else(|_| PrimitiveDateTime::parse(s, ISO_FORMAT))
        .ok()
        .or_else(|| parse_date(s).map(Date::midnight))
}

pub fn parse_date(s: &str) -> Option<Date> {
    Date::parse(s.trim(), DATE_FORMAT).ok()
}

pub fn serialize<S: Serializer>(ts: &PrimitiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(*ts))
}

pub fn serialize_date<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_date(*date))
}
