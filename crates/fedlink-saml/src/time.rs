//! Timestamp parsing and formatting for `IssueInstant` style attributes.

use chrono::{DateTime, SecondsFormat, Utc};
use fedlink_core::{ParsingError, ParsingResult};

/// Parses an ISO-8601 / xsd:dateTime attribute value.
pub fn parse_timestamp(field: &str, value: &str) -> ParsingResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ParsingError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        })
}

/// Formats a timestamp the way identity providers expect it: UTC with
/// millisecond precision and a `Z` suffix.
#[must_use]
pub fn format_timestamp(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}
