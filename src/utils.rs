use chrono::{DateTime, NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Display form of a birthday, e.g. "Jan 05"
pub const SHORT_DATE_FORMAT: &str = "%b %d";

#[derive(Debug, Error)]
#[error("unrecognised event date {value:?}: {source}")]
pub struct DateParseError {
    pub value: String,
    #[source]
    pub source: chrono::ParseError,
}

/// Turn a calendar start value into its short display form.
///
/// Values containing a `T` are timestamps and are formatted in their own
/// offset; anything else must be a bare `YYYY-MM-DD` date.
pub fn format_short_date(value: &str) -> Result<String, DateParseError> {
    let value = value.trim();

    let formatted = if value.contains('T') {
        match DateTime::parse_from_rfc3339(value) {
            Ok(dt) => dt.format(SHORT_DATE_FORMAT).to_string(),
            // Timestamps without an offset are taken as-is
            Err(rfc_err) => NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                .map(|dt| dt.format(SHORT_DATE_FORMAT).to_string())
                .map_err(|_| DateParseError {
                    value: value.to_string(),
                    source: rfc_err,
                })?,
        }
    } else {
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map_err(|source| DateParseError {
                value: value.to_string(),
                source,
            })?
            .format(SHORT_DATE_FORMAT)
            .to_string()
    };

    Ok(formatted)
}
