//! Data models for customers, viewing records and statistics.
//!
//! Models are built from the executor's [`Row`] type, so they work the same
//! whichever driver produced the row.

use jiff::{civil::DateTime, tz::TimeZone, Timestamp};

use crate::{
    error::{CrmError, Result},
    value::Row,
};

pub mod customer;
pub mod stats;
pub mod status;
pub mod viewing;

pub use customer::Customer;
pub use stats::{CrmStatistics, StatusCount};
pub use status::{CustomerStatus, ViewingFeedback, ViewingStatus};
pub use viewing::ViewingRecord;

/// Parses a stored timestamp. Rows written by this crate hold RFC 3339
/// strings; legacy rows hold `YYYY-MM-DD HH:MM:SS` in UTC.
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    raw.parse::<Timestamp>().ok().or_else(|| {
        raw.parse::<DateTime>()
            .ok()
            .and_then(|dt| dt.to_zoned(TimeZone::UTC).ok())
            .map(|zoned| zoned.timestamp())
    })
}

/// Storage form for caller-supplied times: UTC `YYYY-MM-DD HH:MM:SS`, so
/// stored values of any accepted input format order correctly as text.
pub fn canonical_timestamp(raw: &str) -> Option<String> {
    parse_timestamp(raw).map(|ts| ts.strftime("%Y-%m-%d %H:%M:%S").to_string())
}

fn missing_column(entity: &str, column: &str) -> CrmError {
    CrmError::database(format!("Invalid {entity} row: missing column '{column}'")).build()
}

fn required_i64(row: &Row, entity: &str, column: &str) -> Result<i64> {
    row.get_i64(column)
        .ok_or_else(|| missing_column(entity, column))
}

fn required_string(row: &Row, entity: &str, column: &str) -> Result<String> {
    row.get_string(column)
        .ok_or_else(|| missing_column(entity, column))
}

fn required_timestamp(row: &Row, entity: &str, column: &str) -> Result<Timestamp> {
    let raw = required_string(row, entity, column)?;
    parse_timestamp(&raw).ok_or_else(|| {
        CrmError::database(format!(
            "Invalid {entity} row: cannot parse '{column}' value '{raw}'"
        ))
        .build()
    })
}
