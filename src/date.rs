//! Timestamp helpers: epoch seconds to RFC 3339, and the compact stamp used in file names.

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::OffsetDateTime;

/// Convert Reddit's `created_utc` (float epoch seconds) to an RFC 3339 UTC string.
/// Fractional seconds are dropped; out-of-range or non-finite input maps to the epoch.
pub fn epoch_to_rfc3339(secs: f64) -> String {
    let whole = if secs.is_finite() { secs.floor() as i64 } else { 0 };
    let dt = OffsetDateTime::from_unix_timestamp(whole).unwrap_or(OffsetDateTime::UNIX_EPOCH);
    format_rfc3339(dt)
}

/// Current UTC time as RFC 3339 (seconds precision).
pub fn now_rfc3339() -> String {
    format_rfc3339(now_utc_seconds())
}

/// `YYYYMMDD_HHMMSS`, as embedded in export file names.
pub fn file_stamp(dt: OffsetDateTime) -> String {
    let fmt = format_description!("[year][month][day]_[hour][minute][second]");
    dt.format(fmt).unwrap_or_else(|_| "00000000_000000".to_string())
}

pub fn now_utc_seconds() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now.replace_nanosecond(0).unwrap_or(now)
}

fn format_rfc3339(dt: OffsetDateTime) -> String {
    dt.format(&Rfc3339).unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}
