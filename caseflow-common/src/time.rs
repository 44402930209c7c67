//! Timestamp helpers

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

/// Current time, but never earlier than or equal to `previous`.
///
/// Used for `updated_at` so that consecutive mutations always move it forward even when
/// the clock resolution would produce the same instant twice.
pub fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

/// Lenient date/time parsing for imported records and query parameters.
///
/// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM:SS[.f]`, `YYYY-MM-DD HH:MM:SS[.f]` (read as UTC)
/// and bare `YYYY-MM-DD` (midnight UTC). Anything else yields `None`.
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    parse_date(value).and_then(|d| d.and_hms_opt(0, 0, 0)).map(|naive| naive.and_utc())
}

/// Bare `YYYY-MM-DD`
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}
