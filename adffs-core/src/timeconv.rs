//! Entry timestamp conversion.
//!
//! Volume entries carry calendar fields (year/month/day hour/min/sec), not
//! an epoch value. Stat results need unix seconds; the conversion is done in
//! UTC, like `timegm`.

use chrono::NaiveDate;

/// Convert entry date fields to unix seconds (UTC).
///
/// Out-of-range fields yield 0 instead of failing: a bad timestamp on one
/// entry must not make the whole entry unreadable.
pub fn entry_time_to_unix(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    min: u32,
    sec: u32,
) -> i64 {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, min, sec))
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or(0)
}
