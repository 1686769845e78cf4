//! Identifier and time codec shared by every collection.
//!
//! Record ids are v4 UUIDs rendered as hyphenated strings. Timestamps are
//! stored as structured instants; the display layout below is only used
//! when rendering listings for clients.

use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use uuid::Uuid;

/// Layout used for human-facing timestamps in listings.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Layout of schedule boundaries ("HH:MM", 24-hour).
pub const CLOCK_FORMAT: &str = "%H:%M";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CodecError {
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Invalid time of day: {0}")]
    InvalidClock(String),
}

pub fn new_object_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn parse_object_id(raw: &str) -> Result<Uuid, CodecError> {
    raw.trim()
        .parse::<Uuid>()
        .map_err(|_| CodecError::InvalidId(raw.to_string()))
}

/// Parses a positive numeric identifier such as a partner, order or delivery id.
pub fn parse_numeric_id(raw: &str) -> Result<i64, CodecError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| CodecError::InvalidId(raw.to_string()))
}

pub fn format_display<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(DISPLAY_FORMAT).to_string()
}

pub fn parse_clock(raw: &str) -> Result<NaiveTime, CodecError> {
    NaiveTime::parse_from_str(raw.trim(), CLOCK_FORMAT)
        .map_err(|_| CodecError::InvalidClock(raw.to_string()))
}

/// Returns `[midnight, next midnight)` of the calendar day `now` falls on,
/// evaluated in `now`'s own time zone.
pub fn day_bounds<Tz: TimeZone>(now: &DateTime<Tz>) -> (DateTime<Utc>, DateTime<Utc>) {
    let tz = now.timezone();
    let today = now.date_naive();
    let tomorrow = today.succ_opt().unwrap_or(today);

    let midnight = |date: chrono::NaiveDate| {
        let naive = date.and_time(NaiveTime::MIN);
        tz.from_local_datetime(&naive)
            .earliest()
            .map(|at| at.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
    };

    (midnight(today), midnight(tomorrow))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Timelike};

    #[test]
    fn test_parse_object_id() {
        let id = new_object_id();
        assert_eq!(parse_object_id(&id).unwrap().to_string(), id);
        assert_eq!(
            parse_object_id("66ad0c5e2f"),
            Err(CodecError::InvalidId("66ad0c5e2f".to_string()))
        );
    }

    #[test]
    fn test_parse_clock() {
        let t = parse_clock("18:30").unwrap();
        assert_eq!((t.hour(), t.minute()), (18, 30));
        assert!(parse_clock("25:00").is_err());
        assert!(parse_clock("6pm").is_err());
    }

    #[test]
    fn test_display_keeps_seconds() {
        let at = Utc.with_ymd_and_hms(2024, 8, 2, 13, 58, 7).unwrap();
        assert_eq!(format_display(&at), "2024-08-02 13:58:07");
    }

    #[test]
    fn test_day_bounds_follow_offset() {
        let brt = FixedOffset::west_opt(3 * 3600).unwrap();
        let now = brt.with_ymd_and_hms(2024, 8, 2, 23, 30, 0).unwrap();
        let (start, end) = day_bounds(&now);
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 8, 2, 3, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 8, 3, 3, 0, 0).unwrap());
    }
}
