use chrono::{DateTime, Datelike, TimeZone, Weekday};
use mealmaker_store::codec::parse_clock;

use crate::models::Schedule;

pub(crate) fn parse_weekday(day: &str) -> Option<Weekday> {
    match day.trim().to_lowercase().as_str() {
        "monday" => Some(Weekday::Mon),
        "tuesday" => Some(Weekday::Tue),
        "wednesday" => Some(Weekday::Wed),
        "thursday" => Some(Weekday::Thu),
        "friday" => Some(Weekday::Fri),
        "saturday" => Some(Weekday::Sat),
        "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Whether any schedule covers `at`, evaluated on `at`'s own calendar day
/// and offset. Windows are inclusive at both ends and never wrap past
/// midnight.
///
/// Entries are checked in order. An entry whose times do not parse ends the
/// evaluation as closed.
pub fn is_open<Tz: TimeZone>(schedules: &[Schedule], at: &DateTime<Tz>) -> bool {
    let weekday = at.weekday();
    let time = at.time();

    for schedule in schedules {
        let (start, end) = match (
            parse_clock(&schedule.start_time),
            parse_clock(&schedule.end_time),
        ) {
            (Ok(start), Ok(end)) => (start, end),
            (Err(err), _) | (_, Err(err)) => {
                tracing::warn!(%err, day = %schedule.day_of_week, "unreadable schedule entry");
                return false;
            }
        };
        if parse_weekday(&schedule.day_of_week) != Some(weekday) {
            continue;
        }
        if start <= time && time <= end {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, Utc};

    use super::*;

    fn schedule(day: &str, start: &str, end: &str) -> Schedule {
        Schedule {
            day_of_week: day.to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
        }
    }

    fn at(rfc3339: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap()
    }

    #[test]
    fn test_open_inside_window_on_matching_day() {
        // 2024-08-05 is a Monday.
        let schedules = vec![schedule("Monday", "11:00", "15:00")];
        assert!(is_open(&schedules, &at("2024-08-05T12:30:00-03:00")));
        assert!(is_open(&schedules, &at("2024-08-05T11:00:00-03:00")));
        assert!(is_open(&schedules, &at("2024-08-05T15:00:00-03:00")));
        assert!(!is_open(&schedules, &at("2024-08-05T15:00:01-03:00")));
        assert!(!is_open(&schedules, &at("2024-08-05T10:59:59-03:00")));
    }

    #[test]
    fn test_closed_on_other_days() {
        let schedules = vec![schedule("monday", "11:00", "15:00")];
        assert!(!is_open(&schedules, &at("2024-08-06T12:00:00-03:00")));
    }

    #[test]
    fn test_day_name_is_case_insensitive() {
        let schedules = vec![schedule("FRIDAY", "18:00", "23:00")];
        assert!(is_open(&schedules, &at("2024-08-09T19:00:00-03:00")));
    }

    #[test]
    fn test_unknown_day_never_opens() {
        let schedules = vec![
            schedule("Segunda", "00:00", "23:59"),
            schedule("Mon", "00:00", "23:59"),
            schedule("", "00:00", "23:59"),
        ];
        assert!(!is_open(&schedules, &at("2024-08-05T12:00:00-03:00")));
    }

    #[test]
    fn test_evaluated_in_instant_offset() {
        // 01:00 UTC on Tuesday is still Monday 22:00 in São Paulo.
        let schedules = vec![schedule("Monday", "21:00", "23:00")];
        let utc = Utc.with_ymd_and_hms(2024, 8, 6, 1, 0, 0).unwrap();
        assert!(!is_open(&schedules, &utc));
        let local = utc.with_timezone(&FixedOffset::west_opt(3 * 3600).unwrap());
        assert!(is_open(&schedules, &local));
    }

    #[test]
    fn test_overnight_window_never_matches() {
        let schedules = vec![schedule("Saturday", "22:00", "02:00")];
        assert!(!is_open(&schedules, &at("2024-08-10T23:00:00-03:00")));
        assert!(!is_open(&schedules, &at("2024-08-10T01:00:00-03:00")));
    }

    #[test]
    fn test_first_match_wins_and_bad_entry_closes() {
        let open_first = vec![
            schedule("Monday", "11:00", "15:00"),
            schedule("Monday", "bad", "15:00"),
        ];
        assert!(is_open(&open_first, &at("2024-08-05T12:00:00-03:00")));

        let bad_first = vec![
            schedule("Tuesday", "25:99", "15:00"),
            schedule("Monday", "11:00", "15:00"),
        ];
        assert!(!is_open(&bad_first, &at("2024-08-05T12:00:00-03:00")));
    }

    #[test]
    fn test_empty_schedule_is_closed() {
        assert!(!is_open(&[], &at("2024-08-05T12:00:00-03:00")));
    }
}
