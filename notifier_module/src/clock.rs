//! Wall-clock evaluation for fixed-offset local times.
//!
//! Profiles store their timezone as a raw signed hour offset from UTC, no
//! DST rules. All views of "the user's local time" are derived here from a
//! single shifted instant.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Utc};
use regex::Regex;

/// Time source abstraction so tests can drive the scheduler with a fixed
/// instant.
pub trait Clock: Send {
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Calendar date identity in the user's local timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonthDay {
    pub month: u32,
    pub day: u32,
}

/// One instant viewed through a profile's UTC offset: the zero-padded
/// clock string used for the time match plus the pieces the message
/// template needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalMoment {
    pub clock: String,
    pub date: MonthDay,
    pub month_name: String,
    pub day_name: String,
}

pub const MAX_OFFSET_HOURS: i32 = 23;

/// Shifts `now` by a fixed hour offset and formats the local view. The
/// clock string and the date come from the same shifted instant, so a
/// profile firing near midnight cannot see a mismatched day and time.
pub fn local_moment(now: DateTime<Utc>, offset_hours: i32) -> LocalMoment {
    let offset = offset_hours.clamp(-MAX_OFFSET_HOURS, MAX_OFFSET_HOURS);
    let local = now + chrono::Duration::hours(i64::from(offset));
    LocalMoment {
        clock: local.format("%H:%M").to_string(),
        date: MonthDay {
            month: local.month(),
            day: local.day(),
        },
        month_name: local.format("%B").to_string(),
        day_name: local.format("%A").to_string(),
    }
}

static CLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").unwrap());

/// True when `value` is a zero-padded `HH:MM` string. Anything else can
/// never equal a formatted local clock and would silently never fire.
pub fn valid_clock_string(value: &str) -> bool {
    CLOCK_RE.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .expect("valid rfc3339 timestamp")
            .with_timezone(&Utc)
    }

    #[test]
    fn applies_negative_offset() {
        let moment = local_moment(utc("2026-01-05T14:00:00Z"), -5);
        assert_eq!(moment.clock, "09:00");
        assert_eq!(moment.date, MonthDay { month: 1, day: 5 });
        assert_eq!(moment.month_name, "January");
        assert_eq!(moment.day_name, "Monday");
    }

    #[test]
    fn clock_string_is_zero_padded() {
        let moment = local_moment(utc("2026-01-05T09:05:00Z"), 0);
        assert_eq!(moment.clock, "09:05");
    }

    #[test]
    fn date_crosses_midnight_backward() {
        // 02:30 UTC on the 6th is still the evening of the 5th at UTC-5.
        let moment = local_moment(utc("2026-01-06T02:30:00Z"), -5);
        assert_eq!(moment.clock, "21:30");
        assert_eq!(moment.date, MonthDay { month: 1, day: 5 });
    }

    #[test]
    fn date_crosses_midnight_forward() {
        let moment = local_moment(utc("2026-01-05T23:00:00Z"), 2);
        assert_eq!(moment.clock, "01:00");
        assert_eq!(moment.date, MonthDay { month: 1, day: 6 });
    }

    #[test]
    fn out_of_range_offset_is_clamped() {
        let moment = local_moment(utc("2026-01-05T00:00:00Z"), 30);
        assert_eq!(moment.clock, "23:00");
        assert_eq!(moment.date, MonthDay { month: 1, day: 5 });
    }

    #[test]
    fn recognizes_well_formed_clock_strings() {
        assert!(valid_clock_string("00:00"));
        assert!(valid_clock_string("09:00"));
        assert!(valid_clock_string("23:59"));
    }

    #[test]
    fn rejects_malformed_clock_strings() {
        assert!(!valid_clock_string(""));
        assert!(!valid_clock_string("9:00"));
        assert!(!valid_clock_string("24:00"));
        assert!(!valid_clock_string("09:60"));
        assert!(!valid_clock_string("0900"));
        assert!(!valid_clock_string("morning"));
    }
}
