use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};

use feeder_common::FeedTime;

/// Local time is UTC plus a fixed deploy-time offset; there is no tz
/// database on the device.
pub fn local_now(utc_offset_secs: i32) -> DateTime<FixedOffset> {
    let offset = FixedOffset::east_opt(utc_offset_secs)
        .unwrap_or_else(|| FixedOffset::east_opt(0).expect("zero offset is valid"));
    Utc::now().with_timezone(&offset)
}

/// The minute stamp the schedule matches against.
pub fn minute_stamp(now: &DateTime<FixedOffset>) -> FeedTime {
    FeedTime::new(now.hour() as u8, now.minute() as u8)
        .expect("chrono hour and minute are always in range")
}

/// `HH:MM:SS` for the status page.
pub fn clock_stamp(now: &DateTime<FixedOffset>) -> String {
    format!("{:02}:{:02}:{:02}", now.hour(), now.minute(), now.second())
}

pub fn day_of_month(now: &DateTime<FixedOffset>) -> u32 {
    now.day()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn fixed_time(day: u32, hour: u32, minute: u32, second: u32) -> DateTime<FixedOffset> {
        FixedOffset::west_opt(7 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 8, day, hour, minute, second)
            .unwrap()
    }

    #[test]
    fn minute_stamp_matches_feed_time_format() {
        let now = fixed_time(5, 7, 0, 30);
        assert_eq!(minute_stamp(&now).to_string(), "07:00");
    }

    #[test]
    fn clock_stamp_is_zero_padded() {
        let now = fixed_time(5, 9, 5, 7);
        assert_eq!(clock_stamp(&now), "09:05:07");
    }

    #[test]
    fn day_of_month_tracks_calendar_day() {
        assert_eq!(day_of_month(&fixed_time(23, 12, 0, 0)), 23);
    }
}
