use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FeedTimeError {
    #[error("hour {0} out of range (0-23)")]
    HourOutOfRange(u8),
    #[error("minute {0} out of range (0-59)")]
    MinuteOutOfRange(u8),
    #[error("malformed feed time {0:?}, expected HH:MM")]
    Malformed(String),
}

/// A scheduled time of day, canonically rendered as zero-padded `HH:MM`.
///
/// Serializes as its canonical string so the persisted file carries a flat
/// list of `"HH:MM"` entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FeedTime {
    hour: u8,
    minute: u8,
}

impl FeedTime {
    pub fn new(hour: u8, minute: u8) -> Result<Self, FeedTimeError> {
        if hour > 23 {
            return Err(FeedTimeError::HourOutOfRange(hour));
        }
        if minute > 59 {
            return Err(FeedTimeError::MinuteOutOfRange(minute));
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(self) -> u8 {
        self.hour
    }

    pub fn minute(self) -> u8 {
        self.minute
    }
}

impl fmt::Display for FeedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for FeedTime {
    type Err = FeedTimeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let malformed = || FeedTimeError::Malformed(raw.to_string());
        let (hour, minute) = raw.split_once(':').ok_or_else(malformed)?;
        let hour = hour.parse::<u8>().map_err(|_| malformed())?;
        let minute = minute.parse::<u8>().map_err(|_| malformed())?;
        Self::new(hour, minute)
    }
}

impl TryFrom<String> for FeedTime {
    type Error = FeedTimeError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<FeedTime> for String {
    fn from(time: FeedTime) -> Self {
        time.to_string()
    }
}

/// Network association outcome, decided once at startup and read-only after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WifiStatus {
    Connecting,
    Connected(String),
    Error { timeout_secs: u64 },
}

impl WifiStatus {
    pub fn dashboard_url(&self) -> Option<&str> {
        match self {
            Self::Connected(url) => Some(url),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn formats_zero_padded() {
        let time = FeedTime::new(7, 5).unwrap();
        assert_eq!(time.to_string(), "07:05");
    }

    #[test]
    fn rejects_out_of_range_fields() {
        assert_eq!(FeedTime::new(24, 0), Err(FeedTimeError::HourOutOfRange(24)));
        assert_eq!(
            FeedTime::new(0, 60),
            Err(FeedTimeError::MinuteOutOfRange(60))
        );
    }

    #[test]
    fn parses_canonical_form() {
        let time: FeedTime = "23:59".parse().unwrap();
        assert_eq!(time.hour(), 23);
        assert_eq!(time.minute(), 59);
    }

    #[test]
    fn rejects_malformed_strings() {
        for raw in ["", "7", "7:5:0", "aa:bb", "25:00", "07:99"] {
            assert!(raw.parse::<FeedTime>().is_err(), "accepted {raw:?}");
        }
    }

    #[test]
    fn display_and_parse_round_trip() {
        let time = FeedTime::new(9, 30).unwrap();
        assert_eq!(time.to_string().parse::<FeedTime>().unwrap(), time);
    }
}
