use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Local, TimeZone, Timelike};

use super::ClockError;

/// strftime format of the displayed string
pub const TIME_FORMAT: &str = "%H:%M";

/// The string to show and the second it was taken at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WallTime {
    pub text: String,
    pub second: u32,
}

impl WallTime {
    pub fn from_datetime<Tz>(at: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        Self {
            text: at.format(TIME_FORMAT).to_string(),
            second: at.second(),
        }
    }
}

/// Where the clock reads the time from
pub trait TimeSource {
    fn now(&mut self) -> Result<WallTime, ClockError>;
}

/// System wall clock in the local time zone
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalClock;

impl TimeSource for LocalClock {
    fn now(&mut self) -> Result<WallTime, ClockError> {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(ClockError::Time)?;
        let secs = since_epoch.as_secs();

        let local = i64::try_from(secs)
            .ok()
            .and_then(|s| Local.timestamp_opt(s, 0).single())
            .ok_or(ClockError::LocalTime(secs))?;

        Ok(WallTime::from_datetime(&local))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn formats_zero_padded_hours_and_minutes() {
        let at = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 2, 9, 5, 7)
            .unwrap();
        let wall = WallTime::from_datetime(&at);
        assert_eq!(wall.text, "09:05");
        assert_eq!(wall.second, 7);
    }

    #[test]
    fn local_clock_is_five_chars() {
        let wall = LocalClock.now().unwrap();
        assert_eq!(wall.text.len(), 5);
        assert_eq!(wall.text.as_bytes()[2], b':');
        assert!(wall.second < 60);
    }
}
