//! Local wall-clock time.
//!
//! The synced clock runs in UTC; [`WallClock::from_unix`] applies the
//! configured whole-hour offset before splitting into calendar fields, so
//! hours and dates wrap correctly across midnight.

use core::fmt;

use chrono::{DateTime, Datelike, Timelike};

/// 2000-01-01T00:00:00Z, the time base used when SNTP never completes.
pub const EPOCH_2000: i64 = 946_684_800;

/// Broken-down local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallClock {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl WallClock {
    /// Local time for a UTC Unix timestamp shifted by `utc_offset_hours`.
    /// Timestamps chrono cannot represent collapse to the 2000 time base.
    pub fn from_unix(secs: i64, utc_offset_hours: i8) -> Self {
        let local = secs.saturating_add(i64::from(utc_offset_hours) * 3600);
        match DateTime::from_timestamp(local, 0) {
            Some(dt) => Self {
                year: dt.year().clamp(0, i32::from(u16::MAX)) as u16,
                month: dt.month() as u8,
                day: dt.day() as u8,
                hour: dt.hour() as u8,
                minute: dt.minute() as u8,
                second: dt.second() as u8,
            },
            None => Self::unsynced(),
        }
    }

    /// 01/01/00 00:00:00, what the clock reads if it was never synced.
    pub const fn unsynced() -> Self {
        Self {
            year: 2000,
            month: 1,
            day: 1,
            hour: 0,
            minute: 0,
            second: 0,
        }
    }
}

impl fmt::Display for WallClock {
    /// `dd/mm/yy HH:MM:SS`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}/{:02}/{:02} {:02}:{:02}:{:02}",
            self.day,
            self.month,
            self.year % 100,
            self.hour,
            self.minute,
            self.second
        )
    }
}
