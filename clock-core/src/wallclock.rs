//! Wall-clock decomposition of epoch instants.

use crate::alarm::{AlarmTime, Weekday};

const MS_PER_DAY: i64 = 86_400_000;
const MS_PER_MINUTE: i64 = 60_000;

/// The `HH:MM` key used to de-duplicate alarm firings within one minute.
pub type MinuteKey = AlarmTime;

/// Local calendar position of an instant at some UTC offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WallTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub weekday: Weekday,
    /// Days since 1970-01-01 in this offset's calendar.
    pub day_number: i64,
}

impl WallTime {
    /// Break `epoch_ms` down as seen by a clock `offset_minutes` east of UTC.
    pub fn at_offset(epoch_ms: u64, offset_minutes: i32) -> Self {
        let local_ms = epoch_ms as i64 + i64::from(offset_minutes) * MS_PER_MINUTE;
        let day_number = local_ms.div_euclid(MS_PER_DAY);
        let secs_of_day = local_ms.rem_euclid(MS_PER_DAY) / 1000;
        Self {
            hour: (secs_of_day / 3600) as u8,
            minute: ((secs_of_day % 3600) / 60) as u8,
            second: (secs_of_day % 60) as u8,
            weekday: Weekday::from_days_since_epoch(day_number),
            day_number,
        }
    }

    pub fn minute_key(&self) -> MinuteKey {
        AlarmTime::saturating(self.hour, self.minute)
    }
}

/// Source of "now" for everything above the pure engines.
pub trait ClockSource {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;

    /// Local UTC offset in effect at `now_ms`, in minutes east of UTC.
    fn local_offset_minutes(&self, now_ms: u64) -> i32;

    fn local_time(&self, now_ms: u64) -> WallTime {
        WallTime::at_offset(now_ms, self.local_offset_minutes(now_ms))
    }
}
