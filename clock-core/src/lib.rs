//! Pure timing logic for the Clock app: stopwatch, countdown, alarm
//! watching and display formatting.
//!
//! Nothing in this crate reads the system clock or sleeps. Every operation
//! that depends on time takes `now_ms` (epoch milliseconds) from the caller,
//! so the engines can be driven with synthetic instants on the host.

pub mod alarm;
pub mod countdown;
pub mod format;
pub mod stopwatch;
pub mod wallclock;
pub mod watcher;
pub mod world;

pub use alarm::{Alarm, AlarmTime, AlarmTimeError, Weekday, WeekdayError};
pub use countdown::{Countdown, CountdownError, Completion, SavedTimer};
pub use format::{format_hms, format_hms_cs, format_time};
pub use stopwatch::{Lap, Stopwatch};
pub use wallclock::{ClockSource, MinuteKey, WallTime};
pub use watcher::{AlarmFiring, AlarmWatcher};
pub use world::{City, DayRelation, WorldClock};

/// Run state shared by the stopwatch and the countdown.
///
/// `Expired` is only reachable by a countdown and means "reached zero and
/// the completion has been signaled".
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum TimerState {
    #[default]
    Stopped,
    Running,
    Paused,
    Expired,
}

impl TimerState {
    pub fn is_running(self) -> bool {
        self == TimerState::Running
    }
}

/// Milliseconds between `since` and `now`, zero if the clock stepped back.
pub(crate) fn span_ms(since: u64, now: u64) -> u64 {
    now.saturating_sub(since)
}
