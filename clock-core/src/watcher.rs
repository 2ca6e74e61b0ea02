//! Minute-resolution alarm matching.
//!
//! The watcher is polled far more often than once a minute (a one second
//! pulse is typical), so it remembers which minute it last fired in and
//! skips every later pulse of that same minute. Only one alarm rings at a
//! time: when several enabled alarms match the same minute, the first in
//! list order wins and the others are skipped for that minute.

use crate::alarm::Alarm;
use crate::wallclock::{MinuteKey, WallTime};

/// Outcome of a pulse that started an alarm ringing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlarmFiring {
    pub alarm: Alarm,
    pub minute: MinuteKey,
    /// One-time alarm: the owner must persist `enabled = false` for it.
    pub disable: bool,
}

/// A minute on a particular calendar day.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct TriggerStamp {
    day_number: i64,
    minute: MinuteKey,
}

/// Runtime state of the alarm watcher. Never persisted.
#[derive(Debug, Default)]
pub struct AlarmWatcher {
    last_triggered: Option<TriggerStamp>,
    ringing: Option<Alarm>,
}

impl AlarmWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate one pulse. `alarms` is a read-only snapshot of the stored
    /// list; the watcher never edits it, it reports what should be written.
    pub fn check(&mut self, alarms: &[Alarm], now: &WallTime) -> Option<AlarmFiring> {
        let stamp = TriggerStamp {
            day_number: now.day_number,
            minute: now.minute_key(),
        };
        if self.last_triggered == Some(stamp) {
            return None;
        }

        let alarm = alarms.iter().find(|alarm| alarm.matches(now))?;
        if let Some(previous) = self.ringing.as_ref() {
            log::info!("alarm {} replaced by alarm {} while ringing", previous.id, alarm.id);
        }
        self.last_triggered = Some(stamp);
        self.ringing = Some(alarm.clone());
        log::info!("alarm {} fired at {}", alarm.id, stamp.minute);

        Some(AlarmFiring {
            alarm: alarm.clone(),
            minute: stamp.minute,
            disable: alarm.is_one_time(),
        })
    }

    /// The alarm currently waiting for acknowledgment.
    pub fn ringing(&self) -> Option<&Alarm> {
        self.ringing.as_ref()
    }

    pub fn last_triggered_minute(&self) -> Option<MinuteKey> {
        self.last_triggered.map(|stamp| stamp.minute)
    }

    /// Acknowledge the ringing alarm, returning it.
    pub fn stop_ringing(&mut self) -> Option<Alarm> {
        self.ringing.take()
    }
}
