use clock_core::{Alarm, AlarmFiring, AlarmWatcher, WallTime};

use crate::alerts::Alerts;
use crate::records::RecordBook;

pub const ALARM_TITLE: &str = "Alarm!";

/// Owns the alarm watcher and the sound it rings.
///
/// Nothing is checked until `start` and nothing rings after `dispose`, so
/// several services (in tests, say) never interfere with each other.
pub struct AlarmService {
    watcher: AlarmWatcher,
    alerts: Alerts,
    default_sound: String,
    started: bool,
}

impl AlarmService {
    pub fn new(alerts: Alerts, default_sound: String) -> Self {
        Self {
            watcher: AlarmWatcher::new(),
            alerts,
            default_sound,
            started: false,
        }
    }

    pub fn start(&mut self) {
        self.alerts.request_permission();
        self.started = true;
    }

    /// One watcher pulse against the stored alarms. A fired one-time alarm
    /// is disabled through the book, which writes it back to storage.
    pub fn pulse(&mut self, alarms: &mut RecordBook<Alarm>, now: &WallTime) -> Option<AlarmFiring> {
        if !self.started {
            return None;
        }
        let firing = self.watcher.check(alarms.items(), now)?;
        let alarm = &firing.alarm;

        let sound = alarm.sound.as_deref().unwrap_or(&self.default_sound);
        self.alerts.ring(sound);
        self.alerts.announce(ALARM_TITLE, &alarm.notification_body());

        if firing.disable && alarms.update(alarm.id, |a| a.enabled = false) {
            log::info!("one-time alarm {} disabled", alarm.id);
        }
        Some(firing)
    }

    pub fn ringing(&self) -> Option<&Alarm> {
        self.watcher.ringing()
    }

    pub fn stop_ringing(&mut self) -> Option<Alarm> {
        self.alerts.silence();
        self.watcher.stop_ringing()
    }

    pub fn dispose(&mut self) {
        self.stop_ringing();
        self.started = false;
    }
}
