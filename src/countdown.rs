use clock_core::{Completion, Countdown, CountdownError};

use crate::alerts::Alerts;

pub const COMPLETE_TITLE: &str = "Timer Complete";
pub const COMPLETE_BODY: &str = "Your timer has finished!";

/// The countdown engine plus the sound and notification it raises when it
/// reaches zero. The sound keeps looping until dismiss, cancel or restart.
pub struct CountdownController {
    timer: Countdown,
    alerts: Alerts,
    sound: String,
}

impl CountdownController {
    pub fn new(mut alerts: Alerts, sound: String) -> Self {
        alerts.request_permission();
        Self {
            timer: Countdown::new(),
            alerts,
            sound,
        }
    }

    pub fn timer(&self) -> &Countdown {
        &self.timer
    }

    pub fn configure(&mut self, hours: u64, minutes: u64, seconds: u64) -> Result<(), CountdownError> {
        self.timer.configure(hours, minutes, seconds)
    }

    pub fn configure_ms(&mut self, duration_ms: u64) -> Result<(), CountdownError> {
        self.timer.configure_ms(duration_ms)
    }

    pub fn apply_preset(&mut self, minutes: u64) -> Result<(), CountdownError> {
        self.timer.apply_preset(minutes)
    }

    pub fn start(&mut self, now_ms: u64) -> Result<(), CountdownError> {
        self.timer.start(now_ms)?;
        self.alerts.silence();
        Ok(())
    }

    pub fn pause(&mut self, now_ms: u64) -> Option<Completion> {
        let done = self.timer.pause(now_ms)?;
        self.complete();
        Some(done)
    }

    pub fn resume(&mut self, now_ms: u64) -> Result<(), CountdownError> {
        self.timer.resume(now_ms)
    }

    pub fn cancel(&mut self) {
        self.timer.cancel();
        self.alerts.silence();
    }

    pub fn dismiss(&mut self) -> bool {
        self.alerts.silence();
        self.timer.dismiss()
    }

    pub fn tick(&mut self, now_ms: u64) -> Option<Completion> {
        let done = self.timer.tick(now_ms)?;
        self.complete();
        Some(done)
    }

    fn complete(&mut self) {
        self.alerts.ring(&self.sound);
        self.alerts.announce(COMPLETE_TITLE, COMPLETE_BODY);
    }
}
