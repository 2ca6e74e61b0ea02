use clock_core::{Lap, Stopwatch};

use crate::alerts::Alerts;

/// The stopwatch engine plus its lap click.
pub struct StopwatchController {
    pub watch: Stopwatch,
    alerts: Alerts,
    lap_sound: String,
}

impl StopwatchController {
    pub fn new(alerts: Alerts, lap_sound: String) -> Self {
        Self {
            watch: Stopwatch::new(),
            alerts,
            lap_sound,
        }
    }

    pub fn record_lap(&mut self, now_ms: u64) -> Option<Lap> {
        let lap = self.watch.add_lap(now_ms)?;
        self.alerts.chime(&self.lap_sound);
        Some(lap)
    }

    pub fn reset(&mut self) {
        self.watch.reset();
    }
}
