use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{span_ms, TimerState};

/// Quick-pick durations offered by the selector, in minutes.
pub const PRESET_MINUTES: [u64; 3] = [5, 10, 30];

/// Largest value on the hour wheel.
pub const MAX_HOURS: u64 = 99;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CountdownError {
    #[error("duration must be greater than zero")]
    ZeroDuration,

    #[error("{field} must be at most {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u64,
        max: u64,
    },

    #[error("countdown is active; cancel it before changing the duration")]
    Busy,

    #[error("countdown is not paused")]
    NotPaused,
}

/// Raised exactly once when a running countdown reaches zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Completion {
    pub configured_ms: u64,
}

/// Countdown engine behind the timer tab.
///
/// `Stopped` is the selector state, `Expired` is "finished and ringing"
/// until the user dismisses, cancels or restarts. Remaining time is derived
/// from the instant the current run segment began, never from counting
/// pulses.
#[derive(Debug, Default)]
pub struct Countdown {
    state: TimerState,
    configured_ms: u64,
    remaining_ms: u64,
    remaining_at_pause_ms: u64,
    segment_start_ms: Option<u64>,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// True while a finished countdown is waiting for acknowledgment.
    pub fn is_ringing(&self) -> bool {
        self.state == TimerState::Expired
    }

    pub fn configured_ms(&self) -> u64 {
        self.configured_ms
    }

    /// Set the duration from the three selector wheels.
    pub fn configure(&mut self, hours: u64, minutes: u64, seconds: u64) -> Result<(), CountdownError> {
        check_range("hours", hours, MAX_HOURS)?;
        check_range("minutes", minutes, 59)?;
        check_range("seconds", seconds, 59)?;
        self.configure_ms((hours * 3600 + minutes * 60 + seconds) * 1000)
    }

    /// Set the duration directly, e.g. from a saved timer.
    pub fn configure_ms(&mut self, duration_ms: u64) -> Result<(), CountdownError> {
        if self.state != TimerState::Stopped {
            return Err(CountdownError::Busy);
        }
        self.configured_ms = duration_ms;
        Ok(())
    }

    pub fn apply_preset(&mut self, minutes: u64) -> Result<(), CountdownError> {
        self.configure(0, minutes, 0)
    }

    /// Configured duration split into selector wheel values.
    pub fn configured_hms(&self) -> (u64, u64, u64) {
        let secs = self.configured_ms / 1000;
        (secs / 3600, (secs % 3600) / 60, secs % 60)
    }

    /// Begin counting down from the configured duration. Restarting from any
    /// state is allowed and clears a pending ring.
    pub fn start(&mut self, now_ms: u64) -> Result<(), CountdownError> {
        if self.configured_ms == 0 {
            return Err(CountdownError::ZeroDuration);
        }
        self.remaining_ms = self.configured_ms;
        self.remaining_at_pause_ms = self.configured_ms;
        self.segment_start_ms = Some(now_ms);
        self.state = TimerState::Running;
        Ok(())
    }

    /// Fold the current run segment into the remaining time. If the deadline
    /// already passed, this completes the countdown instead of pausing it.
    pub fn pause(&mut self, now_ms: u64) -> Option<Completion> {
        if self.state != TimerState::Running {
            return None;
        }
        if let Some(done) = self.settle(now_ms) {
            return Some(done);
        }
        self.remaining_at_pause_ms = self.remaining_ms;
        self.segment_start_ms = None;
        self.state = TimerState::Paused;
        None
    }

    pub fn resume(&mut self, now_ms: u64) -> Result<(), CountdownError> {
        if self.state != TimerState::Paused || self.remaining_at_pause_ms == 0 {
            return Err(CountdownError::NotPaused);
        }
        self.segment_start_ms = Some(now_ms);
        self.state = TimerState::Running;
        Ok(())
    }

    /// Back to the selector, from any state.
    pub fn cancel(&mut self) {
        self.state = TimerState::Stopped;
        self.remaining_ms = 0;
        self.remaining_at_pause_ms = 0;
        self.segment_start_ms = None;
    }

    /// Acknowledge a finished countdown. Returns false if it was not ringing.
    pub fn dismiss(&mut self) -> bool {
        if !self.is_ringing() {
            return false;
        }
        self.cancel();
        true
    }

    /// Recompute remaining time on a pulse. Returns the completion the first
    /// time zero is reached; later ticks return `None`.
    pub fn tick(&mut self, now_ms: u64) -> Option<Completion> {
        if self.state != TimerState::Running {
            return None;
        }
        self.settle(now_ms)
    }

    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        match (self.state, self.segment_start_ms) {
            (TimerState::Running, Some(start)) => self
                .remaining_at_pause_ms
                .saturating_sub(span_ms(start, now_ms)),
            _ => self.remaining_ms,
        }
    }

    /// Fraction of the configured duration already spent, 0.0 to 1.0.
    pub fn progress_fraction(&self, now_ms: u64) -> f32 {
        if self.configured_ms == 0 || self.state == TimerState::Stopped {
            return 0.0;
        }
        let spent = self.configured_ms - self.remaining_ms(now_ms).min(self.configured_ms);
        spent as f32 / self.configured_ms as f32
    }

    fn settle(&mut self, now_ms: u64) -> Option<Completion> {
        self.remaining_ms = self.remaining_ms(now_ms);
        if self.remaining_ms > 0 {
            return None;
        }
        self.state = TimerState::Expired;
        self.remaining_at_pause_ms = 0;
        self.segment_start_ms = None;
        log::info!("countdown of {} ms completed", self.configured_ms);
        Some(Completion {
            configured_ms: self.configured_ms,
        })
    }
}

fn check_range(field: &'static str, value: u64, max: u64) -> Result<(), CountdownError> {
    if value > max {
        return Err(CountdownError::OutOfRange { field, value, max });
    }
    Ok(())
}

/// A duration the user saved for reuse.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedTimer {
    pub id: u64,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
    #[serde(default)]
    pub vibrate: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn running(duration_ms: u64, now: u64) -> Countdown {
        let mut cd = Countdown::new();
        cd.configure_ms(duration_ms).unwrap();
        cd.start(now).unwrap();
        cd
    }

    #[test]
    fn test_countdown_basic() {
        let mut cd = running(10_000, 1000);
        assert_eq!(cd.remaining_ms(1000), 10_000);
        assert_eq!(cd.remaining_ms(6000), 5_000);
        assert!(cd.tick(6000).is_none());
        assert!(cd.is_running());

        let done = cd.tick(11_000);
        assert_eq!(done, Some(Completion { configured_ms: 10_000 }));
        assert_eq!(cd.state(), TimerState::Expired);
        assert_eq!(cd.remaining_ms(11_000), 0);
    }

    #[test]
    fn test_completion_fires_once() {
        let mut cd = running(5000, 0);
        let mut fired = 0;
        for now in (0..20_000).step_by(10) {
            if cd.tick(now).is_some() {
                fired += 1;
            }
        }
        assert_eq!(fired, 1);
        assert!(cd.is_ringing());
        assert!(!cd.is_running());
        assert_eq!(cd.remaining_ms(20_000), 0);
    }

    #[test]
    fn test_late_tick_still_completes() {
        // A throttled host may deliver the first pulse long after the deadline
        let mut cd = running(5000, 0);
        assert!(cd.tick(60_000).is_some());
        assert_eq!(cd.remaining_ms(60_000), 0);
    }

    #[test]
    fn test_start_requires_duration() {
        let mut cd = Countdown::new();
        assert_eq!(cd.start(0), Err(CountdownError::ZeroDuration));
        assert_eq!(cd.state(), TimerState::Stopped);
    }

    #[test]
    fn test_configure_ranges() {
        let mut cd = Countdown::new();
        assert!(cd.configure(1, 2, 3).is_ok());
        assert_eq!(cd.configured_ms(), 3_723_000);
        assert_eq!(cd.configured_hms(), (1, 2, 3));
        assert_eq!(
            cd.configure(0, 60, 0),
            Err(CountdownError::OutOfRange { field: "minutes", value: 60, max: 59 })
        );
        assert!(cd.configure(100, 0, 0).is_err());
        assert_eq!(cd.configured_ms(), 3_723_000);
    }

    #[test]
    fn test_configure_rejected_while_active() {
        let mut cd = running(1000, 0);
        assert_eq!(cd.configure(0, 5, 0), Err(CountdownError::Busy));
        cd.pause(100);
        assert_eq!(cd.configure(0, 5, 0), Err(CountdownError::Busy));
        cd.cancel();
        assert!(cd.apply_preset(5).is_ok());
        assert_eq!(cd.configured_ms(), 300_000);
    }

    #[test]
    fn test_pause_resume_keeps_remaining() {
        let mut cd = running(10_000, 0);
        assert!(cd.pause(3000).is_none());
        assert_eq!(cd.state(), TimerState::Paused);
        assert_eq!(cd.remaining_ms(500_000), 7000);

        cd.resume(500_000).unwrap();
        assert_eq!(cd.remaining_ms(501_000), 6000);
        assert!(cd.tick(506_999).is_none());
        assert!(cd.tick(507_000).is_some());
    }

    #[test]
    fn test_resume_requires_pause() {
        let mut cd = running(10_000, 0);
        assert_eq!(cd.resume(10), Err(CountdownError::NotPaused));
        cd.cancel();
        assert_eq!(cd.resume(10), Err(CountdownError::NotPaused));
    }

    #[test]
    fn test_pause_past_deadline_completes() {
        let mut cd = running(1000, 0);
        assert!(cd.pause(2000).is_some());
        assert!(cd.is_ringing());
        assert_eq!(cd.resume(3000), Err(CountdownError::NotPaused));
    }

    #[test]
    fn test_cancel_and_dismiss() {
        let mut cd = running(1000, 0);
        cd.cancel();
        assert_eq!(cd.state(), TimerState::Stopped);
        assert_eq!(cd.remaining_ms(10), 0);
        assert!(cd.tick(5000).is_none());
        assert!(!cd.dismiss());

        cd.start(0).unwrap();
        cd.tick(1000);
        assert!(cd.dismiss());
        assert_eq!(cd.state(), TimerState::Stopped);
        // Duration survives so the selector shows the last choice
        assert_eq!(cd.configured_ms(), 1000);
    }

    #[test]
    fn test_restart_after_finish() {
        let mut cd = running(1000, 0);
        cd.tick(1000);
        cd.start(5000).unwrap();
        assert!(cd.is_running());
        assert_eq!(cd.remaining_ms(5400), 600);
        assert!(cd.tick(6000).is_some());
    }

    #[test]
    fn test_progress_fraction() {
        let cd = running(10_000, 0);
        assert_eq!(cd.progress_fraction(0), 0.0);
        assert!((cd.progress_fraction(2500) - 0.25).abs() < f32::EPSILON);
        assert_eq!(cd.progress_fraction(50_000), 1.0);
        assert_eq!(Countdown::new().progress_fraction(0), 0.0);
    }

    #[test]
    fn test_saved_timer_record() {
        let timer = SavedTimer {
            id: 3,
            duration_ms: 90_000,
            label: Some("tea".into()),
            sound: None,
            vibrate: false,
        };
        let json = serde_json::to_string(&timer).unwrap();
        assert_eq!(json, r#"{"id":3,"durationMs":90000,"label":"tea","vibrate":false}"#);
    }

    proptest! {
        #[test]
        fn paused_time_never_counts(
            duration in 1_000u64..100_000,
            run_a in 0u64..500,
            gap in 0u64..10_000_000,
            run_b in 0u64..500,
        ) {
            let mut cd = running(duration, 0);
            prop_assert!(cd.pause(run_a).is_none());
            cd.resume(run_a + gap).unwrap();
            let now = run_a + gap + run_b;
            prop_assert_eq!(cd.remaining_ms(now), duration - run_a - run_b);
        }

        #[test]
        fn remaining_stays_in_bounds(duration in 1u64..50_000, probes in prop::collection::vec(0u64..100_000, 1..40)) {
            let mut cd = running(duration, 0);
            let mut sorted = probes;
            sorted.sort_unstable();
            let mut completions = 0;
            for now in sorted {
                if cd.tick(now).is_some() {
                    completions += 1;
                }
                let remaining = cd.remaining_ms(now);
                prop_assert!(remaining <= cd.configured_ms());
                if cd.is_ringing() {
                    prop_assert!(!cd.is_running());
                    prop_assert_eq!(remaining, 0);
                }
            }
            prop_assert!(completions <= 1);
        }
    }
}
