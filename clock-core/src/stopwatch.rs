use std::collections::VecDeque;

use crate::{span_ms, TimerState};

/// One recorded lap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lap {
    /// Unique within one stopwatch run; assigned from a counter, never from
    /// the clock, so two laps in the same millisecond still differ.
    pub id: u64,
    /// Stopwatch reading when the lap was taken.
    pub total_ms: u64,
    /// Time since the previous lap, or since zero for the first lap.
    pub split_ms: u64,
}

/// Elapsed-time engine behind the stopwatch tab.
///
/// Elapsed time is always derived from wall-clock instants
/// (`accumulated + (now - segment_start)`), never from counting pulses, so a
/// late or skipped refresh does not drift the reading.
#[derive(Debug, Default)]
pub struct Stopwatch {
    state: TimerState,
    accumulated_ms: u64,
    segment_start_ms: Option<u64>,
    laps: VecDeque<Lap>,
    next_lap_id: u64,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn start(&mut self, now_ms: u64) {
        if self.state == TimerState::Running {
            return;
        }
        self.segment_start_ms = Some(now_ms);
        self.state = TimerState::Running;
    }

    pub fn pause(&mut self, now_ms: u64) {
        if self.state != TimerState::Running {
            return;
        }
        if let Some(start) = self.segment_start_ms.take() {
            self.accumulated_ms += span_ms(start, now_ms);
        }
        self.state = TimerState::Paused;
    }

    pub fn reset(&mut self) {
        self.accumulated_ms = 0;
        self.segment_start_ms = None;
        self.laps.clear();
        self.next_lap_id = 0;
        self.state = TimerState::Stopped;
    }

    /// Current reading. Does not mutate anything; safe to call from every
    /// display refresh.
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        match (self.state, self.segment_start_ms) {
            (TimerState::Running, Some(start)) => self.accumulated_ms + span_ms(start, now_ms),
            _ => self.accumulated_ms,
        }
    }

    /// Record a lap at `now_ms`. Returns `None` (and records nothing) unless
    /// the stopwatch is running.
    pub fn add_lap(&mut self, now_ms: u64) -> Option<Lap> {
        if self.state != TimerState::Running {
            return None;
        }
        let total_ms = self.elapsed_ms(now_ms);
        let previous = self.laps.front().map(|lap| lap.total_ms).unwrap_or(0);
        let lap = Lap {
            id: self.next_lap_id,
            total_ms,
            split_ms: total_ms.saturating_sub(previous),
        };
        self.next_lap_id += 1;
        self.laps.push_front(lap);
        Some(lap)
    }

    /// Laps, newest first.
    pub fn laps(&self) -> &VecDeque<Lap> {
        &self.laps
    }
}
