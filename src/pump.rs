//! Periodic pulse threads.
//!
//! Each engine that needs refreshing gets its own pump. A pump thread only
//! sleeps and posts `Pulse` messages to the main event channel; all state
//! changes happen on the main thread, one event at a time, so a pulse
//! handler can never be re-entered.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PumpKind {
    Stopwatch,
    Countdown,
    Alarm,
}

/// One tick from a pump. `generation` identifies the start..stop run that
/// produced it, so pulses still queued after a stop can be told apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pulse {
    pub kind: PumpKind,
    pub generation: u64,
}

enum Control {
    Start { interval: Duration, generation: u64 },
    Stop,
    Quit,
}

pub struct Pump {
    kind: PumpKind,
    control: Sender<Control>,
    thread: Option<JoinHandle<()>>,
    generation: u64,
    running: bool,
}

impl Pump {
    pub fn spawn<E>(kind: PumpKind, events: Sender<E>) -> Self
    where
        E: From<Pulse> + Send + 'static,
    {
        let (control, control_rx) = mpsc::channel();
        let thread = thread::spawn(move || pump_thread(kind, control_rx, events));
        Self {
            kind,
            control,
            thread: Some(thread),
            generation: 0,
            running: false,
        }
    }

    pub fn start(&mut self, interval: Duration) {
        if self.running {
            return;
        }
        self.generation += 1;
        self.running = true;
        log::debug!("{:?} pump started every {:?}", self.kind, interval);
        self.control
            .send(Control::Start {
                interval,
                generation: self.generation,
            })
            .ok();
    }

    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            log::debug!("{:?} pump stopped", self.kind);
            self.control.send(Control::Stop).ok();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether `pulse` belongs to this pump's current run.
    pub fn accepts(&self, pulse: &Pulse) -> bool {
        self.running && pulse.kind == self.kind && pulse.generation == self.generation
    }

    #[cfg(test)]
    pub fn current_pulse(&self) -> Option<Pulse> {
        self.running.then_some(Pulse {
            kind: self.kind,
            generation: self.generation,
        })
    }
}

impl Drop for Pump {
    fn drop(&mut self) {
        self.control.send(Control::Quit).ok();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("{:?} pump thread panicked", self.kind);
            }
        }
    }
}

fn pump_thread<E: From<Pulse>>(kind: PumpKind, control: Receiver<Control>, events: Sender<E>) {
    let mut running: Option<(Duration, u64)> = None;

    loop {
        // Block while stopped; while running, wait at most one interval
        let msg = match running {
            Some((interval, generation)) => match control.recv_timeout(interval) {
                Ok(msg) => msg,
                Err(RecvTimeoutError::Timeout) => {
                    if events.send(E::from(Pulse { kind, generation })).is_err() {
                        break;
                    }
                    continue;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            },
            None => match control.recv() {
                Ok(msg) => msg,
                Err(_) => break,
            },
        };

        match msg {
            Control::Start { interval, generation } => running = Some((interval, generation)),
            Control::Stop => running = None,
            Control::Quit => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn test_pulses_after_start() {
        let (tx, rx) = mpsc::channel::<Pulse>();
        let mut pump = Pump::spawn(PumpKind::Countdown, tx);
        assert!(!pump.is_running());

        pump.start(Duration::from_millis(5));
        let pulse = rx.recv_timeout(WAIT).unwrap();
        assert_eq!(pulse.kind, PumpKind::Countdown);
        assert!(pump.accepts(&pulse));
    }

    #[test]
    fn test_stale_pulse_rejected_after_stop() {
        let (tx, rx) = mpsc::channel::<Pulse>();
        let mut pump = Pump::spawn(PumpKind::Stopwatch, tx);
        pump.start(Duration::from_millis(5));
        let old = rx.recv_timeout(WAIT).unwrap();

        pump.stop();
        assert!(!pump.accepts(&old));

        pump.start(Duration::from_millis(5));
        assert!(!pump.accepts(&old));
        let fresh = loop {
            let pulse = rx.recv_timeout(WAIT).unwrap();
            if pulse.generation != old.generation {
                break pulse;
            }
        };
        assert!(pump.accepts(&fresh));
    }

    #[test]
    fn test_rejects_other_kind() {
        let (tx, _rx) = mpsc::channel::<Pulse>();
        let mut pump = Pump::spawn(PumpKind::Alarm, tx);
        pump.start(Duration::from_secs(60));
        let foreign = Pulse {
            kind: PumpKind::Stopwatch,
            generation: 1,
        };
        assert!(!pump.accepts(&foreign));
        assert_eq!(pump.current_pulse().map(|p| p.kind), Some(PumpKind::Alarm));
    }

    #[test]
    fn test_drop_joins_thread() {
        let (tx, rx) = mpsc::channel::<Pulse>();
        let mut pump = Pump::spawn(PumpKind::Alarm, tx);
        pump.start(Duration::from_millis(1));
        drop(pump);
        // Thread gone: once drained, the channel reports disconnection
        while rx.recv_timeout(WAIT).is_ok() {}
        assert!(matches!(rx.try_recv(), Err(mpsc::TryRecvError::Disconnected)));
    }
}
