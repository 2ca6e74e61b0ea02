//! Collaborators backed by the host terminal and system clock.

use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::{Local, TimeZone, Utc};
use clock_core::ClockSource;

use crate::alerts::{AlertBackend, AlertError, AudioPlayer, Notifier, Permission, SoundHandle};

const BELL_INTERVAL: Duration = Duration::from_millis(1000);

pub struct SystemClock;

impl ClockSource for SystemClock {
    fn now_ms(&self) -> u64 {
        Utc::now().timestamp_millis().max(0) as u64
    }

    fn local_offset_minutes(&self, now_ms: u64) -> i32 {
        Local
            .timestamp_millis_opt(now_ms as i64)
            .single()
            .map(|dt| dt.offset().local_minus_utc() / 60)
            .unwrap_or(0)
    }
}

/// Rings the terminal bell. A looping sound is a thread that rings once a
/// second until its handle is stopped.
#[derive(Default)]
pub struct TerminalBell {
    next_handle: u64,
    loops: HashMap<SoundHandle, Arc<AtomicBool>>,
}

fn ring_bell() -> std::io::Result<()> {
    let mut out = std::io::stderr().lock();
    out.write_all(b"\x07")?;
    out.flush()
}

impl AudioPlayer for TerminalBell {
    fn play_looping(&mut self, sound: &str) -> Result<SoundHandle, AlertError> {
        ring_bell().map_err(|e| AlertError::Audio(e.to_string()))?;
        self.next_handle += 1;
        let handle = SoundHandle(self.next_handle);
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        thread::Builder::new()
            .name(format!("bell-{sound}"))
            .spawn(move || {
                while !flag.load(Ordering::Relaxed) {
                    thread::sleep(BELL_INTERVAL);
                    if flag.load(Ordering::Relaxed) || ring_bell().is_err() {
                        break;
                    }
                }
            })
            .map_err(|e| AlertError::Audio(e.to_string()))?;
        self.loops.insert(handle, stop);
        Ok(handle)
    }

    fn play_once(&mut self, _sound: &str) -> Result<(), AlertError> {
        ring_bell().map_err(|e| AlertError::Audio(e.to_string()))
    }

    fn stop(&mut self, handle: SoundHandle) {
        if let Some(flag) = self.loops.remove(&handle) {
            flag.store(true, Ordering::Relaxed);
        }
    }
}

impl Drop for TerminalBell {
    fn drop(&mut self) {
        for flag in self.loops.values() {
            flag.store(true, Ordering::Relaxed);
        }
    }
}

/// Prints notifications on stdout.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn request_permission(&mut self) -> Permission {
        Permission::Granted
    }

    fn notify(&mut self, title: &str, body: &str) -> Result<(), AlertError> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "\r\x1b[K*** {title} {body}")
            .and_then(|()| out.flush())
            .map_err(|e| AlertError::Notification(e.to_string()))
    }
}

pub struct HostAlerts;

impl AlertBackend for HostAlerts {
    fn audio(&self) -> Box<dyn AudioPlayer> {
        Box::new(TerminalBell::default())
    }

    fn notifier(&self) -> Box<dyn Notifier> {
        Box::new(ConsoleNotifier)
    }
}
