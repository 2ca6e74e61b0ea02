//! In-memory collaborators for unit tests.

use std::cell::{Cell, RefCell};
use std::io;
use std::path::PathBuf;
use std::rc::Rc;

use clock_core::ClockSource;

use crate::alerts::{AlertBackend, AlertError, AudioPlayer, Notifier, Permission, SoundHandle};
use crate::storage::{KeyValueStore, StorageError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Feedback {
    PermissionRequested,
    Notified(String, String),
    Chimed(String),
}

#[derive(Default)]
struct FakeState {
    events: Vec<Feedback>,
    playing: Vec<(SoundHandle, String)>,
    next_handle: u64,
}

/// Records what the app asked the audio and notification collaborators to
/// do. Clones share the same record.
#[derive(Clone, Default)]
pub struct FakeAlerts {
    state: Rc<RefCell<FakeState>>,
    fail_audio: bool,
    deny: bool,
}

impl FakeAlerts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_audio(mut self) -> Self {
        self.fail_audio = true;
        self
    }

    pub fn denying(mut self) -> Self {
        self.deny = true;
        self
    }

    pub fn events(&self) -> Vec<Feedback> {
        self.state.borrow().events.clone()
    }

    /// Names of the looping sounds currently playing.
    pub fn playing(&self) -> Vec<String> {
        self.state
            .borrow()
            .playing
            .iter()
            .map(|(_, sound)| sound.clone())
            .collect()
    }

    pub fn notifications(&self) -> Vec<(String, String)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Feedback::Notified(title, body) => Some((title, body)),
                _ => None,
            })
            .collect()
    }
}

impl AlertBackend for FakeAlerts {
    fn audio(&self) -> Box<dyn AudioPlayer> {
        Box::new(self.clone())
    }

    fn notifier(&self) -> Box<dyn Notifier> {
        Box::new(self.clone())
    }
}

impl AudioPlayer for FakeAlerts {
    fn play_looping(&mut self, sound: &str) -> Result<SoundHandle, AlertError> {
        if self.fail_audio {
            return Err(AlertError::Audio("no output device".into()));
        }
        let mut state = self.state.borrow_mut();
        state.next_handle += 1;
        let handle = SoundHandle(state.next_handle);
        state.playing.push((handle, sound.to_string()));
        Ok(handle)
    }

    fn play_once(&mut self, sound: &str) -> Result<(), AlertError> {
        if self.fail_audio {
            return Err(AlertError::Audio("no output device".into()));
        }
        self.state
            .borrow_mut()
            .events
            .push(Feedback::Chimed(sound.to_string()));
        Ok(())
    }

    fn stop(&mut self, handle: SoundHandle) {
        self.state.borrow_mut().playing.retain(|(h, _)| *h != handle);
    }
}

impl Notifier for FakeAlerts {
    fn request_permission(&mut self) -> Permission {
        self.state
            .borrow_mut()
            .events
            .push(Feedback::PermissionRequested);
        if self.deny {
            Permission::Denied
        } else {
            Permission::Granted
        }
    }

    fn notify(&mut self, title: &str, body: &str) -> Result<(), AlertError> {
        self.state
            .borrow_mut()
            .events
            .push(Feedback::Notified(title.to_string(), body.to_string()));
        Ok(())
    }
}

/// A clock the test moves by hand. Clones share the same instant.
#[derive(Clone)]
pub struct ManualClock {
    now_ms: Rc<Cell<u64>>,
    offset_minutes: i32,
}

impl ManualClock {
    pub fn new(now_ms: u64, offset_minutes: i32) -> Self {
        Self {
            now_ms: Rc::new(Cell::new(now_ms)),
            offset_minutes,
        }
    }

    pub fn set(&self, now_ms: u64) {
        self.now_ms.set(now_ms);
    }

    pub fn advance(&self, ms: u64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }
}

impl ClockSource for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }

    fn local_offset_minutes(&self, _now_ms: u64) -> i32 {
        self.offset_minutes
    }
}

/// A store that holds nothing and rejects every write.
pub struct ReadOnlyStore;

impl KeyValueStore for ReadOnlyStore {
    fn read(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    fn write(&self, key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Write {
            path: PathBuf::from(format!("{key}.json")),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
        })
    }
}
