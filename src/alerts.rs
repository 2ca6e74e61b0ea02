use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlertError {
    #[error("audio playback failed: {0}")]
    Audio(String),

    #[error("notification failed: {0}")]
    Notification(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SoundHandle(pub u64);

pub trait AudioPlayer {
    fn play_looping(&mut self, sound: &str) -> Result<SoundHandle, AlertError>;
    fn play_once(&mut self, sound: &str) -> Result<(), AlertError>;
    fn stop(&mut self, handle: SoundHandle);
}

pub trait Notifier {
    fn request_permission(&mut self) -> Permission;
    fn notify(&mut self, title: &str, body: &str) -> Result<(), AlertError>;
}

/// Hands out a fresh audio player and notifier to each component that
/// rings, so no two components share a sound handle.
pub trait AlertBackend {
    fn audio(&self) -> Box<dyn AudioPlayer>;
    fn notifier(&self) -> Box<dyn Notifier>;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub audio: bool,
    pub notification: bool,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            audio: true,
            notification: true,
        }
    }
}

/// Sound and notification feedback for one component.
///
/// Every collaborator failure is logged and swallowed: the caller's state
/// change has already happened and must not be undone because a speaker or
/// a notification daemon is missing. Dropping an `Alerts` stops its sound.
pub struct Alerts {
    config: AlertConfig,
    audio: Box<dyn AudioPlayer>,
    notifier: Box<dyn Notifier>,
    permission: Option<Permission>,
    ringing: Option<SoundHandle>,
}

impl Alerts {
    pub fn new(config: AlertConfig, backend: &dyn AlertBackend) -> Self {
        Self {
            config,
            audio: backend.audio(),
            notifier: backend.notifier(),
            permission: None,
            ringing: None,
        }
    }

    pub fn request_permission(&mut self) -> Permission {
        if let Some(permission) = self.permission {
            return permission;
        }
        let permission = if self.config.notification {
            self.notifier.request_permission()
        } else {
            Permission::Denied
        };
        log::debug!("notification permission: {:?}", permission);
        self.permission = Some(permission);
        permission
    }

    /// Start a looping sound, replacing any sound this component already
    /// has playing.
    pub fn ring(&mut self, sound: &str) {
        self.silence();
        if !self.config.audio {
            return;
        }
        match self.audio.play_looping(sound) {
            Ok(handle) => self.ringing = Some(handle),
            Err(e) => log::warn!("could not play {sound}: {e}"),
        }
    }

    pub fn silence(&mut self) {
        if let Some(handle) = self.ringing.take() {
            self.audio.stop(handle);
        }
    }

    #[cfg(test)]
    pub fn is_sounding(&self) -> bool {
        self.ringing.is_some()
    }

    /// Short one-shot sound, e.g. a lap click.
    pub fn chime(&mut self, sound: &str) {
        if !self.config.audio {
            return;
        }
        if let Err(e) = self.audio.play_once(sound) {
            log::warn!("could not play {sound}: {e}");
        }
    }

    pub fn announce(&mut self, title: &str, body: &str) {
        if self.request_permission() != Permission::Granted {
            return;
        }
        if let Err(e) = self.notifier.notify(title, body) {
            log::warn!("{e}");
        }
    }
}

impl Drop for Alerts {
    fn drop(&mut self) {
        self.silence();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeAlerts, Feedback};

    #[test]
    fn test_ring_replaces_previous_sound() {
        let backend = FakeAlerts::new();
        let mut alerts = Alerts::new(AlertConfig::default(), &backend);
        alerts.ring("a");
        alerts.ring("b");
        assert!(alerts.is_sounding());
        assert_eq!(backend.playing(), vec!["b".to_string()]);
        alerts.silence();
        assert!(backend.playing().is_empty());
    }

    #[test]
    fn test_drop_stops_sound() {
        let backend = FakeAlerts::new();
        {
            let mut alerts = Alerts::new(AlertConfig::default(), &backend);
            alerts.ring("alarm");
            assert_eq!(backend.playing().len(), 1);
        }
        assert!(backend.playing().is_empty());
    }

    #[test]
    fn test_audio_failure_is_swallowed() {
        let backend = FakeAlerts::new().failing_audio();
        let mut alerts = Alerts::new(AlertConfig::default(), &backend);
        alerts.ring("alarm");
        alerts.chime("lap");
        assert!(!alerts.is_sounding());
    }

    #[test]
    fn test_denied_permission_skips_notify() {
        let backend = FakeAlerts::new().denying();
        let mut alerts = Alerts::new(AlertConfig::default(), &backend);
        alerts.announce("Alarm!", "wake up");
        assert_eq!(backend.events(), vec![Feedback::PermissionRequested]);
    }

    #[test]
    fn test_disabled_channels() {
        let backend = FakeAlerts::new();
        let config = AlertConfig {
            audio: false,
            notification: false,
        };
        let mut alerts = Alerts::new(config, &backend);
        alerts.ring("alarm");
        alerts.announce("Alarm!", "wake up");
        assert_eq!(alerts.request_permission(), Permission::Denied);
        assert!(backend.events().is_empty());
    }

    #[test]
    fn test_announce_requests_permission_once() {
        let backend = FakeAlerts::new();
        let mut alerts = Alerts::new(AlertConfig::default(), &backend);
        alerts.announce("Timer Complete", "done");
        alerts.announce("Timer Complete", "again");
        assert_eq!(
            backend.events(),
            vec![
                Feedback::PermissionRequested,
                Feedback::Notified("Timer Complete".into(), "done".into()),
                Feedback::Notified("Timer Complete".into(), "again".into()),
            ]
        );
    }
}
