use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::alerts::AlertConfig;

const APP_NAME: &str = "clock";
const MIN_PULSE_MS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] confy::ConfyError),

    #[error("no data directory available; pass --data-dir")]
    NoDataDir,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub stopwatch_pulse_ms: u64,
    pub countdown_pulse_ms: u64,
    pub alarm_pulse_ms: u64,
    pub alarm_sound: String,
    pub timer_sound: String,
    pub lap_sound: String,
    pub data_dir: Option<PathBuf>,
    pub alerts: AlertConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            stopwatch_pulse_ms: 50,
            countdown_pulse_ms: 50,
            alarm_pulse_ms: 1000,
            alarm_sound: "alarm".to_string(),
            timer_sound: "timer".to_string(),
            lap_sound: "lap".to_string(),
            data_dir: None,
            alerts: AlertConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read the config file, creating it with defaults on first run.
    pub fn load(path: Option<&PathBuf>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => confy::load_path(path)?,
            None => confy::load(APP_NAME, "config")?,
        };
        Ok(config)
    }

    pub fn stopwatch_pulse(&self) -> Duration {
        pulse(self.stopwatch_pulse_ms)
    }

    pub fn countdown_pulse(&self) -> Duration {
        pulse(self.countdown_pulse_ms)
    }

    pub fn alarm_pulse(&self) -> Duration {
        pulse(self.alarm_pulse_ms)
    }

    pub fn data_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_NAME))
                .ok_or(ConfigError::NoDataDir),
        }
    }
}

fn pulse(ms: u64) -> Duration {
    Duration::from_millis(ms.max(MIN_PULSE_MS))
}

#[derive(Parser, Debug)]
#[command(version, about = "Alarms, world clock, stopwatch and countdown timer")]
pub struct Cli {
    /// Directory holding alarms, world clocks and saved timers
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Config file to use instead of the per-user default
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `clock=trace`
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Disable alarm and timer sounds
    #[arg(long)]
    pub mute: bool,

    /// Disable notifications
    #[arg(long)]
    pub no_notify: bool,

    /// Keep everything in memory; nothing is written to disk
    #[arg(long)]
    pub ephemeral: bool,
}

impl Cli {
    /// Flags win over the file.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.data_dir {
            config.data_dir = Some(dir.clone());
        }
        if self.mute {
            config.alerts.audio = false;
        }
        if self.no_notify {
            config.alerts.notification = false;
        }
    }
}
