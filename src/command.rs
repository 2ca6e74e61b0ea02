//! Line commands typed at the prompt.

use clap::{Args, Parser, Subcommand};
use clock_core::{AlarmTime, Weekday};

use crate::ui::Tab;

#[derive(Parser, Debug)]
#[command(name = "clock", disable_version_flag = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Stopwatch controls
    #[command(subcommand)]
    #[command(visible_alias = "sw")]
    Stopwatch(StopwatchCmd),
    /// Countdown timer controls
    #[command(subcommand)]
    Timer(TimerCmd),
    /// Alarm list
    #[command(subcommand)]
    Alarm(AlarmCmd),
    /// World clocks
    #[command(subcommand)]
    World(WorldCmd),
    /// Switch the active tab
    Tab {
        #[arg(value_enum)]
        tab: Tab,
    },
    /// Toggle light and dark theme
    Theme,
    /// Redraw the active tab
    Show,
    /// Stop whatever is ringing
    Dismiss,
    /// Leave the clock
    #[command(visible_alias = "quit")]
    Exit,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum StopwatchCmd {
    Start,
    Pause,
    Lap,
    Reset,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum TimerCmd {
    /// Set the duration from the hour, minute and second wheels
    Set {
        hours: u64,
        minutes: u64,
        #[arg(default_value_t = 0)]
        seconds: u64,
    },
    Preset {
        minutes: u64,
    },
    Start,
    Pause,
    Resume,
    Cancel,
    Dismiss,
    /// Save the configured duration
    Save {
        #[arg(long)]
        label: Option<String>,
    },
    /// Load a saved duration into the selector
    Load {
        id: u64,
    },
    List,
    Delete {
        id: u64,
    },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum AlarmCmd {
    Add {
        time: AlarmTime,
        /// Repeat days, e.g. `mon,wed,fri`. Omit for a one-time alarm
        #[arg(long, value_delimiter = ',')]
        days: Vec<Weekday>,
        #[arg(long)]
        label: Option<String>,
        #[arg(long)]
        sound: Option<String>,
        #[arg(long)]
        vibrate: bool,
        /// Ramp the volume up while ringing
        #[arg(long)]
        crescendo: bool,
        /// Require a challenge before the alarm can be dismissed
        #[arg(long)]
        challenge: bool,
    },
    /// Change fields of an existing alarm; omitted fields are kept
    Edit(AlarmEdit),
    List,
    Delete {
        id: u64,
    },
    Enable {
        id: u64,
    },
    Disable {
        id: u64,
    },
    Dismiss,
}

#[derive(Args, Debug, Default, PartialEq, Eq)]
pub struct AlarmEdit {
    pub id: u64,
    #[arg(long)]
    pub time: Option<AlarmTime>,
    #[arg(long, value_delimiter = ',', conflicts_with = "once")]
    pub days: Option<Vec<Weekday>>,
    /// Clear the repeat days
    #[arg(long)]
    pub once: bool,
    #[arg(long)]
    pub label: Option<String>,
    #[arg(long)]
    pub sound: Option<String>,
    #[arg(long)]
    pub vibrate: Option<bool>,
    #[arg(long)]
    pub crescendo: Option<bool>,
    #[arg(long)]
    pub challenge: Option<bool>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum WorldCmd {
    Add {
        #[arg(required = true, num_args = 1..)]
        city: Vec<String>,
    },
    List,
    Delete {
        id: u64,
    },
    /// Search the city catalog
    Cities {
        #[arg(default_value = "")]
        query: String,
    },
}

pub fn parse_line(line: &str) -> Result<Command, String> {
    let mut args = shlex::split(line).ok_or("error: invalid quoting")?;
    args.insert(0, "clock".to_string());
    let line = Line::try_parse_from(args).map_err(|e| e.to_string())?;
    Ok(line.command)
}
