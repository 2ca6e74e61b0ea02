use std::fmt::Write as _;
use std::io::{self, Write};

use clap::ValueEnum;
use clock_core::countdown::PRESET_MINUTES;
use clock_core::world::{search_cities, City};
use clock_core::{format_hms, format_hms_cs, Alarm, Countdown, SavedTimer, Stopwatch, TimerState, WallTime, WorldClock};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Tab {
    #[default]
    Alarm,
    WorldClock,
    Stopwatch,
    Timer,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            Theme::Light => "clock> ",
            Theme::Dark => "\x1b[7mclock>\x1b[0m ",
        }
    }
}

pub fn draw_alarms(alarms: &[Alarm], ringing: Option<&Alarm>) -> String {
    let mut out = String::from("ALARMS\n");
    if alarms.is_empty() {
        out.push_str("  (none)  alarm add HH:MM [--days mon,tue] [--label ...]\n");
    }
    for alarm in alarms {
        let marker = if ringing.is_some_and(|r| r.id == alarm.id) {
            "!!"
        } else if alarm.enabled {
            "on"
        } else {
            "  "
        };
        write!(out, "  [{marker}] #{:<3} {}  {}", alarm.id, alarm.time, alarm.days_summary()).ok();
        if let Some(label) = alarm.label.as_deref() {
            write!(out, "  {label}").ok();
        }
        out.push('\n');
    }
    if let Some(alarm) = ringing {
        writeln!(out, "RINGING: {} {}  (dismiss)", alarm.time, alarm.notification_body()).ok();
    }
    out
}

pub fn draw_world_clocks(clocks: &[WorldClock], now_ms: u64, local_offset_minutes: i32) -> String {
    let mut out = String::from("WORLD CLOCK\n");
    let local = WallTime::at_offset(now_ms, local_offset_minutes);
    writeln!(out, "  local      {}", local.minute_key()).ok();
    if clocks.is_empty() {
        out.push_str("  (none)  world add <city>\n");
    }
    for clock in clocks {
        let t = clock.wall_time(now_ms);
        writeln!(
            out,
            "  #{:<3} {:<12} {}  {:<9} {}",
            clock.id,
            clock.city,
            t.minute_key(),
            clock.day_relation(now_ms, local_offset_minutes),
            clock.offset_label(local_offset_minutes),
        )
        .ok();
    }
    out
}

pub fn draw_city_catalog(query: &str) -> String {
    let mut out = String::from("CITIES\n");
    let hits: Vec<&City> = search_cities(query).collect();
    if hits.is_empty() {
        writeln!(out, "  no city matches {query:?}").ok();
    }
    for city in hits {
        writeln!(out, "  {:<12} {} ({})", city.name, city.timezone, city.country_code).ok();
    }
    out
}

pub fn draw_stopwatch(watch: &Stopwatch, now_ms: u64) -> String {
    let mut out = String::from("STOPWATCH\n");
    writeln!(out, "  {}  {}", format_hms_cs(watch.elapsed_ms(now_ms)), state_label(watch.state())).ok();
    let count = watch.laps().len();
    for (i, lap) in watch.laps().iter().enumerate() {
        writeln!(
            out,
            "  Lap {:<3} {}  +{}",
            count - i,
            format_hms_cs(lap.total_ms),
            format_hms_cs(lap.split_ms)
        )
        .ok();
    }
    out
}

pub fn draw_countdown(timer: &Countdown, saved: &[SavedTimer], now_ms: u64) -> String {
    let mut out = String::from("TIMER\n");
    match timer.state() {
        TimerState::Stopped => {
            let (h, m, s) = timer.configured_hms();
            writeln!(out, "  set {h:02}:{m:02}:{s:02}").ok();
            let presets: Vec<String> = PRESET_MINUTES.iter().map(|m| format!("{m} min")).collect();
            writeln!(out, "  presets: {}", presets.join(", ")).ok();
        }
        TimerState::Expired => {
            out.push_str("  00:00:00  TIME'S UP  (dismiss)\n");
        }
        state => {
            writeln!(
                out,
                "  {}  {}  {:>3.0}%",
                format_hms(timer.remaining_ms(now_ms)),
                state_label(state),
                timer.progress_fraction(now_ms) * 100.0
            )
            .ok();
        }
    }
    for entry in saved {
        write!(out, "  saved #{:<3} {}", entry.id, format_hms(entry.duration_ms)).ok();
        if let Some(label) = entry.label.as_deref() {
            write!(out, "  {label}").ok();
        }
        out.push('\n');
    }
    out
}

fn state_label(state: TimerState) -> &'static str {
    match state {
        TimerState::Stopped => "stopped",
        TimerState::Running => "running",
        TimerState::Paused => "paused",
        TimerState::Expired => "finished",
    }
}

/// The prompt line, redrawn in place on fast pulses.
#[derive(Default)]
pub struct LiveLine {
    shown: Option<String>,
}

impl LiveLine {
    pub fn show(&mut self, text: String) {
        if self.shown.as_deref() == Some(text.as_str()) {
            return;
        }
        print_raw(&format!("\r\x1b[K{text}"));
        self.shown = Some(text);
    }

    /// Erase the line so output can be printed in its place.
    pub fn clear(&mut self) {
        if self.shown.take().is_some() {
            print_raw("\r\x1b[K");
        }
    }

    /// The user pressed enter; the cursor is already on a fresh line.
    pub fn forget(&mut self) {
        self.shown = None;
    }
}

fn print_raw(text: &str) {
    let mut out = io::stdout().lock();
    if out.write_all(text.as_bytes()).and_then(|()| out.flush()).is_err() {
        log::debug!("stdout closed");
    }
}
