use std::rc::Rc;
use std::sync::mpsc::Sender;
use std::time::Duration;

use clock_core::world::find_city;
use clock_core::{format_hms, format_hms_cs, Alarm, ClockSource, CountdownError, SavedTimer, WorldClock};
use thiserror::Error;

use crate::alarms::AlarmService;
use crate::alerts::{AlertBackend, Alerts};
use crate::command::{AlarmCmd, AlarmEdit, Command, StopwatchCmd, TimerCmd, WorldCmd};
use crate::config::AppConfig;
use crate::countdown::{CountdownController, COMPLETE_TITLE};
use crate::pump::{Pulse, Pump, PumpKind};
use crate::records::RecordBook;
use crate::stopwatch::StopwatchController;
use crate::storage::{ClockStorage, KeyValueStore, KEY_ACTIVE_TAB, KEY_ALARMS, KEY_THEME, KEY_TIMERS, KEY_WORLD_CLOCKS};
use crate::ui::{self, Tab, Theme};

/// Everything the main loop reacts to.
#[derive(Debug)]
pub enum AppEvent {
    Input(String),
    InputClosed,
    Pulse(Pulse),
}

impl From<Pulse> for AppEvent {
    fn from(pulse: Pulse) -> Self {
        AppEvent::Pulse(pulse)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Countdown(#[from] CountdownError),

    #[error("no {kind} with id {id}")]
    NotFound { kind: &'static str, id: u64 },

    #[error("unknown city {0:?}; try `world cities`")]
    UnknownCity(String),

    #[error("nothing is ringing")]
    NothingRinging,
}

pub struct ClockApp {
    config: AppConfig,
    clock: Box<dyn ClockSource>,
    storage: Rc<ClockStorage>,
    tab: Tab,
    theme: Theme,

    stopwatch: StopwatchController,
    countdown: CountdownController,
    alarm_service: AlarmService,

    alarms: RecordBook<Alarm>,
    world_clocks: RecordBook<WorldClock>,
    saved_timers: RecordBook<SavedTimer>,

    stopwatch_pump: Pump,
    countdown_pump: Pump,
    alarm_pump: Pump,

    output: Vec<String>,
}

impl ClockApp {
    pub fn new(
        config: AppConfig,
        clock: Box<dyn ClockSource>,
        store: Box<dyn KeyValueStore>,
        backend: &dyn AlertBackend,
        events: Sender<AppEvent>,
    ) -> Self {
        let storage = Rc::new(ClockStorage::new(store));
        let tab = storage.load(KEY_ACTIVE_TAB, Tab::default());
        let theme = storage.load(KEY_THEME, Theme::default());

        let alarms = RecordBook::load(Rc::clone(&storage), KEY_ALARMS);
        let world_clocks = RecordBook::load(Rc::clone(&storage), KEY_WORLD_CLOCKS);
        let saved_timers = RecordBook::load(Rc::clone(&storage), KEY_TIMERS);

        let stopwatch = StopwatchController::new(Alerts::new(config.alerts.clone(), backend), config.lap_sound.clone());
        let countdown = CountdownController::new(Alerts::new(config.alerts.clone(), backend), config.timer_sound.clone());
        let mut alarm_service = AlarmService::new(Alerts::new(config.alerts.clone(), backend), config.alarm_sound.clone());

        let stopwatch_pump = Pump::spawn(PumpKind::Stopwatch, events.clone());
        let countdown_pump = Pump::spawn(PumpKind::Countdown, events.clone());
        let mut alarm_pump = Pump::spawn(PumpKind::Alarm, events);

        alarm_service.start();
        alarm_pump.start(config.alarm_pulse());
        log::info!(
            "clock ready: {} alarms, {} world clocks, {} saved timers",
            alarms.items().len(),
            world_clocks.items().len(),
            saved_timers.items().len()
        );

        Self {
            config,
            clock,
            storage,
            tab,
            theme,
            stopwatch,
            countdown,
            alarm_service,
            alarms,
            world_clocks,
            saved_timers,
            stopwatch_pump,
            countdown_pump,
            alarm_pump,
            output: Vec::new(),
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn handle_command(&mut self, command: Command) -> Result<Flow, AppError> {
        let now = self.clock.now_ms();
        let result = match command {
            Command::Stopwatch(cmd) => self.stopwatch_command(cmd, now),
            Command::Timer(cmd) => self.timer_command(cmd, now),
            Command::Alarm(cmd) => self.alarm_command(cmd),
            Command::World(cmd) => self.world_command(cmd, now),
            Command::Tab { tab } => {
                self.tab = tab;
                self.storage.save(KEY_ACTIVE_TAB, &tab);
                self.show(now);
                Ok(())
            }
            Command::Theme => {
                self.theme = self.theme.toggled();
                self.storage.save(KEY_THEME, &self.theme);
                self.say(format!("theme: {:?}", self.theme).to_lowercase());
                Ok(())
            }
            Command::Show => {
                self.show(now);
                Ok(())
            }
            Command::Dismiss => self.dismiss_any(),
            Command::Exit => return Ok(Flow::Quit),
        };
        self.sync_pumps();
        result.map(|()| Flow::Continue)
    }

    pub fn handle_pulse(&mut self, pulse: Pulse) {
        let now = self.clock.now_ms();
        if self.countdown_pump.accepts(&pulse) {
            if self.countdown.tick(now).is_some() {
                self.say(format!("{COMPLETE_TITLE}. `timer dismiss` to stop the sound"));
            }
        } else if self.alarm_pump.accepts(&pulse) {
            let wall = self.clock.local_time(now);
            if let Some(firing) = self.alarm_service.pulse(&mut self.alarms, &wall) {
                self.say(format!(
                    "ALARM {} {}. `dismiss` to stop",
                    firing.minute,
                    firing.alarm.notification_body()
                ));
            }
        } else if !self.stopwatch_pump.accepts(&pulse) {
            log::trace!("dropping stale {pulse:?}");
        }
        self.sync_pumps();
    }

    /// Status line for whatever is counting right now.
    pub fn live_line(&self) -> Option<String> {
        let now = self.clock.now_ms();
        let mut parts = Vec::new();
        if self.stopwatch.watch.is_running() {
            parts.push(format!("stopwatch {}", format_hms_cs(self.stopwatch.watch.elapsed_ms(now))));
        }
        let timer = self.countdown.timer();
        if timer.is_running() {
            parts.push(format!("timer {}", format_hms(timer.remaining_ms(now))));
        }
        (!parts.is_empty()).then(|| parts.join(" | "))
    }

    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }

    pub fn shutdown(&mut self) {
        self.alarm_service.dispose();
        self.stopwatch_pump.stop();
        self.countdown_pump.stop();
        self.alarm_pump.stop();
    }

    fn stopwatch_command(&mut self, cmd: StopwatchCmd, now: u64) -> Result<(), AppError> {
        match cmd {
            StopwatchCmd::Start => self.stopwatch.watch.start(now),
            StopwatchCmd::Pause => self.stopwatch.watch.pause(now),
            StopwatchCmd::Lap => {
                if self.stopwatch.record_lap(now).is_none() {
                    self.say("stopwatch is not running");
                    return Ok(());
                }
            }
            StopwatchCmd::Reset => self.stopwatch.reset(),
        }
        self.say(ui::draw_stopwatch(&self.stopwatch.watch, now));
        Ok(())
    }

    fn timer_command(&mut self, cmd: TimerCmd, now: u64) -> Result<(), AppError> {
        match cmd {
            TimerCmd::Set { hours, minutes, seconds } => self.countdown.configure(hours, minutes, seconds)?,
            TimerCmd::Preset { minutes } => self.countdown.apply_preset(minutes)?,
            TimerCmd::Start => self.countdown.start(now)?,
            TimerCmd::Pause => {
                if self.countdown.pause(now).is_some() {
                    self.say(COMPLETE_TITLE);
                }
            }
            TimerCmd::Resume => self.countdown.resume(now)?,
            TimerCmd::Cancel => self.countdown.cancel(),
            TimerCmd::Dismiss => {
                if !self.countdown.dismiss() {
                    return Err(AppError::NothingRinging);
                }
            }
            TimerCmd::Save { label } => {
                let duration_ms = self.countdown.timer().configured_ms();
                if duration_ms == 0 {
                    return Err(CountdownError::ZeroDuration.into());
                }
                let id = self.saved_timers.add(SavedTimer {
                    id: 0,
                    duration_ms,
                    label,
                    sound: None,
                    vibrate: false,
                });
                self.say(format!("saved timer #{id} ({})", format_hms(duration_ms)));
            }
            TimerCmd::Load { id } => {
                let duration_ms = self
                    .saved_timers
                    .get(id)
                    .map(|t| t.duration_ms)
                    .ok_or(AppError::NotFound { kind: "saved timer", id })?;
                self.countdown.configure_ms(duration_ms)?;
            }
            TimerCmd::List => {}
            TimerCmd::Delete { id } => {
                if !self.saved_timers.delete(id) {
                    return Err(AppError::NotFound { kind: "saved timer", id });
                }
            }
        }
        self.say(ui::draw_countdown(self.countdown.timer(), self.saved_timers.items(), now));
        Ok(())
    }

    fn alarm_command(&mut self, cmd: AlarmCmd) -> Result<(), AppError> {
        match cmd {
            AlarmCmd::Add {
                time,
                days,
                label,
                sound,
                vibrate,
                crescendo,
                challenge,
            } => {
                let mut alarm = Alarm::new(time).with_days(days);
                alarm.label = label;
                alarm.sound = sound;
                alarm.vibrate = vibrate;
                alarm.crescendo_mode = crescendo;
                alarm.challenge_to_dismiss = challenge;
                let summary = alarm.days_summary();
                let id = self.alarms.add(alarm);
                self.say(format!("alarm #{id} set for {time} ({summary})"));
            }
            AlarmCmd::Edit(edit) => self.edit_alarm(edit)?,
            AlarmCmd::List => {}
            AlarmCmd::Delete { id } => {
                if !self.alarms.delete(id) {
                    return Err(AppError::NotFound { kind: "alarm", id });
                }
            }
            AlarmCmd::Enable { id } => self.set_alarm_enabled(id, true)?,
            AlarmCmd::Disable { id } => self.set_alarm_enabled(id, false)?,
            AlarmCmd::Dismiss => {
                self.alarm_service.stop_ringing().ok_or(AppError::NothingRinging)?;
            }
        }
        self.say(ui::draw_alarms(self.alarms.items(), self.alarm_service.ringing()));
        Ok(())
    }

    fn edit_alarm(&mut self, edit: AlarmEdit) -> Result<(), AppError> {
        let id = edit.id;
        let found = self.alarms.update(id, |alarm| {
            if let Some(time) = edit.time {
                alarm.time = time;
            }
            if edit.once {
                alarm.days.clear();
            } else if let Some(days) = edit.days {
                alarm.days = days.into_iter().collect();
            }
            if edit.label.is_some() {
                alarm.label = edit.label;
            }
            if edit.sound.is_some() {
                alarm.sound = edit.sound;
            }
            if let Some(vibrate) = edit.vibrate {
                alarm.vibrate = vibrate;
            }
            if let Some(crescendo) = edit.crescendo {
                alarm.crescendo_mode = crescendo;
            }
            if let Some(challenge) = edit.challenge {
                alarm.challenge_to_dismiss = challenge;
            }
        });
        if !found {
            return Err(AppError::NotFound { kind: "alarm", id });
        }
        Ok(())
    }

    fn set_alarm_enabled(&mut self, id: u64, enabled: bool) -> Result<(), AppError> {
        if self.alarms.update(id, |a| a.enabled = enabled) {
            Ok(())
        } else {
            Err(AppError::NotFound { kind: "alarm", id })
        }
    }

    fn world_command(&mut self, cmd: WorldCmd, now: u64) -> Result<(), AppError> {
        match cmd {
            WorldCmd::Add { city } => {
                let name = city.join(" ");
                let city = find_city(&name).ok_or(AppError::UnknownCity(name))?;
                if self.world_clocks.items().iter().any(|c| c.city == city.name) {
                    self.say(format!("{} is already on the list", city.name));
                } else {
                    self.world_clocks.add(WorldClock::from_city(city));
                }
            }
            WorldCmd::List => {}
            WorldCmd::Delete { id } => {
                if !self.world_clocks.delete(id) {
                    return Err(AppError::NotFound { kind: "world clock", id });
                }
            }
            WorldCmd::Cities { query } => {
                self.say(ui::draw_city_catalog(&query));
                return Ok(());
            }
        }
        let offset = self.clock.local_offset_minutes(now);
        self.say(ui::draw_world_clocks(self.world_clocks.items(), now, offset));
        Ok(())
    }

    fn dismiss_any(&mut self) -> Result<(), AppError> {
        let alarm = self.alarm_service.stop_ringing().is_some();
        let timer = self.countdown.dismiss();
        if alarm || timer {
            Ok(())
        } else {
            Err(AppError::NothingRinging)
        }
    }

    fn show(&mut self, now: u64) {
        let text = match self.tab {
            Tab::Alarm => ui::draw_alarms(self.alarms.items(), self.alarm_service.ringing()),
            Tab::WorldClock => {
                let offset = self.clock.local_offset_minutes(now);
                ui::draw_world_clocks(self.world_clocks.items(), now, offset)
            }
            Tab::Stopwatch => ui::draw_stopwatch(&self.stopwatch.watch, now),
            Tab::Timer => ui::draw_countdown(self.countdown.timer(), self.saved_timers.items(), now),
        };
        self.say(text);
    }

    /// Run each fast pump only while its engine is running. The alarm pump
    /// runs for the app's whole life.
    fn sync_pumps(&mut self) {
        drive(
            &mut self.stopwatch_pump,
            self.stopwatch.watch.is_running(),
            self.config.stopwatch_pulse(),
        );
        drive(
            &mut self.countdown_pump,
            self.countdown.timer().is_running(),
            self.config.countdown_pulse(),
        );
    }

    fn say(&mut self, text: impl Into<String>) {
        self.output.push(text.into());
    }
}

fn drive(pump: &mut Pump, wanted: bool, interval: Duration) {
    if wanted {
        pump.start(interval);
    } else {
        pump.stop();
    }
}
