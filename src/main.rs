mod alarms;
mod alerts;
mod app;
mod command;
mod config;
mod countdown;
mod host;
mod pump;
mod records;
mod stopwatch;
mod storage;
#[cfg(test)]
mod testing;
mod ui;

use std::io::{self, BufRead};
use std::process::ExitCode;
use std::sync::mpsc::{self, Sender};
use std::thread;

use clap::Parser;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::app::{AppEvent, ClockApp, Flow};
use crate::config::{AppConfig, Cli, ConfigError};
use crate::host::{HostAlerts, SystemClock};
use crate::storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
use crate::ui::LiveLine;

#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("failed to start input thread")]
    Input(#[source] io::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), StartupError> {
    let mut config = AppConfig::load(cli.config.as_ref()).unwrap_or_else(|e| {
        log::warn!("{e}, using defaults");
        AppConfig::default()
    });
    cli.apply(&mut config);

    let store: Box<dyn KeyValueStore> = if cli.ephemeral {
        log::info!("ephemeral run, nothing is saved");
        Box::new(MemoryStore::default())
    } else {
        let store = FileStore::open(config.data_dir()?)?;
        log::info!("data in {}", store.dir().display());
        Box::new(store)
    };

    let (events, rx) = mpsc::channel();
    spawn_input(events.clone()).map_err(StartupError::Input)?;

    let mut app = ClockApp::new(config, Box::new(SystemClock), store, &HostAlerts, events);
    let mut live = LiveLine::default();

    print_lines(app.take_output());
    live.show(prompt_line(&app));

    for event in rx.iter() {
        match event {
            AppEvent::Input(line) => {
                live.forget();
                if respond(&line, &mut app) == Flow::Quit {
                    break;
                }
                print_lines(app.take_output());
            }
            AppEvent::InputClosed => break,
            AppEvent::Pulse(pulse) => {
                app.handle_pulse(pulse);
                let output = app.take_output();
                if !output.is_empty() {
                    live.clear();
                    print_lines(output);
                }
            }
        }
        live.show(prompt_line(&app));
    }

    live.clear();
    app.shutdown();
    log::info!("bye");
    Ok(())
}

fn respond(line: &str, app: &mut ClockApp) -> Flow {
    let line = line.trim();
    if line.is_empty() {
        return Flow::Continue;
    }
    match command::parse_line(line) {
        Ok(command) => match app.handle_command(command) {
            Ok(flow) => flow,
            Err(e) => {
                println!("error: {e}");
                Flow::Continue
            }
        },
        Err(usage) => {
            println!("{usage}");
            Flow::Continue
        }
    }
}

fn spawn_input(events: Sender<AppEvent>) -> io::Result<()> {
    thread::Builder::new().name("input".into()).spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if events.send(AppEvent::Input(line)).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    log::error!("stdin: {e}");
                    break;
                }
            }
        }
        events.send(AppEvent::InputClosed).ok();
    })?;
    Ok(())
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line.trim_end());
    }
}

fn prompt_line(app: &ClockApp) -> String {
    let prompt = app.theme().prompt();
    match app.live_line() {
        Some(status) => format!("[{status}] {prompt}"),
        None => prompt.to_string(),
    }
}
