//! Interactive terminal session.
//!
//! The terminal plays both window contexts: the primary view prints a full
//! status line on every update, the popout prints a compact one. Commands
//! are read from stdin one per line, either as a shortcut letter or as the
//! IPC channel name itself.

use std::sync::{Arc, Mutex};

use serde_json::Value;
use termodoro_core::error::WindowError;
use termodoro_core::{
    Command, Config, CoreError, Event, PopoutOptions, QueueWindow, StoreHandle, TimerSnapshot,
    TimerStore, WindowChannel, WindowHost, WindowLifecycle, WindowRole,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

const HELP: &str = "\
commands:
  f              start/pause
  s              skip session
  x              next speed
  p              open/close popout
  a              bring timer to front
  e W S L N      set durations (seconds) and long-break cadence
  r              reprint state
  q              quit";

/// Window host for a terminal: the popout is a renderer task.
struct TerminalHost {
    popout: Mutex<Option<JoinHandle<()>>>,
    exit: watch::Sender<bool>,
}

impl TerminalHost {
    fn new(exit: watch::Sender<bool>) -> Self {
        Self {
            popout: Mutex::new(None),
            exit,
        }
    }
}

impl WindowHost for TerminalHost {
    fn open_popout(&self, options: &PopoutOptions) -> Result<Arc<dyn WindowChannel>, WindowError> {
        let (window, rx) = QueueWindow::new(WindowRole::Popout);
        let task = tokio::spawn(render(WindowRole::Popout, rx));
        let mut slot = self.popout.lock().map_err(|_| WindowError::Platform {
            role: WindowRole::Popout,
            message: "popout slot poisoned".into(),
        })?;
        if let Some(old) = slot.replace(task) {
            old.abort();
        }
        tracing::debug!(always_on_top = options.always_on_top, "popout view opened");
        Ok(Arc::new(window))
    }

    fn close(&self, role: WindowRole) -> Result<(), WindowError> {
        if role != WindowRole::Popout {
            return Ok(());
        }
        let task = self
            .popout
            .lock()
            .map_err(|_| WindowError::Platform {
                role,
                message: "popout slot poisoned".into(),
            })?
            .take()
            .ok_or(WindowError::NotFound(role))?;
        task.abort();
        Ok(())
    }

    fn is_minimized(&self, _role: WindowRole) -> Result<bool, WindowError> {
        Ok(false)
    }

    fn restore(&self, _role: WindowRole) -> Result<(), WindowError> {
        Ok(())
    }

    fn focus(&self, role: WindowRole) -> Result<(), WindowError> {
        println!("[{role}] focused");
        Ok(())
    }

    fn exit(&self) {
        let _ = self.exit.send(true);
    }
}

pub fn run(popout: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(session(config, popout));
    // A stdin read may still be parked on a blocking thread.
    runtime.shutdown_background();
    result
}

async fn session(config: Config, popout: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (handle, store_task) = TimerStore::from_config(&config).spawn();

    let (primary, primary_rx) = QueueWindow::new(WindowRole::Primary);
    let primary_task = tokio::spawn(render(WindowRole::Primary, primary_rx));
    handle.attach(Arc::new(primary))?;

    let (exit_tx, mut exit_rx) = watch::channel(false);
    let mut lifecycle = WindowLifecycle::new(
        TerminalHost::new(exit_tx),
        handle.clone(),
        config.popout_options(),
    );
    if popout {
        lifecycle.create_secondary_window()?;
    }
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            biased;
            _ = exit_rx.changed() => break,
            line = lines.next_line() => {
                let Some(line) = line? else {
                    lifecycle.quit();
                    continue;
                };
                match parse_line(&line, lifecycle.has_popout()) {
                    Ok(Some(command)) => {
                        if let Err(e) = apply(command, &handle, &mut lifecycle) {
                            eprintln!("error: {e}");
                        }
                    }
                    Ok(None) => {}
                    Err(e) => eprintln!("error: {e}\n{HELP}"),
                }
            }
        }
    }

    store_task.await?;
    lifecycle.handle_primary_closed().or_else(ignore_closed)?;
    primary_task.await?;
    Ok(())
}

fn ignore_closed(err: CoreError) -> Result<(), CoreError> {
    match err {
        CoreError::StoreClosed => Ok(()),
        other => Err(other),
    }
}

fn apply(
    command: Command,
    handle: &StoreHandle,
    lifecycle: &mut WindowLifecycle<TerminalHost>,
) -> Result<(), CoreError> {
    match command {
        Command::Timer(command) => handle.dispatch(command),
        Command::RequestTimerState => handle.request_snapshot(lifecycle.active_role()),
        Command::Window(command) => lifecycle.handle(command),
        Command::Notice(channel) => {
            tracing::debug!(channel, "notice ignored");
            Ok(())
        }
    }
}

/// Map an input line to a command. Blank lines map to nothing.
fn parse_line(line: &str, popout_open: bool) -> Result<Option<Command>, CoreError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let channel = match head {
        "f" => "toggle-timer",
        "s" => "skip-session",
        "x" => "toggle-speed",
        "p" if popout_open => "close-popout",
        "p" => "create-popout",
        "a" => "activate-window",
        "r" => "request-timer-state",
        "q" => "quit-app",
        "e" => {
            let values = words
                .map(str::parse::<u64>)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| CoreError::UnknownCommand(format!("e: {e}")))?;
            let &[work, short, long, cadence] = values.as_slice() else {
                return Err(CoreError::UnknownCommand(
                    "e expects four numbers".to_string(),
                ));
            };
            let payload = serde_json::json!({
                "workDuration": work,
                "shortBreakDuration": short,
                "longBreakDuration": long,
                "pomodorosUntilLongBreak": cadence,
            });
            return Command::parse("update-settings", Some(payload)).map(Some);
        }
        other => other,
    };
    let rest = words.collect::<Vec<_>>().join(" ");
    let payload = (!rest.is_empty()).then(|| {
        serde_json::from_str(&rest).unwrap_or_else(|_| Value::String(rest.clone()))
    });
    Command::parse(channel, payload).map(Some)
}

async fn render(role: WindowRole, mut rx: mpsc::UnboundedReceiver<Event>) {
    while let Some(event) = rx.recv().await {
        match (role, &event) {
            (WindowRole::Primary, Event::TimerStateUpdate(snapshot)) => {
                println!("[{role}] {}", status_line(snapshot));
            }
            (WindowRole::Popout, Event::TimerStateUpdate(snapshot)) => {
                println!("[{role}] {}", compact_line(snapshot));
            }
            (_, Event::PopoutStatus(open)) => {
                println!("[{role}] popout {}", if *open { "open" } else { "closed" });
            }
            (_, Event::PopoutClosed) => tracing::debug!("popout closed notice"),
        }
    }
}

fn status_line(snapshot: &TimerSnapshot) -> String {
    format!(
        "{} {} {} {} done {}/{}",
        snapshot.mode,
        snapshot.clock(),
        if snapshot.is_running { "running" } else { "paused" },
        snapshot.speed_multiplier,
        snapshot.completed_pomodoros % snapshot.pomodoros_until_long_break.max(1),
        snapshot.pomodoros_until_long_break,
    )
}

fn compact_line(snapshot: &TimerSnapshot) -> String {
    let marker = if snapshot.is_running { ">" } else { "=" };
    format!("{marker} {}", snapshot.clock())
}
