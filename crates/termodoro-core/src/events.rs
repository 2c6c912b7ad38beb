use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, Result};
use crate::timer::{TimerSettings, TimerSnapshot};

/// Everything the store and the lifecycle manager push to window contexts.
/// The tag doubles as the IPC channel name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum Event {
    /// Full timer state after any change.
    TimerStateUpdate(TimerSnapshot),
    /// Whether the popout window is open. Sent to the primary window.
    PopoutStatus(bool),
    /// The popout window went away. Sent to the primary window.
    PopoutClosed,
}

impl Event {
    pub const TIMER_STATE_UPDATE: &'static str = "timer-state-update";
    pub const POPOUT_STATUS: &'static str = "popout-status";
    pub const POPOUT_CLOSED: &'static str = "popout-closed";

    pub fn channel(&self) -> &'static str {
        match self {
            Event::TimerStateUpdate(_) => Self::TIMER_STATE_UPDATE,
            Event::PopoutStatus(_) => Self::POPOUT_STATUS,
            Event::PopoutClosed => Self::POPOUT_CLOSED,
        }
    }

    /// Payload as sent on its channel (`null` for signals).
    pub fn payload(&self) -> Value {
        match self {
            Event::TimerStateUpdate(snapshot) => {
                serde_json::to_value(snapshot).unwrap_or(Value::Null)
            }
            Event::PopoutStatus(open) => Value::Bool(*open),
            Event::PopoutClosed => Value::Null,
        }
    }

    pub fn as_snapshot(&self) -> Option<&TimerSnapshot> {
        match self {
            Event::TimerStateUpdate(snapshot) => Some(snapshot),
            _ => None,
        }
    }
}

/// Commands applied by the store to the timer state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "payload", rename_all = "kebab-case")]
pub enum TimerCommand {
    #[serde(rename = "toggle-timer")]
    Toggle,
    #[serde(rename = "skip-session")]
    Skip,
    ToggleSpeed,
    UpdateSettings(TimerSettings),
}

/// Commands handled by the window lifecycle manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowCommand {
    CreatePopout,
    ClosePopout,
    ActivateWindow,
    QuitApp,
}

/// Anything a window context may send over IPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Timer(TimerCommand),
    /// Ask for a one-off snapshot push to the requesting window.
    RequestTimerState,
    Window(WindowCommand),
    /// Notices that need no action: the popout's unmount notice and the
    /// window-computed state reports of older front ends. Only the store
    /// writes timer state, so these are logged and dropped.
    Notice(&'static str),
}

impl Command {
    /// Decode a command from its IPC channel name and optional payload.
    ///
    /// # Errors
    ///
    /// Fails on an unknown channel or an `update-settings` payload that does
    /// not decode into settings.
    pub fn parse(channel: &str, payload: Option<Value>) -> Result<Command> {
        let command = match channel {
            "toggle-timer" => Command::Timer(TimerCommand::Toggle),
            "skip-session" => Command::Timer(TimerCommand::Skip),
            "toggle-speed" => Command::Timer(TimerCommand::ToggleSpeed),
            "update-settings" => {
                let settings: TimerSettings =
                    serde_json::from_value(payload.unwrap_or(Value::Null))?;
                Command::Timer(TimerCommand::UpdateSettings(settings))
            }
            "request-timer-state" => Command::RequestTimerState,
            "create-popout" => Command::Window(WindowCommand::CreatePopout),
            "close-popout" => Command::Window(WindowCommand::ClosePopout),
            "activate-window" => Command::Window(WindowCommand::ActivateWindow),
            "quit-app" => Command::Window(WindowCommand::QuitApp),
            "popout-unmounting" => Command::Notice("popout-unmounting"),
            Event::TIMER_STATE_UPDATE => Command::Notice(Event::TIMER_STATE_UPDATE),
            other => return Err(CoreError::UnknownCommand(other.to_string())),
        };
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::TimerEngine;
    use serde_json::json;

    #[test]
    fn state_update_uses_channel_tag() {
        let event = Event::TimerStateUpdate(TimerEngine::default().snapshot());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "timer-state-update");
        assert_eq!(json["payload"]["timeRemaining"], 1500);
        assert_eq!(event.channel(), "timer-state-update");
        assert_eq!(event.payload()["mode"], "work");
    }

    #[test]
    fn popout_signals() {
        assert_eq!(Event::PopoutStatus(true).payload(), json!(true));
        assert_eq!(Event::PopoutClosed.payload(), Value::Null);
        assert_eq!(Event::PopoutClosed.channel(), "popout-closed");
        let json = serde_json::to_value(Event::PopoutStatus(false)).unwrap();
        assert_eq!(json, json!({"event": "popout-status", "payload": false}));
    }

    #[test]
    fn parse_covers_command_table() {
        let cases = [
            ("toggle-timer", Command::Timer(TimerCommand::Toggle)),
            ("skip-session", Command::Timer(TimerCommand::Skip)),
            ("toggle-speed", Command::Timer(TimerCommand::ToggleSpeed)),
            ("request-timer-state", Command::RequestTimerState),
            ("create-popout", Command::Window(WindowCommand::CreatePopout)),
            ("close-popout", Command::Window(WindowCommand::ClosePopout)),
            ("activate-window", Command::Window(WindowCommand::ActivateWindow)),
            ("quit-app", Command::Window(WindowCommand::QuitApp)),
        ];
        for (channel, expected) in cases {
            assert_eq!(Command::parse(channel, None).unwrap(), expected, "{channel}");
        }
    }

    #[test]
    fn parse_update_settings_payload() {
        let payload = json!({
            "workDuration": 600,
            "shortBreakDuration": 60,
            "longBreakDuration": 300,
            "pomodorosUntilLongBreak": 2,
        });
        let command = Command::parse("update-settings", Some(payload)).unwrap();
        assert_eq!(
            command,
            Command::Timer(TimerCommand::UpdateSettings(TimerSettings::new(600, 60, 300, 2)))
        );
    }

    #[test]
    fn settings_form_payload_decodes() {
        // Minutes from the settings form, sent as whole seconds.
        let payload: Value = serde_json::from_str(
            r#"{"workDuration":1500,"shortBreakDuration":300,"longBreakDuration":900,"pomodorosUntilLongBreak":4}"#,
        )
        .unwrap();
        assert_eq!(
            Command::parse("update-settings", Some(payload)).unwrap(),
            Command::Timer(TimerCommand::UpdateSettings(TimerSettings::new(1500, 300, 900, 4)))
        );

        let fractional = json!({
            "workDuration": 1500.5,
            "shortBreakDuration": 300,
            "longBreakDuration": 900,
            "pomodorosUntilLongBreak": 4,
        });
        assert!(Command::parse("update-settings", Some(fractional)).is_err());
    }

    #[test]
    fn parse_rejects_bad_settings_and_unknown_channels() {
        assert!(matches!(
            Command::parse("update-settings", None),
            Err(CoreError::Json(_))
        ));
        assert!(matches!(
            Command::parse("reset-timer", None),
            Err(CoreError::UnknownCommand(name)) if name == "reset-timer"
        ));
    }

    #[test]
    fn legacy_channels_are_notices() {
        assert_eq!(
            Command::parse("popout-unmounting", None).unwrap(),
            Command::Notice("popout-unmounting")
        );
        assert!(matches!(
            Command::parse("timer-state-update", Some(json!({}))).unwrap(),
            Command::Notice(_)
        ));
    }

    #[test]
    fn timer_command_serde_names() {
        let json = serde_json::to_value(TimerCommand::Toggle).unwrap();
        assert_eq!(json, json!({"command": "toggle-timer"}));
        let json = serde_json::to_value(TimerCommand::ToggleSpeed).unwrap();
        assert_eq!(json["command"], "toggle-speed");
    }
}
