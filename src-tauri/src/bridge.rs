//! IPC commands invoked by the webview front end.
//!
//! Every window sends the same channel names the core understands; the
//! bridge decodes them with [`Command::parse`] and routes timer commands to
//! the store and window commands to the lifecycle manager.

use serde_json::Value;
use std::sync::{Mutex, MutexGuard};
use tauri::{State, WebviewWindow};
use termodoro_core::error::WindowError;
use termodoro_core::{
    Command, CoreError, StoreHandle, TimerSnapshot, WindowCommand, WindowLifecycle, WindowRole,
};

use crate::window::TauriHost;

/// Store handle and popout lifecycle shared by commands, the tray and the
/// global shortcut.
pub struct AppState {
    pub store: StoreHandle,
    lifecycle: Mutex<WindowLifecycle<TauriHost>>,
}

impl AppState {
    pub fn new(store: StoreHandle, lifecycle: WindowLifecycle<TauriHost>) -> Self {
        Self {
            store,
            lifecycle: Mutex::new(lifecycle),
        }
    }

    /// Route a decoded command. `origin` is the window that sent it.
    pub fn apply(&self, command: Command, origin: WindowRole) -> Result<(), CoreError> {
        match command {
            Command::Timer(command) => self.store.dispatch(command),
            Command::RequestTimerState => self.store.request_snapshot(origin),
            Command::Window(command) => self.window_command(command),
            Command::Notice(channel) => {
                tracing::debug!(channel, window = %origin, "notice ignored");
                Ok(())
            }
        }
    }

    fn lifecycle(&self) -> Result<MutexGuard<'_, WindowLifecycle<TauriHost>>, CoreError> {
        self.lifecycle.lock().map_err(|_| {
            CoreError::Window(WindowError::Platform {
                role: WindowRole::Primary,
                message: "window lifecycle lock poisoned".into(),
            })
        })
    }

    pub fn window_command(&self, command: WindowCommand) -> Result<(), CoreError> {
        self.lifecycle()?.handle(command)
    }

    pub fn has_popout(&self) -> Result<bool, CoreError> {
        Ok(self.lifecycle()?.has_popout())
    }

    /// The platform reported a window gone.
    pub fn window_destroyed(&self, role: WindowRole) -> Result<(), CoreError> {
        let mut lifecycle = self.lifecycle()?;
        match role {
            WindowRole::Popout => lifecycle.handle_secondary_closed(),
            WindowRole::Primary => {
                lifecycle.handle_primary_closed()?;
                lifecycle.quit();
                Ok(())
            }
        }
    }
}

/// Send a command on its IPC channel name, e.g. `toggle-timer` or
/// `update-settings` with the settings as payload.
#[tauri::command]
pub async fn cmd_send(
    window: WebviewWindow,
    state: State<'_, AppState>,
    channel: String,
    payload: Option<Value>,
) -> Result<(), String> {
    let origin = WindowRole::from_label(window.label()).unwrap_or(WindowRole::Primary);
    let command = Command::parse(&channel, payload).map_err(|e| e.to_string())?;
    tracing::debug!(%channel, window = %origin, "ipc command");
    state.apply(command, origin).map_err(|e| e.to_string())
}

/// Current timer state, read through the store.
#[tauri::command]
pub async fn cmd_timer_state(state: State<'_, AppState>) -> Result<TimerSnapshot, String> {
    state.store.snapshot().await.map_err(|e| e.to_string())
}
