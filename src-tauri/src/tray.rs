//! System tray integration for Termodoro desktop application.
//!
//! Provides a system tray icon with context menu for quick access to:
//! - Show the timer
//! - Start/pause
//! - Open or close the popout
//! - Quit application

use tauri::{
    menu::{Menu, MenuItem},
    tray::{MouseButton, MouseButtonState, TrayIconBuilder, TrayIconEvent},
    App, AppHandle, Manager,
};
use termodoro_core::{Command, CoreError, TimerCommand, WindowCommand, WindowRole};

use crate::bridge::AppState;

fn run(app: &AppHandle, command: Command) {
    let state = app.state::<AppState>();
    if let Err(e) = state.apply(command, WindowRole::Primary) {
        tracing::warn!(error = %e, "tray action failed");
    }
}

/// Close an open popout, open a missing one. Nothing when the popout state
/// cannot be read.
fn popout_toggle(open: Result<bool, CoreError>) -> Option<WindowCommand> {
    match open {
        Ok(true) => Some(WindowCommand::ClosePopout),
        Ok(false) => Some(WindowCommand::CreatePopout),
        Err(e) => {
            tracing::warn!(error = %e, "popout state unavailable, tray action skipped");
            None
        }
    }
}

/// Sets up the system tray with menu items and event handlers.
///
/// # Errors
/// Returns an error if tray icon or menu creation fails
pub fn setup(app: &App) -> Result<(), Box<dyn std::error::Error>> {
    let show = MenuItem::with_id(app, "show", "Show", true, None::<&str>)?;
    let toggle = MenuItem::with_id(app, "toggle", "Start / Pause", true, None::<&str>)?;
    let popout = MenuItem::with_id(app, "popout", "Popout", true, None::<&str>)?;
    let quit = MenuItem::with_id(app, "quit", "Quit", true, None::<&str>)?;

    let menu = Menu::with_items(app, &[&show, &toggle, &popout, &quit])?;

    let mut tray = TrayIconBuilder::new()
        .tooltip("Termodoro")
        .menu(&menu)
        .show_menu_on_left_click(false)
        .on_menu_event(move |app, event| match event.id().as_ref() {
            "show" => run(app, Command::Window(WindowCommand::ActivateWindow)),
            "toggle" => run(app, Command::Timer(TimerCommand::Toggle)),
            "popout" => {
                if let Some(command) = popout_toggle(app.state::<AppState>().has_popout()) {
                    run(app, Command::Window(command));
                }
            }
            "quit" => run(app, Command::Window(WindowCommand::QuitApp)),
            _ => {}
        })
        .on_tray_icon_event(|tray, event| {
            // Left-click: bring the timer forward
            if let TrayIconEvent::Click {
                button: MouseButton::Left,
                button_state: MouseButtonState::Up,
                ..
            } = event
            {
                run(tray.app_handle(), Command::Window(WindowCommand::ActivateWindow));
            }
        });
    if let Some(icon) = app.default_window_icon() {
        tray = tray.icon(icon.clone());
    }
    tray.build(app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use termodoro_core::error::WindowError;

    #[test]
    fn popout_item_follows_popout_state() {
        assert_eq!(popout_toggle(Ok(true)), Some(WindowCommand::ClosePopout));
        assert_eq!(popout_toggle(Ok(false)), Some(WindowCommand::CreatePopout));
    }

    #[test]
    fn unreadable_popout_state_does_nothing() {
        let poisoned = CoreError::Window(WindowError::Platform {
            role: WindowRole::Primary,
            message: "window lifecycle lock poisoned".into(),
        });
        assert_eq!(popout_toggle(Err(poisoned)), None);
    }
}
