// Prevents additional console window on Windows in release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! Termodoro Desktop Application
//!
//! A Tauri-based desktop shell over termodoro-core. The timer store runs on
//! the Tauri async runtime and pushes every state change to both webview
//! windows; the webviews only render and send commands.

use std::sync::Arc;

use tauri::{Manager, WindowEvent};
use tauri_plugin_global_shortcut::ShortcutState;
use termodoro_core::{Config, TimerStore, WindowCommand, WindowLifecycle, WindowRole};
use tracing_subscriber::EnvFilter;

mod bridge;
mod tray;
mod window;

use bridge::AppState;
use window::{TauriHost, TauriWindow};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn main() {
    init_logging();
    let config = Config::load_or_default();

    let shortcut = config.window.activate_shortcut.clone();
    let global_shortcut = tauri_plugin_global_shortcut::Builder::new()
        .with_shortcut(shortcut.as_str())
        .unwrap_or_else(|e| {
            tracing::warn!(%shortcut, error = %e, "activation shortcut not registered");
            tauri_plugin_global_shortcut::Builder::new()
        })
        .with_handler(|app, _shortcut, event| {
            if event.state == ShortcutState::Pressed {
                let state = app.state::<AppState>();
                if let Err(e) = state.window_command(WindowCommand::ActivateWindow) {
                    tracing::warn!(error = %e, "activate from shortcut failed");
                }
            }
        })
        .build();

    tauri::Builder::default()
        .plugin(global_shortcut)
        .setup(move |app| {
            let handle = app.handle().clone();
            let (store, task) = TimerStore::from_config(&config).into_task();
            tauri::async_runtime::spawn(task);

            store.attach(Arc::new(TauriWindow::new(handle.clone(), WindowRole::Primary)))?;
            let lifecycle = WindowLifecycle::new(
                TauriHost::new(handle.clone()),
                store.clone(),
                config.popout_options(),
            );
            app.manage(AppState::new(store, lifecycle));

            tray::setup(app)?;
            Ok(())
        })
        .on_window_event(|window, event| {
            if let WindowEvent::Destroyed = event {
                let Some(role) = WindowRole::from_label(window.label()) else {
                    return;
                };
                tracing::info!(window = %role, "window destroyed");
                let state = window.app_handle().state::<AppState>();
                if let Err(e) = state.window_destroyed(role) {
                    tracing::warn!(window = %role, error = %e, "window cleanup failed");
                }
            }
        })
        .invoke_handler(tauri::generate_handler![
            bridge::cmd_send,
            bridge::cmd_timer_state,
        ])
        .run(tauri::generate_context!())
        .unwrap_or_else(|e| {
            eprintln!("Tauri application error: {}", e);
            std::process::exit(1);
        });
}
