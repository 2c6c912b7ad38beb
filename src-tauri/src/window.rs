//! Tauri side of the window abstractions: webview windows as event channels
//! and the platform host the popout lifecycle drives.

use std::sync::Arc;

use tauri::{AppHandle, Emitter, Manager, WebviewUrl, WebviewWindow, WebviewWindowBuilder};
use termodoro_core::error::{ChannelError, WindowError};
use termodoro_core::{Event, PopoutOptions, WindowChannel, WindowHost, WindowRole};

/// A webview window addressed by its label.
pub struct TauriWindow {
    app: AppHandle,
    role: WindowRole,
}

impl TauriWindow {
    pub fn new(app: AppHandle, role: WindowRole) -> Self {
        Self { app, role }
    }
}

impl WindowChannel for TauriWindow {
    fn role(&self) -> WindowRole {
        self.role
    }

    fn is_alive(&self) -> bool {
        self.app.get_webview_window(self.role.label()).is_some()
    }

    fn send(&self, event: &Event) -> Result<(), ChannelError> {
        self.app
            .emit_to(self.role.label(), event.channel(), event.payload())
            .map_err(|e| ChannelError::Delivery {
                role: self.role,
                message: e.to_string(),
            })
    }
}

pub struct TauriHost {
    app: AppHandle,
}

impl TauriHost {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }

    fn window(&self, role: WindowRole) -> Result<WebviewWindow, WindowError> {
        self.app
            .get_webview_window(role.label())
            .ok_or(WindowError::NotFound(role))
    }
}

fn platform(role: WindowRole) -> impl Fn(tauri::Error) -> WindowError {
    move |e| WindowError::Platform {
        role,
        message: e.to_string(),
    }
}

impl WindowHost for TauriHost {
    fn open_popout(&self, options: &PopoutOptions) -> Result<Arc<dyn WindowChannel>, WindowError> {
        let role = WindowRole::Popout;
        let url = WebviewUrl::App(format!("index.html?window={}", role.label()).into());
        WebviewWindowBuilder::new(&self.app, role.label(), url)
            .title("Termodoro")
            .inner_size(options.width, options.height)
            .always_on_top(options.always_on_top)
            .resizable(false)
            .build()
            .map_err(platform(role))?;
        Ok(Arc::new(TauriWindow::new(self.app.clone(), role)))
    }

    fn close(&self, role: WindowRole) -> Result<(), WindowError> {
        self.window(role)?.close().map_err(platform(role))
    }

    fn is_minimized(&self, role: WindowRole) -> Result<bool, WindowError> {
        self.window(role)?.is_minimized().map_err(platform(role))
    }

    fn restore(&self, role: WindowRole) -> Result<(), WindowError> {
        let win = self.window(role)?;
        win.unminimize().map_err(platform(role))?;
        win.show().map_err(platform(role))
    }

    fn focus(&self, role: WindowRole) -> Result<(), WindowError> {
        let win = self.window(role)?;
        win.show().map_err(platform(role))?;
        win.set_focus().map_err(platform(role))
    }

    fn exit(&self) {
        self.app.exit(0);
    }
}
