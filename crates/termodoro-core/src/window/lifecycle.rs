//! Popout window lifecycle.
//!
//! The manager tracks whether the popout exists, asks the platform host to
//! create, close, restore and focus windows, and keeps the store's window
//! registry and the primary window informed as the popout comes and goes.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::channel::{WindowChannel, WindowRole};
use crate::error::{CoreError, Result, WindowError};
use crate::events::{Event, WindowCommand};
use crate::store::StoreHandle;

/// Geometry and stacking of the popout window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopoutOptions {
    pub width: f64,
    pub height: f64,
    pub always_on_top: bool,
}

impl Default for PopoutOptions {
    fn default() -> Self {
        Self {
            width: 300.0,
            height: 200.0,
            always_on_top: true,
        }
    }
}

/// Platform side of window management.
pub trait WindowHost: Send {
    /// Create the popout window and return the channel that reaches it.
    fn open_popout(&self, options: &PopoutOptions) -> Result<Arc<dyn WindowChannel>, WindowError>;

    fn close(&self, role: WindowRole) -> Result<(), WindowError>;

    fn is_minimized(&self, role: WindowRole) -> Result<bool, WindowError>;

    /// Un-minimize and show the window.
    fn restore(&self, role: WindowRole) -> Result<(), WindowError>;

    /// Give the window keyboard focus and raise it above other applications.
    fn focus(&self, role: WindowRole) -> Result<(), WindowError>;

    /// Terminate the application.
    fn exit(&self);
}

pub struct WindowLifecycle<H: WindowHost> {
    host: H,
    store: StoreHandle,
    options: PopoutOptions,
    popout_open: bool,
}

impl<H: WindowHost> WindowLifecycle<H> {
    pub fn new(host: H, store: StoreHandle, options: PopoutOptions) -> Self {
        Self {
            host,
            store,
            options,
            popout_open: false,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn has_popout(&self) -> bool {
        self.popout_open
    }

    /// The window that should receive attention: the popout when open.
    pub fn active_role(&self) -> WindowRole {
        if self.popout_open {
            WindowRole::Popout
        } else {
            WindowRole::Primary
        }
    }

    pub fn handle(&mut self, command: WindowCommand) -> Result<()> {
        match command {
            WindowCommand::CreatePopout => self.create_secondary_window(),
            WindowCommand::ClosePopout => self.close_secondary_window(),
            WindowCommand::ActivateWindow => self.activate(),
            WindowCommand::QuitApp => {
                self.quit();
                Ok(())
            }
        }
    }

    /// Open the popout, or focus it if it is already open.
    pub fn create_secondary_window(&mut self) -> Result<()> {
        if self.popout_open {
            tracing::debug!("popout already open, focusing it");
            return self.activate();
        }

        tracing::info!(
            width = self.options.width,
            height = self.options.height,
            "creating popout window"
        );
        let channel = self.host.open_popout(&self.options)?;
        self.popout_open = true;
        self.store.attach(channel)?;
        self.store
            .notify(WindowRole::Primary, Event::PopoutStatus(true))?;
        Ok(())
    }

    /// Close the popout if it is open.
    pub fn close_secondary_window(&mut self) -> Result<()> {
        if !self.popout_open {
            return Ok(());
        }
        if let Err(err) = self.host.close(WindowRole::Popout) {
            // Already gone on the platform side; finish the bookkeeping anyway.
            tracing::warn!(error = %err, "closing popout failed");
        }
        self.handle_secondary_closed()
    }

    /// Record that the popout went away, however that happened. Tells the
    /// primary window and brings it back to the foreground. Safe to call
    /// more than once.
    pub fn handle_secondary_closed(&mut self) -> Result<()> {
        if !self.popout_open {
            return Ok(());
        }
        self.popout_open = false;
        tracing::info!("popout closed");

        self.store.detach(WindowRole::Popout)?;
        self.store
            .notify(WindowRole::Primary, Event::PopoutStatus(false))?;
        self.store.notify(WindowRole::Primary, Event::PopoutClosed)?;
        self.activate()
    }

    /// The primary window went away; the popout follows it.
    pub fn handle_primary_closed(&mut self) -> Result<()> {
        if self.popout_open {
            if let Err(err) = self.host.close(WindowRole::Popout) {
                tracing::warn!(error = %err, "closing popout with primary failed");
            }
            self.popout_open = false;
            self.store.detach(WindowRole::Popout)?;
        }
        self.store.detach(WindowRole::Primary)
    }

    /// Bring the window holding attention to the foreground, restoring it
    /// first if minimized.
    pub fn activate(&mut self) -> Result<()> {
        let role = self.active_role();
        if self.host.is_minimized(role)? {
            self.host.restore(role)?;
        }
        self.host.focus(role)?;
        tracing::debug!(window = %role, "window activated");
        Ok(())
    }

    /// Stop the store and exit the application.
    pub fn quit(&mut self) {
        tracing::info!("quitting");
        match self.store.shutdown() {
            Ok(()) | Err(CoreError::StoreClosed) => {}
            Err(err) => tracing::warn!(error = %err, "store shutdown failed"),
        }
        self.host.exit();
    }
}
