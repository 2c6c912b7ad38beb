use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;

use crate::error::ChannelError;
use crate::events::Event;

/// The two window contexts the application can render into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowRole {
    /// Full timer window; always present while the app runs.
    Primary,
    /// Compact always-on-top companion; at most one.
    Popout,
}

impl WindowRole {
    /// Window label used by the desktop host.
    pub fn label(self) -> &'static str {
        match self {
            WindowRole::Primary => "main",
            WindowRole::Popout => "popout",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "main" => Some(WindowRole::Primary),
            "popout" => Some(WindowRole::Popout),
            _ => None,
        }
    }
}

impl fmt::Display for WindowRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outbound half of the IPC link to one window context.
///
/// Sends are fire-and-forget. A window being torn down reports itself dead
/// through `is_alive` and may fail `send`; neither must affect delivery to
/// other windows.
pub trait WindowChannel: Send + Sync {
    fn role(&self) -> WindowRole;

    fn is_alive(&self) -> bool;

    /// # Errors
    ///
    /// Fails when the window is gone or the platform rejects the message.
    fn send(&self, event: &Event) -> Result<(), ChannelError>;
}

/// Window channel backed by an in-process queue; the receiving end is the
/// window's event loop.
#[derive(Debug, Clone)]
pub struct QueueWindow {
    role: WindowRole,
    tx: mpsc::UnboundedSender<Event>,
}

impl QueueWindow {
    pub fn new(role: WindowRole) -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { role, tx }, rx)
    }
}

impl WindowChannel for QueueWindow {
    fn role(&self) -> WindowRole {
        self.role
    }

    fn is_alive(&self) -> bool {
        !self.tx.is_closed()
    }

    fn send(&self, event: &Event) -> Result<(), ChannelError> {
        self.tx
            .send(event.clone())
            .map_err(|_| ChannelError::Closed { role: self.role })
    }
}
