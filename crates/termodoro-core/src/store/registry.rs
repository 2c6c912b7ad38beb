use std::collections::BTreeMap;
use std::sync::Arc;

use crate::events::Event;
use crate::window::{WindowChannel, WindowRole};

/// Attached window contexts, at most one per role.
#[derive(Default)]
pub struct WindowRegistry {
    windows: BTreeMap<WindowRole, Arc<dyn WindowChannel>>,
}

impl WindowRegistry {
    /// Attach a window, replacing any previous channel for the same role.
    pub fn attach(&mut self, channel: Arc<dyn WindowChannel>) {
        self.windows.insert(channel.role(), channel);
    }

    pub fn detach(&mut self, role: WindowRole) -> bool {
        self.windows.remove(&role).is_some()
    }

    pub fn is_attached(&self, role: WindowRole) -> bool {
        self.windows.contains_key(&role)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Send to a single window. Returns whether it was delivered.
    pub fn send_to(&mut self, role: WindowRole, event: &Event) -> bool {
        let Some(channel) = self.windows.get(&role) else {
            tracing::debug!(window = %role, event = event.channel(), "no such window attached");
            return false;
        };
        if !channel.is_alive() {
            tracing::debug!(window = %role, "dropping closed window");
            self.windows.remove(&role);
            return false;
        }
        match channel.send(event) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(window = %role, error = %err, "event delivery failed");
                false
            }
        }
    }

    /// Send to every attached window except `exclude`. Closed windows are
    /// skipped and forgotten; a failed send never stops delivery to the rest.
    /// Returns the number of windows reached.
    pub fn send_all(&mut self, event: &Event, exclude: Option<WindowRole>) -> usize {
        let mut delivered = 0;
        let mut dead = Vec::new();
        for (role, channel) in &self.windows {
            if Some(*role) == exclude {
                continue;
            }
            if !channel.is_alive() {
                dead.push(*role);
                continue;
            }
            match channel.send(event) {
                Ok(()) => delivered += 1,
                Err(err) => {
                    tracing::warn!(window = %role, error = %err, "event delivery failed");
                }
            }
        }
        for role in dead {
            tracing::debug!(window = %role, "dropping closed window");
            self.windows.remove(&role);
        }
        delivered
    }
}
