//! Connection status tracking.
//!
//! The monitor is driven exclusively by channel lifecycle events. Application
//! code can read the status but never set it.

use crate::ChannelEvent;

/// Whether the channel currently has a live connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// No connection. Initial state.
    #[default]
    Disconnected,
    /// Connection established.
    Connected,
}

impl ConnectionStatus {
    /// `true` for [`ConnectionStatus::Connected`].
    pub fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

/// Tracks the channel's connect/disconnect lifecycle.
#[derive(Debug, Clone, Default)]
pub struct ConnectionMonitor {
    status: ConnectionStatus,
}

impl ConnectionMonitor {
    /// Create a monitor in the [`ConnectionStatus::Disconnected`] state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a channel event. Message events are ignored.
    ///
    /// Returns `true` if the status changed.
    pub fn observe(&mut self, event: &ChannelEvent) -> bool {
        let next = match event {
            ChannelEvent::Connect => ConnectionStatus::Connected,
            ChannelEvent::Disconnect => ConnectionStatus::Disconnected,
            ChannelEvent::Message(_) => return false,
        };

        if next == self.status {
            return false;
        }

        tracing::info!(from = ?self.status, to = ?next, "connection status changed");
        self.status = next;
        true
    }

    /// Current status.
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }
}
