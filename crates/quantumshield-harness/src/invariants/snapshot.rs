//! Owned copies of what the user can see of an App.

use quantumshield_app::App;
use quantumshield_core::{ConnectionStatus, Environment, KeyExchange};

/// Snapshot of one visualizer session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualizerSnapshot {
    /// Raw session number.
    pub session: u64,
    /// Ticks applied since the session opened.
    pub ticks: usize,
    /// Current stage index.
    pub stage_index: usize,
    /// Progress in percent.
    pub progress: u8,
    /// Phase label shown to the user.
    pub label: &'static str,
    /// Key bits shown to the user.
    pub key_bits: String,
    /// Whether the session reached the encrypted state.
    pub encrypted: bool,
}

impl VisualizerSnapshot {
    /// Capture a key-exchange session.
    pub fn capture(kx: &KeyExchange) -> Self {
        Self {
            session: kx.session().get(),
            ticks: kx.ticks(),
            stage_index: kx.stage_index(),
            progress: kx.progress_percent(),
            label: kx.phase_label(),
            key_bits: kx.key_bits().as_str().to_owned(),
            encrypted: kx.is_encrypted(),
        }
    }
}

/// Snapshot of the App's observable state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppSnapshot {
    /// Connection status.
    pub status: ConnectionStatus,
    /// Number of messages in the log.
    pub message_count: usize,
    /// Number of messages with the local sender label.
    pub local_count: usize,
    /// Open visualizer. `None` while closed.
    pub visualizer: Option<VisualizerSnapshot>,
}

impl AppSnapshot {
    /// Create an empty snapshot, matching a freshly constructed App.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Capture the observable state of `app`.
    pub fn capture<E: Environment>(app: &App<E>) -> Self {
        Self {
            status: app.connection_status(),
            message_count: app.messages().len(),
            local_count: app.messages().iter().filter(|m| m.is_local()).count(),
            visualizer: app.visualizer().map(VisualizerSnapshot::capture),
        }
    }

    /// Override the message count (for invariant tests).
    #[must_use]
    pub fn with_message_count(mut self, count: usize) -> Self {
        self.message_count = count;
        self
    }

    /// Override the visualizer (for invariant tests).
    #[must_use]
    pub fn with_visualizer(mut self, visualizer: Option<VisualizerSnapshot>) -> Self {
        self.visualizer = visualizer;
        self
    }
}
