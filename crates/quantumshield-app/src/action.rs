//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute.

use quantumshield_core::{ChatMessage, SessionId};

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Bring the most recent message into view.
    ScrollToLatest,

    /// Hand a message to the channel. Fire-and-forget.
    SendMessage {
        /// Payload, identical to the entry appended to the local log.
        payload: ChatMessage,
    },

    /// Start the stage timer for a freshly opened visualizer session.
    StartStageTimer {
        /// Session the ticks belong to.
        session: SessionId,
    },

    /// Cancel the stage timer of a session.
    CancelStageTimer {
        /// Session whose timer must stop.
        session: SessionId,
    },

    /// Quit the application.
    Quit,
}
