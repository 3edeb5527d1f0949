//! Application input events.
//!
//! This module defines [`AppEvent`], the set of inputs that drive the
//! [`crate::App`] state machine.
//!
//! Events originate from three sources:
//! - User interactions (keyboard, visualizer open/close, form submit).
//! - Channel notifications delivered through a [`crate::Subscription`].
//! - Stage timer ticks from a [`crate::StageTimer`].

use quantumshield_core::{ChannelEvent, SessionId};

use crate::KeyInput;

/// Events processed by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Keyboard input.
    Key(KeyInput),

    /// Submit text directly, bypassing the draft buffer.
    Submit {
        /// Text as entered.
        text: String,
    },

    /// Event from the chat channel.
    Channel(ChannelEvent),

    /// User opened the key-exchange visualizer.
    OpenVisualizer,

    /// User closed the key-exchange visualizer.
    CloseVisualizer,

    /// Stage timer fired.
    StageTick {
        /// Session that scheduled the tick.
        session: SessionId,
    },

    /// User asked to quit.
    Quit,
}
