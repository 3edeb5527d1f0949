//! Error types for the QuantumShield client core.
//!
//! Only the wire codec can fail. Input validation is not an error: blank
//! messages are dropped without a signal.

use thiserror::Error;

/// Errors that can occur while encoding or decoding channel frames.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    /// Envelope could not be serialized.
    #[error("failed to encode envelope: {0}")]
    Encode(String),

    /// Frame bytes are not a valid envelope.
    #[error("failed to decode envelope: {0}")]
    Decode(String),

    /// Envelope names an event this client does not handle.
    #[error("unknown event: {0}")]
    UnknownEvent(String),

    /// Message event arrived without a payload.
    #[error("event {0} carries no payload")]
    MissingPayload(String),
}

impl WireError {
    /// Returns true if the frame was well-formed but not meant for us.
    ///
    /// Unknown events are expected when the relay carries traffic for other
    /// features. Codec failures point at a broken peer.
    pub fn is_foreign(&self) -> bool {
        matches!(self, Self::UnknownEvent(_))
    }
}
