//! Frame codec for chat payloads.
//!
//! Every frame on the channel is a CBOR-encoded [`Envelope`]: an event name
//! plus an optional `{text, sender}` payload. Connection lifecycle is signalled
//! by the transport itself, so in practice only message envelopes travel as
//! frames.

use serde::{Deserialize, Serialize};

use crate::{ChatMessage, error::WireError};

/// Default event name for chat messages.
pub const MESSAGE_EVENT: &str = "message";

/// Named event with an optional chat payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Event name.
    pub event: String,
    /// Chat payload. `None` for events without one.
    pub payload: Option<ChatMessage>,
}

impl Envelope {
    /// Envelope carrying a chat message under `event`.
    pub fn message(event: impl Into<String>, payload: ChatMessage) -> Self {
        Self { event: event.into(), payload: Some(payload) }
    }

    /// Serialize to CBOR bytes.
    pub fn encode(&self) -> Result<Vec<u8>, WireError> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf).map_err(|e| WireError::Encode(e.to_string()))?;
        Ok(buf)
    }

    /// Parse CBOR bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        ciborium::from_reader(bytes).map_err(|e| WireError::Decode(e.to_string()))
    }

    /// Extract the chat payload, checking the event name.
    ///
    /// # Errors
    ///
    /// - [`WireError::UnknownEvent`] if `event` differs from `message_event`
    /// - [`WireError::MissingPayload`] if the envelope has no payload
    pub fn into_message(self, message_event: &str) -> Result<ChatMessage, WireError> {
        if self.event != message_event {
            return Err(WireError::UnknownEvent(self.event));
        }
        self.payload.ok_or(WireError::MissingPayload(self.event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_survives_codec() {
        let envelope = Envelope::message(MESSAGE_EVENT, ChatMessage::remote("hi", "Bob"));
        let bytes = envelope.encode().unwrap();
        let decoded = Envelope::decode(&bytes).unwrap();

        assert_eq!(decoded.into_message(MESSAGE_EVENT), Ok(ChatMessage::remote("hi", "Bob")));
    }

    #[test]
    fn garbage_fails_to_decode() {
        let err = Envelope::decode(&[0xff, 0x00, 0x13]).unwrap_err();
        assert!(matches!(err, WireError::Decode(_)));
    }

    #[test]
    fn other_event_names_are_rejected() {
        let envelope = Envelope::message("user_joined", ChatMessage::remote("x", "y"));
        assert_eq!(
            envelope.into_message(MESSAGE_EVENT),
            Err(WireError::UnknownEvent("user_joined".into()))
        );
    }

    #[test]
    fn missing_payload_is_rejected() {
        let envelope = Envelope { event: MESSAGE_EVENT.into(), payload: None };
        assert_eq!(
            envelope.into_message(MESSAGE_EVENT),
            Err(WireError::MissingPayload(MESSAGE_EVENT.into()))
        );
    }
}
