//! Chat message type shared by the store and the wire codec.

use serde::{Deserialize, Serialize};

/// Sender label attached to messages typed on this client.
pub const LOCAL_SENDER: &str = "You";

/// A single chat message.
///
/// Messages are immutable once created. Ordering comes from the position in
/// the [`crate::MessageStore`] log; there are no timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Display text.
    pub text: String,
    /// Sender label. [`LOCAL_SENDER`] for messages typed on this client.
    pub sender: String,
}

impl ChatMessage {
    /// Build a message typed by the local user.
    ///
    /// Returns `None` if `text` is empty or whitespace-only. The accepted text
    /// is kept exactly as entered, surrounding whitespace included.
    pub fn local(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return None;
        }
        Some(Self { text, sender: LOCAL_SENDER.to_owned() })
    }

    /// Build a message as it arrived from the channel. No validation.
    pub fn remote(text: impl Into<String>, sender: impl Into<String>) -> Self {
        Self { text: text.into(), sender: sender.into() }
    }

    /// Whether this message carries the local sender label.
    pub fn is_local(&self) -> bool {
        self.sender == LOCAL_SENDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_rejects_blank_text() {
        assert!(ChatMessage::local("").is_none());
        assert!(ChatMessage::local("   ").is_none());
        assert!(ChatMessage::local("\t\n").is_none());
    }

    #[test]
    fn local_keeps_text_verbatim() {
        let msg = ChatMessage::local("  hi there ").unwrap();
        assert_eq!(msg.text, "  hi there ");
        assert_eq!(msg.sender, LOCAL_SENDER);
        assert!(msg.is_local());
    }

    #[test]
    fn remote_accepts_anything() {
        let msg = ChatMessage::remote("", "Bob");
        assert_eq!(msg.text, "");
        assert!(!msg.is_local());
    }
}
