//! Ordered message log with optimistic local appends.
//!
//! # Reconciliation
//!
//! Local messages are appended the moment they are submitted, before the
//! channel is asked to deliver them. Remote messages are appended verbatim as
//! they arrive. The two streams are never deduplicated against each other: the
//! channel is expected to relay a message to every client except its author.
//!
//! The log only grows. Nothing is ever retracted, including local messages
//! whose delivery later fails.

use crate::ChatMessage;

/// Append-only, insertion-ordered message log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageStore {
    log: Vec<ChatMessage>,
}

impl MessageStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Submit text typed by the local user.
    ///
    /// Blank text is dropped silently and returns `None`. Otherwise the
    /// message is appended and returned so the caller can hand the same
    /// payload to the channel.
    pub fn submit(&mut self, text: impl Into<String>) -> Option<ChatMessage> {
        let message = ChatMessage::local(text)?;
        self.log.push(message.clone());
        Some(message)
    }

    /// Append a message received from the channel, unchanged.
    pub fn on_remote_message(&mut self, payload: ChatMessage) {
        self.log.push(payload);
    }

    /// All messages in arrival order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.log
    }

    /// Most recently appended message. `None` if the log is empty.
    pub fn latest(&self) -> Option<&ChatMessage> {
        self.log.last()
    }

    /// Number of messages in the log.
    pub fn len(&self) -> usize {
        self.log.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }
}
