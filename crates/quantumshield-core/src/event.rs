//! Decoded events delivered by the channel.

use crate::ChatMessage;

/// Event emitted by the bidirectional chat channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// The channel established (or re-established) its connection.
    Connect,
    /// The channel lost its connection.
    Disconnect,
    /// A chat message relayed from another client.
    Message(ChatMessage),
}

impl ChannelEvent {
    /// Kind tag used for subscription filtering.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Connect => EventKind::Connect,
            Self::Disconnect => EventKind::Disconnect,
            Self::Message(_) => EventKind::Message,
        }
    }
}

/// Kind of a [`ChannelEvent`], without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// [`ChannelEvent::Connect`].
    Connect,
    /// [`ChannelEvent::Disconnect`].
    Disconnect,
    /// [`ChannelEvent::Message`].
    Message,
}

/// Set of event kinds a subscriber wants to receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventFilter {
    connect: bool,
    disconnect: bool,
    message: bool,
}

impl EventFilter {
    /// Connection lifecycle events only.
    pub const LIFECYCLE: Self = Self { connect: true, disconnect: true, message: false };

    /// Chat messages only.
    pub const MESSAGES: Self = Self { connect: false, disconnect: false, message: true };

    /// Every event kind.
    pub const ALL: Self = Self { connect: true, disconnect: true, message: true };

    /// Whether events of `kind` pass this filter.
    pub fn accepts(self, kind: EventKind) -> bool {
        match kind {
            EventKind::Connect => self.connect,
            EventKind::Disconnect => self.disconnect,
            EventKind::Message => self.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_filter_skips_messages() {
        let msg = ChannelEvent::Message(ChatMessage::remote("hi", "Bob"));
        assert!(!EventFilter::LIFECYCLE.accepts(msg.kind()));
        assert!(EventFilter::LIFECYCLE.accepts(EventKind::Connect));
        assert!(EventFilter::LIFECYCLE.accepts(EventKind::Disconnect));
    }

    #[test]
    fn message_filter_skips_lifecycle() {
        assert!(EventFilter::MESSAGES.accepts(EventKind::Message));
        assert!(!EventFilter::MESSAGES.accepts(EventKind::Connect));
    }
}
