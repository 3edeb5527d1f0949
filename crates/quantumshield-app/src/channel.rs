//! Shared handle to the chat channel.
//!
//! One [`ChannelHandle`] is built at startup and cloned into every consumer.
//! Consumers receive events through a [`Subscription`], a guard that removes
//! its handler when dropped, so a view that unmounts on any path (return,
//! error, panic unwind) can never leave a duplicate handler behind.
//!
//! Outbound messages are encoded and queued on the [`Outbox`], which the
//! transport pump drains. Sending never blocks and never reports delivery.

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use quantumshield_core::{ChannelEvent, ChatMessage, Envelope, EventFilter};
use tokio::sync::mpsc;

/// Identifies one live subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscriber {
    id: SubscriptionId,
    filter: EventFilter,
    sender: mpsc::UnboundedSender<ChannelEvent>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Cloneable handle to the single chat channel.
#[derive(Clone)]
pub struct ChannelHandle {
    registry: Arc<Mutex<Registry>>,
    outbound: mpsc::UnboundedSender<Vec<u8>>,
    message_event: Arc<str>,
}

impl std::fmt::Debug for ChannelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelHandle")
            .field("message_event", &self.message_event)
            .field("subscribers", &self.subscriber_count())
            .finish_non_exhaustive()
    }
}

impl ChannelHandle {
    /// Create a handle and the outbox its sends are queued on.
    pub fn new(message_event: impl Into<String>) -> (Self, Outbox) {
        let (outbound, rx) = mpsc::unbounded_channel();
        let message_event: String = message_event.into();
        let handle = Self {
            registry: Arc::new(Mutex::new(Registry::default())),
            outbound,
            message_event: message_event.into(),
        };
        (handle, Outbox { rx })
    }

    /// Register a handler for the event kinds in `filter`.
    ///
    /// The handler lives exactly as long as the returned guard.
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut registry = lock(&self.registry);
        let id = SubscriptionId(registry.next_id);
        registry.next_id += 1;
        registry.subscribers.push(Subscriber { id, filter, sender });
        drop(registry);

        tracing::trace!(?id, "subscribed");
        Subscription { id, receiver, registry: Arc::downgrade(&self.registry) }
    }

    /// Deliver an inbound event to every matching subscriber.
    ///
    /// Returns the number of subscribers the event reached.
    pub fn dispatch(&self, event: &ChannelEvent) -> usize {
        let kind = event.kind();
        let registry = lock(&self.registry);
        registry
            .subscribers
            .iter()
            .filter(|s| s.filter.accepts(kind))
            .filter(|s| s.sender.send(event.clone()).is_ok())
            .count()
    }

    /// Queue a chat message for delivery under the configured event name.
    ///
    /// Fire-and-forget: encoding or queueing failures are logged, never
    /// returned.
    pub fn send(&self, payload: ChatMessage) {
        let frame = match Envelope::message(self.message_event.as_ref(), payload).encode() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!(error = %e, "dropping outbound message");
                return;
            },
        };

        if self.outbound.send(frame).is_err() {
            tracing::debug!("outbox closed, dropping outbound message");
        }
    }

    /// Event name used for chat messages.
    pub fn message_event(&self) -> &str {
        &self.message_event
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        lock(&self.registry).subscribers.len()
    }
}

/// Scoped event subscription. Dropping it unsubscribes.
pub struct Subscription {
    id: SubscriptionId,
    receiver: mpsc::UnboundedReceiver<ChannelEvent>,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// Wait for the next event. `None` once the channel handle is gone.
    ///
    /// Cancel safe.
    pub async fn recv(&mut self) -> Option<ChannelEvent> {
        self.receiver.recv().await
    }

    /// Next event if one is already queued.
    pub fn try_recv(&mut self) -> Option<ChannelEvent> {
        self.receiver.try_recv().ok()
    }

    /// Identifier of this subscription.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).subscribers.retain(|s| s.id != self.id);
            tracing::trace!(id = ?self.id, "unsubscribed");
        }
    }
}

/// Receiving end of the outbound frame queue.
pub struct Outbox {
    rx: mpsc::UnboundedReceiver<Vec<u8>>,
}

impl Outbox {
    /// Wait for the next encoded frame. `None` once every handle is dropped.
    ///
    /// Cancel safe.
    pub async fn recv(&mut self) -> Option<Vec<u8>> {
        self.rx.recv().await
    }

    /// Next frame if one is already queued.
    pub fn try_recv(&mut self) -> Option<Vec<u8>> {
        self.rx.try_recv().ok()
    }
}
