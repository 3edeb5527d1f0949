//! Transport seam and the pump that feeds the channel handle.
//!
//! The transport is an external collaborator: it owns the actual connection
//! to the relay and moves opaque frames. [`spawn_pump`] runs it on a tokio task,
//! decoding inbound frames into [`ChannelEvent`]s for the [`ChannelHandle`]
//! and writing frames from the [`Outbox`].

use std::future::Future;

use quantumshield_core::{ChannelEvent, Envelope};
use tokio::task::AbortHandle;

use crate::{ChannelHandle, Outbox};

/// Event surfaced by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Connection established.
    Connected,
    /// Connection lost. The transport may reconnect on its own.
    Disconnected,
    /// Encoded envelope from the relay.
    Frame(Vec<u8>),
}

/// Abstracts the bidirectional connection to the relay.
///
/// # Contract
///
/// The relay behind a transport MUST NOT deliver a client's own messages back
/// to that client. The message log does not deduplicate.
pub trait Transport: Send + 'static {
    /// Transport-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Open the connection to `endpoint`.
    ///
    /// Success is reported as a [`TransportEvent::Connected`] from
    /// [`Transport::recv`], not by this method returning.
    fn connect(&mut self, endpoint: &str) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Send an encoded frame to the relay.
    fn send(&mut self, frame: Vec<u8>) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Receive the next transport event.
    ///
    /// Returns `None` once the transport is permanently closed. Must be
    /// cancel safe.
    fn recv(&mut self) -> impl Future<Output = Option<TransportEvent>> + Send;
}

/// Handle to a running pump task. Dropping it stops the pump.
#[derive(Debug)]
pub struct PumpHandle {
    abort_handle: AbortHandle,
}

impl PumpHandle {
    /// Stop the pump.
    pub fn stop(&self) {
        self.abort_handle.abort();
    }

    /// Whether the pump task has exited.
    pub fn is_finished(&self) -> bool {
        self.abort_handle.is_finished()
    }
}

impl Drop for PumpHandle {
    fn drop(&mut self) {
        self.abort_handle.abort();
    }
}

/// Connect `transport` to `endpoint` and pump it on a new task.
///
/// Must be called within a tokio runtime. Connection failures and send
/// failures are logged; the pump never surfaces an error.
pub fn spawn_pump<T: Transport>(
    channel: ChannelHandle,
    outbox: Outbox,
    transport: T,
    endpoint: String,
) -> PumpHandle {
    let handle = tokio::spawn(run_pump(channel, outbox, transport, endpoint));
    PumpHandle { abort_handle: handle.abort_handle() }
}

async fn run_pump<T: Transport>(
    channel: ChannelHandle,
    mut outbox: Outbox,
    mut transport: T,
    endpoint: String,
) {
    if let Err(e) = transport.connect(&endpoint).await {
        tracing::warn!(%endpoint, error = %e, "transport failed to connect");
        return;
    }

    loop {
        tokio::select! {
            event = transport.recv() => match event {
                Some(TransportEvent::Connected) => {
                    channel.dispatch(&ChannelEvent::Connect);
                },
                Some(TransportEvent::Disconnected) => {
                    channel.dispatch(&ChannelEvent::Disconnect);
                },
                Some(TransportEvent::Frame(bytes)) => deliver_frame(&channel, &bytes),
                None => {
                    tracing::info!(%endpoint, "transport closed");
                    channel.dispatch(&ChannelEvent::Disconnect);
                    break;
                },
            },
            Some(frame) = outbox.recv() => {
                if let Err(e) = transport.send(frame).await {
                    tracing::debug!(error = %e, "send failed, message not delivered");
                }
            },
        }
    }
}

fn deliver_frame(channel: &ChannelHandle, bytes: &[u8]) {
    let message =
        Envelope::decode(bytes).and_then(|envelope| envelope.into_message(channel.message_event()));

    match message {
        Ok(message) => {
            channel.dispatch(&ChannelEvent::Message(message));
        },
        Err(e) if e.is_foreign() => tracing::debug!(error = %e, "ignoring frame"),
        Err(e) => tracing::warn!(error = %e, "dropping malformed frame"),
    }
}
