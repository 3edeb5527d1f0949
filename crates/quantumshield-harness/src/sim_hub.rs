//! In-memory relay for simulation.
//!
//! [`SimHub`] plays the role of the chat relay: every frame a client sends is
//! broadcast to all other connected clients, never back to the sender. Each
//! client talks to the hub through a [`SimTransport`], which implements the
//! production [`Transport`] trait so the real pump runs unchanged.
//!
//! Tests steer the network through the hub: drop and restore connections,
//! inject raw frames, or make a client's sends fail.

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use quantumshield_app::{Transport, TransportEvent};
use tokio::sync::mpsc;

/// Identifies a client attached to the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClientId(u64);

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "client-{}", self.0)
    }
}

/// Error surfaced by a [`SimTransport`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimTransportError {
    /// Frame sent while the client was disconnected.
    #[error("{0} is not connected")]
    NotConnected(ClientId),

    /// Send rejected by [`SimHub::fail_sends`].
    #[error("send from {0} rejected")]
    SendRejected(ClientId),

    /// Connection refused by [`SimHub::refuse_connections`].
    #[error("connection to {endpoint} refused")]
    Refused {
        /// Endpoint the client dialed.
        endpoint: String,
    },
}

/// Frame relayed between two clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Sending client.
    pub from: ClientId,
    /// Receiving client.
    pub to: ClientId,
    /// Encoded envelope.
    pub frame: Vec<u8>,
}

struct Peer {
    events: mpsc::UnboundedSender<TransportEvent>,
    connected: bool,
    fail_sends: bool,
}

#[derive(Default)]
struct HubState {
    next_id: u64,
    peers: BTreeMap<ClientId, Peer>,
    deliveries: Vec<Delivery>,
    rejected: usize,
    refuse_connections: bool,
}

/// Shared in-memory relay.
#[derive(Clone, Default)]
pub struct SimHub {
    state: Arc<Mutex<HubState>>,
}

impl std::fmt::Debug for SimHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("SimHub")
            .field("peers", &state.peers.len())
            .field("deliveries", &state.deliveries.len())
            .finish_non_exhaustive()
    }
}

impl SimHub {
    /// Create an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Attach a new client. It stays offline until its transport connects.
    pub fn transport(&self) -> SimTransport {
        let (events, rx) = mpsc::unbounded_channel();
        let mut state = self.lock();
        let id = ClientId(state.next_id);
        state.next_id += 1;
        state.peers.insert(id, Peer { events, connected: false, fail_sends: false });

        SimTransport { id, hub: self.clone(), events: rx }
    }

    /// Drop a client's connection without closing its transport.
    pub fn disconnect(&self, client: ClientId) {
        self.set_connected(client, false, TransportEvent::Disconnected);
    }

    /// Restore a client's connection.
    pub fn reconnect(&self, client: ClientId) {
        self.set_connected(client, true, TransportEvent::Connected);
    }

    fn set_connected(&self, client: ClientId, connected: bool, event: TransportEvent) {
        let mut state = self.lock();
        if let Some(peer) = state.peers.get_mut(&client) {
            tracing::debug!(%client, connected, "link changed");
            peer.connected = connected;
            let _ = peer.events.send(event);
        }
    }

    /// Close a client's transport for good.
    pub fn close(&self, client: ClientId) {
        if self.lock().peers.remove(&client).is_some() {
            tracing::debug!(%client, "transport closed");
        }
    }

    /// Deliver `frame` to `client` as if the relay had sent it.
    pub fn inject_frame(&self, client: ClientId, frame: Vec<u8>) {
        let state = self.lock();
        if let Some(peer) = state.peers.get(&client) {
            let _ = peer.events.send(TransportEvent::Frame(frame));
        }
    }

    /// Make every send from `client` fail while `enabled`.
    pub fn fail_sends(&self, client: ClientId, enabled: bool) {
        if let Some(peer) = self.lock().peers.get_mut(&client) {
            peer.fail_sends = enabled;
        }
    }

    /// Refuse new connections while `enabled`.
    pub fn refuse_connections(&self, enabled: bool) {
        self.lock().refuse_connections = enabled;
    }

    /// Whether `client` is currently connected.
    pub fn is_connected(&self, client: ClientId) -> bool {
        self.lock().peers.get(&client).is_some_and(|p| p.connected)
    }

    /// Every frame relayed so far, in delivery order.
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.lock().deliveries.clone()
    }

    /// Number of sends that failed.
    pub fn rejected_sends(&self) -> usize {
        self.lock().rejected
    }

    fn connect(&self, client: ClientId, endpoint: &str) -> Result<(), SimTransportError> {
        let mut state = self.lock();
        if state.refuse_connections {
            tracing::debug!(%client, endpoint, "connection refused");
            return Err(SimTransportError::Refused { endpoint: endpoint.to_owned() });
        }
        if let Some(peer) = state.peers.get_mut(&client) {
            tracing::debug!(%client, endpoint, "connected");
            peer.connected = true;
            let _ = peer.events.send(TransportEvent::Connected);
        }
        Ok(())
    }

    fn relay(&self, from: ClientId, frame: Vec<u8>) -> Result<(), SimTransportError> {
        let mut state = self.lock();
        let error = match state.peers.get(&from) {
            Some(peer) if !peer.connected => Some(SimTransportError::NotConnected(from)),
            Some(peer) if peer.fail_sends => Some(SimTransportError::SendRejected(from)),
            Some(_) => None,
            None => Some(SimTransportError::NotConnected(from)),
        };
        if let Some(error) = error {
            tracing::debug!(%from, %error, "send rejected");
            state.rejected += 1;
            return Err(error);
        }

        let recipients: Vec<ClientId> = state
            .peers
            .iter()
            .filter(|(id, peer)| **id != from && peer.connected)
            .map(|(id, _)| *id)
            .collect();

        tracing::debug!(
            %from,
            bytes = frame.len(),
            recipients = recipients.len(),
            "relaying frame"
        );
        for to in recipients {
            if let Some(peer) = state.peers.get(&to) {
                let _ = peer.events.send(TransportEvent::Frame(frame.clone()));
            }
            state.deliveries.push(Delivery { from, to, frame: frame.clone() });
        }
        Ok(())
    }
}

/// One client's connection to a [`SimHub`].
pub struct SimTransport {
    id: ClientId,
    hub: SimHub,
    events: mpsc::UnboundedReceiver<TransportEvent>,
}

impl std::fmt::Debug for SimTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimTransport").field("id", &self.id).finish_non_exhaustive()
    }
}

impl SimTransport {
    /// Hub-assigned client id.
    pub fn id(&self) -> ClientId {
        self.id
    }
}

impl Transport for SimTransport {
    type Error = SimTransportError;

    async fn connect(&mut self, endpoint: &str) -> Result<(), Self::Error> {
        self.hub.connect(self.id, endpoint)
    }

    async fn send(&mut self, frame: Vec<u8>) -> Result<(), Self::Error> {
        self.hub.relay(self.id, frame)
    }

    async fn recv(&mut self) -> Option<TransportEvent> {
        self.events.recv().await
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl CapturedLog {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn relay_excludes_sender() {
        let hub = SimHub::new();
        let mut alice = hub.transport();
        let mut bob = hub.transport();
        alice.connect("sim").await.unwrap();
        bob.connect("sim").await.unwrap();
        assert_eq!(alice.recv().await, Some(TransportEvent::Connected));
        assert_eq!(bob.recv().await, Some(TransportEvent::Connected));

        alice.send(vec![1, 2, 3]).await.unwrap();

        assert_eq!(bob.recv().await, Some(TransportEvent::Frame(vec![1, 2, 3])));
        assert!(alice.events.try_recv().is_err());
        assert_eq!(hub.deliveries(), vec![Delivery {
            from: alice.id(),
            to: bob.id(),
            frame: vec![1, 2, 3]
        }]);
    }

    #[tokio::test]
    async fn offline_peers_miss_frames() {
        let hub = SimHub::new();
        let mut alice = hub.transport();
        let bob = hub.transport();
        alice.connect("sim").await.unwrap();

        alice.send(vec![9]).await.unwrap();

        assert!(!hub.is_connected(bob.id()));
        assert!(hub.deliveries().is_empty());
    }

    #[tokio::test]
    async fn send_while_disconnected_fails() {
        let hub = SimHub::new();
        let mut alice = hub.transport();
        alice.connect("sim").await.unwrap();
        hub.disconnect(alice.id());

        let result = alice.send(vec![1]).await;

        assert_eq!(result, Err(SimTransportError::NotConnected(alice.id())));
        assert_eq!(hub.rejected_sends(), 1);
    }

    #[tokio::test]
    async fn fail_sends_rejects_until_cleared() {
        let hub = SimHub::new();
        let mut alice = hub.transport();
        alice.connect("sim").await.unwrap();

        hub.fail_sends(alice.id(), true);
        assert!(alice.send(vec![1]).await.is_err());

        hub.fail_sends(alice.id(), false);
        assert!(alice.send(vec![1]).await.is_ok());
    }

    #[tokio::test]
    async fn close_ends_the_stream() {
        let hub = SimHub::new();
        let mut alice = hub.transport();

        hub.close(alice.id());

        assert_eq!(alice.recv().await, None);
    }

    #[tokio::test]
    async fn refused_connection_reports_endpoint() {
        let hub = SimHub::new();
        let mut alice = hub.transport();
        hub.refuse_connections(true);

        let err = alice.connect("sim://relay").await.unwrap_err();
        assert_eq!(err, SimTransportError::Refused { endpoint: "sim://relay".into() });
    }

    #[test]
    fn rejected_sends_and_closes_are_logged() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let hub = SimHub::new();
        let alice = hub.transport();
        tracing::subscriber::with_default(subscriber, || {
            assert!(hub.relay(alice.id(), vec![1]).is_err());
            hub.close(alice.id());
        });

        let output = log.contents();
        assert!(output.contains("send rejected"), "{output}");
        assert!(output.contains("transport closed"), "{output}");
        assert!(output.contains("client-0"), "{output}");
    }
}
