//! Core state machines for the QuantumShield chat client.
//!
//! Everything in this crate is pure: no I/O, no clocks, no global state. Time
//! arrives as explicit ticks and randomness through the [`Environment`] trait,
//! so the same code runs in production and in deterministic simulation.
//!
//! # Components
//!
//! - [`ConnectionMonitor`]: connect/disconnect status driven by channel events
//! - [`MessageStore`]: append-only log with optimistic local appends
//! - [`KeyExchange`]: staged key-exchange visualization
//! - [`Envelope`]: CBOR frame codec for chat payloads

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod connection;
pub mod env;
pub mod error;
pub mod event;
pub mod key_exchange;
pub mod message;
pub mod store;
pub mod wire;

pub use connection::{ConnectionMonitor, ConnectionStatus};
pub use env::Environment;
pub use error::WireError;
pub use event::{ChannelEvent, EventFilter, EventKind};
pub use key_exchange::{
    KEY_BIT_COUNT, KeyBits, KeyExchange, KeyExchangePhase, STAGE_COUNT, SessionId, Stage,
    TickOutcome,
};
pub use message::{ChatMessage, LOCAL_SENDER};
pub use store::MessageStore;
pub use wire::{Envelope, MESSAGE_EVENT};
