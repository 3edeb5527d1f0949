//! Application layer for the QuantumShield chat client
//!
//! Pure state machine and generic runtime for UI and channel orchestration,
//! enabling deterministic simulation testing with the same code that runs in
//! production.
//!
//! # Components
//!
//! - [`App`]: UI state machine (draft input, message log, status, visualizer)
//! - [`ChannelHandle`]: shared chat channel with scoped [`Subscription`]s
//! - [`Transport`]: seam to the external relay connection, run by
//!   [`spawn_pump`]
//! - [`StageTimer`]: cancellable ticks for the key-exchange visualizer
//! - [`Driver`]: Trait for frontend I/O abstraction
//! - [`Runtime`]: Generic orchestration loop using Driver

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod channel;
mod config;
mod driver;
mod event;
mod input;
mod runtime;
mod system_env;
mod timer;
mod transport;

pub use action::AppAction;
pub use app::App;
pub use channel::{ChannelHandle, Outbox, Subscription, SubscriptionId};
pub use config::{ClientConfig, ConfigError, DEFAULT_ENDPOINT, DEFAULT_STAGE_INTERVAL};
pub use driver::Driver;
pub use event::AppEvent;
pub use input::KeyInput;
pub use runtime::Runtime;
pub use system_env::SystemEnv;
pub use timer::{StageTimer, TimerHandle};
pub use transport::{PumpHandle, Transport, TransportEvent, spawn_pump};
