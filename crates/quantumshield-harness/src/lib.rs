//! Deterministic simulation harness for the QuantumShield chat client.
//!
//! Simulation implementations of the Environment, Transport and Driver traits
//! for reproducible testing on tokio's paused clock.
//!
//! - [`SimEnv`]: seeded randomness, tokio sleep
//! - [`SimHub`] / [`SimTransport`]: in-memory relay that never echoes a frame
//!   to its sender
//! - [`SimDriver`] / [`SimInput`]: scripted input, recorded renders
//!
//! [`InvariantRegistry::standard()`] collects the App invariants; attach it to
//! a driver with [`SimDriver::with_invariants`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod sim_driver;
pub mod sim_env;
pub mod sim_hub;

pub use invariants::{
    AppSnapshot, EncryptedIffComplete, Invariant, InvariantKind, InvariantRegistry,
    InvariantResult, KeyBitsWidth, LogOnlyGrows, ProgressMatchesTicks, StageMonotonicity,
    Violation, VisualizerSnapshot,
};
pub use sim_driver::{SimDriver, SimDriverError, SimInput};
pub use sim_env::{DEFAULT_SEED, SimEnv};
pub use sim_hub::{ClientId, Delivery, SimHub, SimTransport, SimTransportError};
