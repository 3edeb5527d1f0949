//! Environment abstraction for deterministic testing.
//!
//! Decouples client logic from system resources (randomness, timers). Enables
//! deterministic simulation (paused clock, seeded RNG) and production use with
//! real system resources.

use std::time::Duration;

/// Abstract environment providing randomness and async sleeping.
///
/// # Invariants
///
/// Implementations MUST guarantee:
///
/// - Given the same seed, a simulation environment produces the same sequence
///   of random bytes
/// - `sleep()` completes no earlier than the requested duration on the clock
///   the implementation is bound to
pub trait Environment: Clone + Send + Sync + 'static {
    /// Sleeps for the specified duration.
    ///
    /// This is the ONLY async method in the trait, and it should only be used
    /// by scheduling code (not by the state machines themselves).
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;

    /// Fills the provided buffer with random bytes.
    ///
    /// Randomness is used for display only. Implementations are not required
    /// to be cryptographically secure.
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Generates a random `u32`.
    fn random_u32(&self) -> u32 {
        let mut bytes = [0u8; 4];
        self.random_bytes(&mut bytes);
        u32::from_be_bytes(bytes)
    }
}
