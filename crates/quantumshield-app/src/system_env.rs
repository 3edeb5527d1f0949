//! Production Environment implementation using the tokio clock and thread RNG.
//!
//! Key bits are display-only, so the thread-local RNG is enough; nothing here
//! needs OS-grade entropy.

use std::time::Duration;

use quantumshield_core::Environment;
use rand::RngCore;

/// Production environment using real time and the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        rand::thread_rng().fill_bytes(buffer);
    }
}

#[cfg(test)]
mod tests {
    use quantumshield_core::{KEY_BIT_COUNT, KeyBits};

    use super::*;

    #[test]
    fn key_bits_have_full_width() {
        let bits = KeyBits::generate(&SystemEnv::new());
        assert_eq!(bits.len(), KEY_BIT_COUNT);
    }

    #[test]
    fn random_bytes_vary() {
        let env = SystemEnv::new();
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        env.random_bytes(&mut a);
        env.random_bytes(&mut b);

        assert_ne!(a, b, "Random bytes should differ");
    }

    #[tokio::test(start_paused = true)]
    async fn sleep_uses_tokio_clock() {
        let start = tokio::time::Instant::now();
        SystemEnv::new().sleep(Duration::from_millis(50)).await;
        assert!(start.elapsed() >= Duration::from_millis(50));
    }
}
