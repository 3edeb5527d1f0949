//! Driver trait for abstracting presentation I/O.
//!
//! The [`Driver`] trait decouples the application runtime from a specific
//! frontend. Each frontend implements the trait to provide user input and
//! rendering, while the generic [`crate::Runtime`] handles all orchestration.

use std::future::Future;

use quantumshield_core::Environment;

use crate::{App, AppEvent};

/// Abstracts presentation I/O for the application runtime.
///
/// Implementations provide input and rendering while the generic
/// [`Runtime`](crate::Runtime) handles orchestration logic. This ensures the
/// same orchestration code runs in a real frontend and in simulation.
pub trait Driver: Send {
    /// Frontend-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Poll for the next input event.
    ///
    /// Returns an event or `None` if nothing is ready. Must be cancel safe:
    /// the runtime races it against channel events and timer ticks.
    fn poll_input(&mut self) -> impl Future<Output = Result<Option<AppEvent>, Self::Error>> + Send;

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render<E: Environment>(&mut self, app: &App<E>) -> Result<(), Self::Error>;

    /// Bring the most recent message into view.
    ///
    /// # Errors
    ///
    /// Returns an error if the view cannot be updated.
    fn scroll_to_latest<E: Environment>(&mut self, app: &App<E>) -> Result<(), Self::Error>;

    /// Tear down the frontend.
    fn stop(&mut self);
}
