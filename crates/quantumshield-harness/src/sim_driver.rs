//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` stands in for a real frontend during deterministic testing. It
//! implements [`Driver`] so the same [`quantumshield_app::Runtime`]
//! orchestration code runs in both production and simulation.
//!
//! Input is scripted through a [`SimInput`] handle; every render is captured
//! as an [`AppSnapshot`] for later inspection.

use std::time::Duration;

use quantumshield_app::{App, AppEvent, Driver, KeyInput};
use quantumshield_core::Environment;
use tokio::sync::mpsc;

use crate::invariants::{AppSnapshot, InvariantRegistry};

/// Error type for simulation driver.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimDriverError {
    /// Render failure requested by [`SimDriver::fail_render_after`].
    #[error("render {0} failed")]
    RenderFailed(usize),
}

/// Scripted input for a [`SimDriver`].
///
/// Cloneable; the driver reports [`AppEvent::Quit`] once every handle (and
/// every pending [`SimInput::send_after`]) is gone.
#[derive(Debug, Clone)]
pub struct SimInput {
    tx: mpsc::UnboundedSender<AppEvent>,
}

impl SimInput {
    /// Queue an event.
    pub fn send(&self, event: AppEvent) {
        let _ = self.tx.send(event);
    }

    /// Queue an event after `delay` of (tokio) time.
    ///
    /// Must be called within a tokio runtime.
    pub fn send_after(&self, delay: Duration, event: AppEvent) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(event);
        });
    }

    /// Type `text` and press Enter.
    pub fn type_line(&self, text: &str) {
        for c in text.chars() {
            self.send(AppEvent::Key(KeyInput::Char(c)));
        }
        self.send(AppEvent::Key(KeyInput::Enter));
    }
}

/// Simulation driver for deterministic testing.
pub struct SimDriver {
    inputs: mpsc::UnboundedReceiver<AppEvent>,
    renders: Vec<AppSnapshot>,
    scrolls: usize,
    stopped: bool,
    fail_render_after: Option<usize>,
    invariants: Option<InvariantRegistry>,
}

impl std::fmt::Debug for SimDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimDriver")
            .field("renders", &self.renders.len())
            .field("scrolls", &self.scrolls)
            .field("stopped", &self.stopped)
            .finish_non_exhaustive()
    }
}

impl SimDriver {
    /// Create a driver and the handle that scripts its input.
    pub fn new() -> (Self, SimInput) {
        let (tx, inputs) = mpsc::unbounded_channel();
        let driver = Self {
            inputs,
            renders: Vec::new(),
            scrolls: 0,
            stopped: false,
            fail_render_after: None,
            invariants: None,
        };
        (driver, SimInput { tx })
    }

    /// Enable invariant checking between consecutive renders.
    #[must_use]
    pub fn with_invariants(mut self, registry: InvariantRegistry) -> Self {
        self.invariants = Some(registry);
        self
    }

    /// Fail every render after the first `count` succeed.
    #[must_use]
    pub fn fail_render_after(mut self, count: usize) -> Self {
        self.fail_render_after = Some(count);
        self
    }

    /// Every successful render, oldest first.
    pub fn renders(&self) -> &[AppSnapshot] {
        &self.renders
    }

    /// Most recent render.
    pub fn last_render(&self) -> Option<&AppSnapshot> {
        self.renders.last()
    }

    /// Phase labels in render order, collapsing consecutive repeats.
    ///
    /// Renders with the visualizer closed are skipped.
    pub fn phase_labels(&self) -> Vec<&'static str> {
        let mut labels: Vec<&'static str> = Vec::new();
        for label in self.renders.iter().filter_map(|r| r.visualizer.as_ref().map(|v| v.label)) {
            if labels.last() != Some(&label) {
                labels.push(label);
            }
        }
        labels
    }

    /// Number of scroll-to-latest requests.
    pub fn scroll_count(&self) -> usize {
        self.scrolls
    }

    /// Whether the runtime tore the driver down.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;

    async fn poll_input(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        Ok(Some(self.inputs.recv().await.unwrap_or(AppEvent::Quit)))
    }

    fn render<E: Environment>(&mut self, app: &App<E>) -> Result<(), Self::Error> {
        if self.fail_render_after.is_some_and(|limit| self.renders.len() >= limit) {
            return Err(SimDriverError::RenderFailed(self.renders.len()));
        }

        let snapshot = AppSnapshot::capture(app);
        if let Some(registry) = &self.invariants {
            let before = self.renders.last().cloned().unwrap_or_default();
            registry.assert_all(&before, &snapshot, &format!("at render {}", self.renders.len()));
        }

        self.renders.push(snapshot);
        Ok(())
    }

    fn scroll_to_latest<E: Environment>(&mut self, _app: &App<E>) -> Result<(), Self::Error> {
        self.scrolls += 1;
        Ok(())
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}
