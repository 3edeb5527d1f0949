//! Invariants over consecutive App states.
//!
//! An invariant looks at one step of execution, the [`AppSnapshot`] before
//! and the one after, and reports a [`Violation`] if the step broke a
//! property the client must keep no matter which events arrive: the log only
//! grows, a session's stage never regresses, and so on.
//!
//! [`crate::SimDriver`] runs the registry between consecutive renders;
//! property tests run it between consecutive [`quantumshield_app::App::handle`]
//! calls.
//!
//! ```ignore
//! let registry = InvariantRegistry::standard();
//! let before = AppSnapshot::capture(&app);
//! app.handle(event);
//! registry.check_all(&before, &AppSnapshot::capture(&app))?;
//! ```

mod checks;
mod snapshot;

pub use checks::{
    EncryptedIffComplete, KeyBitsWidth, LogOnlyGrows, ProgressMatchesTicks, StageMonotonicity,
};
pub use snapshot::{AppSnapshot, VisualizerSnapshot};

/// Identifies a standard invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvariantKind {
    /// [`LogOnlyGrows`].
    LogOnlyGrows,
    /// [`ProgressMatchesTicks`].
    ProgressMatchesTicks,
    /// [`EncryptedIffComplete`].
    EncryptedIffComplete,
    /// [`KeyBitsWidth`].
    KeyBitsWidth,
    /// [`StageMonotonicity`].
    StageMonotonicity,
}

/// Invariant check result.
pub type InvariantResult = Result<(), Violation>;

/// Invariant violation with context.
#[derive(Debug, Clone)]
pub struct Violation {
    /// Violated invariant.
    pub invariant: InvariantKind,
    /// Description of what went wrong.
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// Property checked across one step of execution.
pub trait Invariant: Send + Sync {
    /// Invariant identifier for error reporting.
    fn kind(&self) -> InvariantKind;

    /// Check the invariant for the step from `before` to `after`.
    ///
    /// State invariants only look at `after`.
    fn check(&self, before: &AppSnapshot, after: &AppSnapshot) -> InvariantResult;
}

/// Set of invariants checked together.
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl Default for InvariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InvariantRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { invariants: Vec::new() }
    }

    /// Create a registry with the standard App invariants.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(LogOnlyGrows);
        registry.add(ProgressMatchesTicks);
        registry.add(EncryptedIffComplete);
        registry.add(KeyBitsWidth);
        registry.add(StageMonotonicity);
        registry
    }

    /// Add an invariant to the registry.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Check all invariants for one step.
    ///
    /// Returns `Ok(())` if all invariants hold, or all violations found.
    pub fn check_all(&self, before: &AppSnapshot, after: &AppSnapshot) -> Result<(), Vec<Violation>> {
        let violations: Vec<_> =
            self.invariants.iter().filter_map(|inv| inv.check(before, after).err()).collect();

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Check all invariants, panicking on violation.
    ///
    /// Use this in tests where you want immediate failure with context.
    pub fn assert_all(&self, before: &AppSnapshot, after: &AppSnapshot, context: &str) {
        if let Err(violations) = self.check_all(before, after) {
            let messages: Vec<_> = violations.iter().map(ToString::to_string).collect();
            panic!("Invariant violation {context}:\n  {}", messages.join("\n  "));
        }
    }

    /// Number of registered invariants.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}
