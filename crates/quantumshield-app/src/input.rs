//! Frontend-agnostic keyboard input.

/// Keyboard input abstraction.
///
/// Decouples application logic from any particular UI toolkit, enabling
/// deterministic simulation testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Printable character.
    Char(char),
    /// Enter/Return key (submit draft).
    Enter,
    /// Backspace key (delete last character of the draft).
    Backspace,
    /// Escape key (close visualizer, or quit).
    Esc,
}
