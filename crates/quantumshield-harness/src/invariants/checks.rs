//! The standard App invariants.

use quantumshield_core::{KEY_BIT_COUNT, STAGE_COUNT};

use super::{AppSnapshot, Invariant, InvariantKind, InvariantResult, Violation};

/// The message log never shrinks.
///
/// Every operation appends or leaves the log alone. A shorter log means a
/// message was retracted, which the reconciliation protocol never does.
pub struct LogOnlyGrows;

impl Invariant for LogOnlyGrows {
    fn kind(&self) -> InvariantKind {
        InvariantKind::LogOnlyGrows
    }

    fn check(&self, before: &AppSnapshot, after: &AppSnapshot) -> InvariantResult {
        if after.message_count < before.message_count {
            return Err(Violation {
                invariant: self.kind(),
                message: format!(
                    "message log shrank {} → {}",
                    before.message_count, after.message_count
                ),
            });
        }
        Ok(())
    }
}

/// Progress is exactly the share of stages entered.
pub struct ProgressMatchesTicks;

impl Invariant for ProgressMatchesTicks {
    fn kind(&self) -> InvariantKind {
        InvariantKind::ProgressMatchesTicks
    }

    fn check(&self, _before: &AppSnapshot, after: &AppSnapshot) -> InvariantResult {
        let Some(kx) = &after.visualizer else { return Ok(()) };
        let expected = kx.ticks * 100 / STAGE_COUNT;

        if kx.ticks > STAGE_COUNT || usize::from(kx.progress) != expected {
            return Err(Violation {
                invariant: self.kind(),
                message: format!(
                    "session {}: {} ticks but progress {}%",
                    kx.session, kx.ticks, kx.progress
                ),
            });
        }
        Ok(())
    }
}

/// A session is encrypted exactly when every stage has been entered.
pub struct EncryptedIffComplete;

impl Invariant for EncryptedIffComplete {
    fn kind(&self) -> InvariantKind {
        InvariantKind::EncryptedIffComplete
    }

    fn check(&self, _before: &AppSnapshot, after: &AppSnapshot) -> InvariantResult {
        let Some(kx) = &after.visualizer else { return Ok(()) };

        if kx.encrypted != (kx.ticks == STAGE_COUNT) {
            return Err(Violation {
                invariant: self.kind(),
                message: format!(
                    "session {}: encrypted={} after {} ticks",
                    kx.session, kx.encrypted, kx.ticks
                ),
            });
        }
        Ok(())
    }
}

/// Key bits are empty before stage 0 and full width from then on.
pub struct KeyBitsWidth;

impl Invariant for KeyBitsWidth {
    fn kind(&self) -> InvariantKind {
        InvariantKind::KeyBitsWidth
    }

    fn check(&self, _before: &AppSnapshot, after: &AppSnapshot) -> InvariantResult {
        let Some(kx) = &after.visualizer else { return Ok(()) };
        let expected = if kx.ticks == 0 { 0 } else { KEY_BIT_COUNT };
        let binary = kx.key_bits.chars().all(|c| c == '0' || c == '1');

        if kx.key_bits.len() != expected || !binary {
            return Err(Violation {
                invariant: self.kind(),
                message: format!(
                    "session {}: key bits {:?} after {} ticks",
                    kx.session, kx.key_bits, kx.ticks
                ),
            });
        }
        Ok(())
    }
}

/// Within one session, the stage never moves backwards.
///
/// A new session (higher number) may restart at stage 0; an older session
/// number must never reappear.
pub struct StageMonotonicity;

impl Invariant for StageMonotonicity {
    fn kind(&self) -> InvariantKind {
        InvariantKind::StageMonotonicity
    }

    fn check(&self, before: &AppSnapshot, after: &AppSnapshot) -> InvariantResult {
        let (Some(prev), Some(next)) = (&before.visualizer, &after.visualizer) else {
            return Ok(());
        };

        if next.session < prev.session {
            return Err(Violation {
                invariant: self.kind(),
                message: format!("session went back {} → {}", prev.session, next.session),
            });
        }
        if next.session == prev.session && next.ticks < prev.ticks {
            return Err(Violation {
                invariant: self.kind(),
                message: format!(
                    "session {}: ticks decreased {} → {}",
                    next.session, prev.ticks, next.ticks
                ),
            });
        }
        Ok(())
    }
}
