//! Staged key-exchange visualization.
//!
//! A linear, timer-driven state machine that walks through a fixed list of
//! labeled stages and ends in a terminal encrypted state. It performs no
//! cryptography: the key bits are random digits for display only.
//!
//! # State Machine
//!
//! ```text
//! ┌──────┐ tick ┌────────┐ tick ┌────────┐      ┌────────┐ tick ┌───────────┐
//! │ Idle │─────>│ Stage0 │─────>│ Stage1 │ ...  │ Stage3 │─────>│ Encrypted │
//! └──────┘      └────────┘      └────────┘      └────────┘      └───────────┘
//! ```
//!
//! The last stage, [`Stage::EncryptChannel`], has no phase of its own: the
//! tick that enters it reports [`TickOutcome::Encrypted`] and the session's
//! phase becomes [`KeyExchangePhase::Encrypted`]. Its label stays visible
//! through [`KeyExchange::current_stage`] and [`KeyExchange::phase_label`].
//!
//! Each [`KeyExchange`] value belongs to one visualizer session. Opening the
//! visualizer creates a fresh value with a new [`SessionId`]; ticks scheduled
//! for an older session must be discarded by the caller.

use std::fmt;

use crate::env::Environment;

/// Number of stages before the session becomes encrypted.
pub const STAGE_COUNT: usize = 5;

/// Number of characters in a generated key bit string.
pub const KEY_BIT_COUNT: usize = 32;

/// One labeled step of the visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Stage 0. Regenerates key bits.
    GenerateQubits,
    /// Stage 1.
    TransmitPhotons,
    /// Stage 2.
    DetectEavesdropping,
    /// Stage 3. Regenerates key bits.
    DeriveSharedKey,
    /// Stage 4. Entering it encrypts the session.
    EncryptChannel,
}

impl Stage {
    /// All stages in order.
    pub const ALL: [Self; STAGE_COUNT] = [
        Self::GenerateQubits,
        Self::TransmitPhotons,
        Self::DetectEavesdropping,
        Self::DeriveSharedKey,
        Self::EncryptChannel,
    ];

    /// Stage at `index`. `None` past the last stage.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Zero-based position in [`Stage::ALL`].
    pub fn index(self) -> usize {
        match self {
            Self::GenerateQubits => 0,
            Self::TransmitPhotons => 1,
            Self::DetectEavesdropping => 2,
            Self::DeriveSharedKey => 3,
            Self::EncryptChannel => 4,
        }
    }

    /// Human-readable phase label.
    pub fn label(self) -> &'static str {
        match self {
            Self::GenerateQubits => "Generating random quantum bits (qubits)...",
            Self::TransmitPhotons => "Transmitting photons securely...",
            Self::DetectEavesdropping => "Detecting and filtering eavesdropping...",
            Self::DeriveSharedKey => "Deriving shared secret key...",
            Self::EncryptChannel => "Encrypting communication channel...",
        }
    }

    /// Whether entering this stage draws fresh key bits.
    pub fn regenerates_key_bits(self) -> bool {
        matches!(self, Self::GenerateQubits | Self::DeriveSharedKey)
    }
}

/// Identifies one visualizer session.
///
/// Sessions are numbered in the order they were opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SessionId(u64);

impl SessionId {
    /// Wrap a raw session number.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Session number following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Raw session number.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display-only string of `'0'` and `'1'` characters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyBits(String);

impl KeyBits {
    /// Draw [`KEY_BIT_COUNT`] independent uniform bits from `env`.
    pub fn generate<E: Environment>(env: &E) -> Self {
        Self(format!("{:032b}", env.random_u32()))
    }

    /// Bits as a string of `'0'`/`'1'`. Empty before the first draw.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of bits. Zero before the first draw.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no bits have been drawn yet.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Coarse position of a session in the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyExchangePhase {
    /// Opened, no tick yet.
    Idle,
    /// Inside one of the stages before [`Stage::EncryptChannel`].
    Stage(Stage),
    /// [`Stage::EncryptChannel`] entered. Terminal.
    Encrypted,
}

/// Result of applying one timer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Entered the given stage, never [`Stage::EncryptChannel`]. More ticks
    /// follow.
    Advanced(Stage),
    /// Entered [`Stage::EncryptChannel`] and became encrypted. The timer
    /// should stop.
    Encrypted,
    /// Already encrypted. Nothing changed.
    Finished,
}

/// State of one key-exchange visualization session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyExchange {
    session: SessionId,
    /// Ticks applied so far, `0..=STAGE_COUNT`.
    ticks: usize,
    key_bits: KeyBits,
}

impl KeyExchange {
    /// Fresh session in the idle state.
    pub fn open(session: SessionId) -> Self {
        Self { session, ticks: 0, key_bits: KeyBits::default() }
    }

    /// Apply one timer tick.
    ///
    /// Enters the next stage, drawing new key bits when that stage asks for
    /// them. The tick that enters the final stage also encrypts the session;
    /// every tick after that is inert.
    pub fn tick<E: Environment>(&mut self, env: &E) -> TickOutcome {
        let Some(stage) = Stage::from_index(self.ticks) else {
            return TickOutcome::Finished;
        };

        self.ticks += 1;
        if stage.regenerates_key_bits() {
            self.key_bits = KeyBits::generate(env);
        }

        tracing::debug!(session = %self.session, stage = stage.index(), "key exchange advanced");

        if self.ticks == STAGE_COUNT { TickOutcome::Encrypted } else { TickOutcome::Advanced(stage) }
    }

    /// Session this state belongs to.
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Number of ticks applied since opening.
    pub fn ticks(&self) -> usize {
        self.ticks
    }

    /// Current coarse phase.
    pub fn phase(&self) -> KeyExchangePhase {
        if self.is_encrypted() {
            KeyExchangePhase::Encrypted
        } else {
            self.current_stage().map_or(KeyExchangePhase::Idle, KeyExchangePhase::Stage)
        }
    }

    /// Stage most recently entered. `None` while idle.
    pub fn current_stage(&self) -> Option<Stage> {
        self.ticks.checked_sub(1).and_then(Stage::from_index)
    }

    /// Zero-based index of the current stage. `0` while idle.
    pub fn stage_index(&self) -> usize {
        self.current_stage().map_or(0, Stage::index)
    }

    /// Label of the current stage. Idle sessions show the first label.
    pub fn phase_label(&self) -> &'static str {
        self.current_stage().unwrap_or(Stage::GenerateQubits).label()
    }

    /// Completion in percent, `0..=100`.
    pub fn progress_percent(&self) -> u8 {
        (self.ticks * 100 / STAGE_COUNT) as u8
    }

    /// Display key bits. Empty until stage 0 is entered.
    pub fn key_bits(&self) -> &KeyBits {
        &self.key_bits
    }

    /// Whether the final stage has completed.
    pub fn is_encrypted(&self) -> bool {
        self.ticks >= STAGE_COUNT
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicU32, Ordering},
        },
        time::Duration,
    };

    use super::*;

    /// Counter-backed environment: each draw yields a distinct value.
    #[derive(Clone, Default)]
    struct CountingEnv(Arc<AtomicU32>);

    impl Environment for CountingEnv {
        async fn sleep(&self, _duration: Duration) {}

        fn random_bytes(&self, buffer: &mut [u8]) {
            let next = self.0.fetch_add(0x9E37_79B9, Ordering::Relaxed);
            for (i, byte) in buffer.iter_mut().enumerate() {
                *byte = next.to_be_bytes()[i % 4] ^ (i as u8);
            }
        }
    }

    #[test]
    fn open_is_idle() {
        let kx = KeyExchange::open(SessionId::new(1));

        assert_eq!(kx.phase(), KeyExchangePhase::Idle);
        assert_eq!(kx.stage_index(), 0);
        assert_eq!(kx.progress_percent(), 0);
        assert_eq!(kx.phase_label(), Stage::GenerateQubits.label());
        assert!(kx.key_bits().is_empty());
        assert!(!kx.is_encrypted());
    }

    #[test]
    fn five_ticks_walk_all_labels_then_encrypt() {
        let env = CountingEnv::default();
        let mut kx = KeyExchange::open(SessionId::new(1));
        let mut labels = Vec::new();

        for expected_progress in [20, 40, 60, 80] {
            assert!(matches!(kx.tick(&env), TickOutcome::Advanced(_)));
            labels.push(kx.phase_label());
            assert_eq!(kx.progress_percent(), expected_progress);
        }
        assert_eq!(kx.tick(&env), TickOutcome::Encrypted);
        labels.push(kx.phase_label());

        let expected: Vec<_> = Stage::ALL.iter().map(|s| s.label()).collect();
        assert_eq!(labels, expected);
        assert!(kx.is_encrypted());
        assert_eq!(kx.phase(), KeyExchangePhase::Encrypted);
        assert_eq!(kx.progress_percent(), 100);
    }

    #[test]
    fn entering_encrypt_channel_reports_encrypted() {
        let env = CountingEnv::default();
        let mut kx = KeyExchange::open(SessionId::new(1));
        let mut outcomes = Vec::new();
        let mut phases = vec![kx.phase()];

        for _ in 0..STAGE_COUNT {
            outcomes.push(kx.tick(&env));
            phases.push(kx.phase());
        }

        assert_eq!(outcomes.last(), Some(&TickOutcome::Encrypted));
        assert!(!outcomes.contains(&TickOutcome::Advanced(Stage::EncryptChannel)));
        assert!(!phases.contains(&KeyExchangePhase::Stage(Stage::EncryptChannel)));
        assert_eq!(phases[1..STAGE_COUNT], [
            KeyExchangePhase::Stage(Stage::GenerateQubits),
            KeyExchangePhase::Stage(Stage::TransmitPhotons),
            KeyExchangePhase::Stage(Stage::DetectEavesdropping),
            KeyExchangePhase::Stage(Stage::DeriveSharedKey),
        ]);
        assert_eq!(kx.current_stage(), Some(Stage::EncryptChannel));
        assert_eq!(kx.phase_label(), Stage::EncryptChannel.label());
    }

    #[test]
    fn ticks_after_encryption_are_inert() {
        let env = CountingEnv::default();
        let mut kx = KeyExchange::open(SessionId::new(1));
        for _ in 0..STAGE_COUNT {
            let _ = kx.tick(&env);
        }
        let snapshot = kx.clone();

        assert_eq!(kx.tick(&env), TickOutcome::Finished);
        assert_eq!(kx.tick(&env), TickOutcome::Finished);
        assert_eq!(kx, snapshot);
    }

    #[test]
    fn key_bits_regenerate_only_on_stage_zero_and_three() {
        let env = CountingEnv::default();
        let mut kx = KeyExchange::open(SessionId::new(1));
        let mut history = Vec::new();

        for _ in 0..STAGE_COUNT {
            let _ = kx.tick(&env);
            history.push(kx.key_bits().clone());
        }

        assert!(history.iter().all(|bits| bits.len() == KEY_BIT_COUNT));
        assert!(history.iter().all(|bits| bits.as_str().chars().all(|c| c == '0' || c == '1')));
        assert_eq!(history[1], history[0]);
        assert_eq!(history[2], history[0]);
        assert_ne!(history[3], history[2]);
        assert_eq!(history[4], history[3]);
    }

    #[test]
    fn stage_index_tracks_entered_stage() {
        let env = CountingEnv::default();
        let mut kx = KeyExchange::open(SessionId::new(1));

        for stage in Stage::ALL {
            let _ = kx.tick(&env);
            assert_eq!(kx.current_stage(), Some(stage));
            assert_eq!(kx.stage_index(), stage.index());
        }
    }

    #[test]
    fn session_ids_are_ordered() {
        let first = SessionId::default();
        assert!(first.next() > first);
        assert_eq!(first.next().get(), 1);
    }
}
