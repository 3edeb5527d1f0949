//! Property-based tests for App state machine.
//!
//! Tests verify that invariants hold under arbitrary event sequences,
//! including ticks tagged with sessions that are stale, current, or not yet
//! opened.

use proptest::prelude::*;
use quantumshield_app::{App, AppAction, AppEvent, KeyInput};
use quantumshield_core::{ChannelEvent, ChatMessage, ConnectionStatus, SessionId};
use quantumshield_harness::{AppSnapshot, InvariantRegistry, SimEnv};

/// Generate random printable characters for input.
fn printable_char() -> impl Strategy<Value = char> {
    prop::char::range(' ', '~')
}

/// Generate random key inputs.
fn key_strategy() -> impl Strategy<Value = KeyInput> {
    prop_oneof![
        4 => printable_char().prop_map(KeyInput::Char),
        1 => Just(KeyInput::Enter),
        1 => Just(KeyInput::Backspace),
        1 => Just(KeyInput::Esc),
    ]
}

/// Generate random channel events.
fn channel_strategy() -> impl Strategy<Value = ChannelEvent> {
    prop_oneof![
        1 => Just(ChannelEvent::Connect),
        1 => Just(ChannelEvent::Disconnect),
        2 => ("[a-z ]{0,8}", "[A-Z][a-z]{0,5}")
            .prop_map(|(text, sender)| ChannelEvent::Message(ChatMessage::remote(text, sender))),
    ]
}

/// Generate random app events.
fn event_strategy() -> impl Strategy<Value = AppEvent> {
    prop_oneof![
        6 => key_strategy().prop_map(AppEvent::Key),
        2 => "[a-z ]{0,6}".prop_map(|text| AppEvent::Submit { text }),
        3 => channel_strategy().prop_map(AppEvent::Channel),
        1 => Just(AppEvent::OpenVisualizer),
        1 => Just(AppEvent::CloseVisualizer),
        6 => (0u64..5).prop_map(|raw| AppEvent::StageTick { session: SessionId::new(raw) }),
    ]
}

proptest! {
    /// App invariants hold under arbitrary event sequences.
    #[test]
    fn prop_app_invariants_hold(events in prop::collection::vec(event_strategy(), 0..80)) {
        let mut app = App::new(SimEnv::new());
        let invariants = InvariantRegistry::standard();

        for event in events {
            let before = AppSnapshot::capture(&app);
            let _ = app.handle(event.clone());
            let after = AppSnapshot::capture(&app);

            if let Err(violations) = invariants.check_all(&before, &after) {
                prop_assert!(false, "after {:?}: {:?}", event, violations);
            }
        }
    }

    /// Status always reflects the most recent lifecycle event.
    #[test]
    fn prop_status_tracks_last_lifecycle_event(
        events in prop::collection::vec(channel_strategy(), 0..40)
    ) {
        let mut app = App::new(SimEnv::new());
        let mut expected = ConnectionStatus::Disconnected;

        for event in events {
            match event {
                ChannelEvent::Connect => expected = ConnectionStatus::Connected,
                ChannelEvent::Disconnect => expected = ConnectionStatus::Disconnected,
                ChannelEvent::Message(_) => {},
            }
            let _ = app.handle(AppEvent::Channel(event));
            prop_assert_eq!(app.connection_status(), expected);
        }
    }

    /// Every accepted submission is appended exactly once and sent exactly once.
    #[test]
    fn prop_each_submission_appends_and_sends_once(
        events in prop::collection::vec(event_strategy(), 0..80)
    ) {
        let mut app = App::new(SimEnv::new());
        let mut sent = 0usize;
        let mut remote = 0usize;

        for event in events {
            if matches!(event, AppEvent::Channel(ChannelEvent::Message(_))) {
                remote += 1;
            }
            let actions = app.handle(event);
            sent += actions.iter().filter(|a| matches!(a, AppAction::SendMessage { .. })).count();
        }

        prop_assert_eq!(app.messages().len(), sent + remote);
    }

    /// A start never overlaps a running timer, and a cancel only ever
    /// targets the running session.
    #[test]
    fn prop_timer_cancelled_before_restart(
        events in prop::collection::vec(event_strategy(), 0..80)
    ) {
        let mut app = App::new(SimEnv::new());
        let mut running: Option<SessionId> = None;

        for event in events {
            for action in app.handle(event) {
                match action {
                    AppAction::StartStageTimer { session } => {
                        prop_assert!(running.is_none(), "{:?} still running", running);
                        running = Some(session);
                    },
                    AppAction::CancelStageTimer { session } => {
                        prop_assert!(running.is_none() || running == Some(session));
                        running = None;
                    },
                    _ => {},
                }
            }
        }
    }
}
