//! Application state machine.
//!
//! This module defines the [`App`] state machine, which composes the chat log,
//! the connection monitor and the key-exchange visualizer, completely
//! decoupled from I/O.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Keeps the message log and the draft input buffer.
//! - Tracks connection status for UI feedback.
//! - Owns the visualizer session and rejects ticks from stale sessions.

use quantumshield_core::{
    ChannelEvent, ChatMessage, ConnectionMonitor, ConnectionStatus, Environment, KeyExchange,
    MessageStore, SessionId, TickOutcome,
};

use crate::{AppAction, AppEvent, KeyInput};

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable in simulation.
#[derive(Debug, Clone)]
pub struct App<E> {
    /// Randomness source for key bits.
    env: E,
    /// Connection status.
    monitor: ConnectionMonitor,
    /// Ordered message log.
    store: MessageStore,
    /// Text typed but not yet submitted.
    draft: String,
    /// Open visualizer session. `None` while closed.
    visualizer: Option<KeyExchange>,
    /// Most recently issued session ID.
    last_session: SessionId,
}

impl<E: Environment> App<E> {
    /// Create a new App.
    pub fn new(env: E) -> Self {
        Self {
            env,
            monitor: ConnectionMonitor::new(),
            store: MessageStore::new(),
            draft: String::new(),
            visualizer: None,
            last_session: SessionId::default(),
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Submit { text } => self.submit(text),
            AppEvent::Channel(event) => self.handle_channel(event),
            AppEvent::OpenVisualizer => self.open_visualizer(),
            AppEvent::CloseVisualizer => self.close_visualizer(),
            AppEvent::StageTick { session } => self.handle_tick(session),
            AppEvent::Quit => self.quit(),
        }
    }

    fn handle_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        match key {
            KeyInput::Char(c) => {
                self.draft.push(c);
                vec![AppAction::Render]
            },
            KeyInput::Backspace => {
                if self.draft.pop().is_some() { vec![AppAction::Render] } else { vec![] }
            },
            KeyInput::Enter => {
                let actions = self.submit(self.draft.clone());
                if !actions.is_empty() {
                    self.draft.clear();
                }
                actions
            },
            KeyInput::Esc => {
                if self.visualizer.is_some() { self.close_visualizer() } else { self.quit() }
            },
        }
    }

    fn handle_channel(&mut self, event: ChannelEvent) -> Vec<AppAction> {
        match event {
            ChannelEvent::Connect | ChannelEvent::Disconnect => {
                if self.monitor.observe(&event) { vec![AppAction::Render] } else { vec![] }
            },
            ChannelEvent::Message(payload) => {
                self.store.on_remote_message(payload);
                vec![AppAction::ScrollToLatest, AppAction::Render]
            },
        }
    }

    fn handle_tick(&mut self, session: SessionId) -> Vec<AppAction> {
        let Some(kx) = self.visualizer.as_mut().filter(|kx| kx.session() == session) else {
            tracing::debug!(%session, "dropping tick from stale session");
            return vec![];
        };

        match kx.tick(&self.env) {
            TickOutcome::Advanced(_) => vec![AppAction::Render],
            TickOutcome::Encrypted => {
                tracing::info!(%session, "key exchange visualization complete");
                vec![AppAction::CancelStageTimer { session }, AppAction::Render]
            },
            TickOutcome::Finished => vec![],
        }
    }

    /// Submit text typed by the local user.
    ///
    /// Blank text produces no actions. Otherwise the message is appended to
    /// the log before the send action is produced, regardless of connection
    /// status.
    pub fn submit(&mut self, text: impl Into<String>) -> Vec<AppAction> {
        match self.store.submit(text) {
            Some(payload) => {
                vec![AppAction::ScrollToLatest, AppAction::SendMessage { payload }, AppAction::Render]
            },
            None => vec![],
        }
    }

    /// Open the visualizer, replacing any session already running.
    ///
    /// The old session's timer is cancelled before the new one is started.
    pub fn open_visualizer(&mut self) -> Vec<AppAction> {
        let mut actions = Vec::with_capacity(3);
        if let Some(old) = self.visualizer.take() {
            actions.push(AppAction::CancelStageTimer { session: old.session() });
        }

        self.last_session = self.last_session.next();
        let session = self.last_session;
        self.visualizer = Some(KeyExchange::open(session));
        tracing::info!(%session, "visualizer opened");

        actions.push(AppAction::StartStageTimer { session });
        actions.push(AppAction::Render);
        actions
    }

    /// Close the visualizer and cancel its timer. No-op if already closed.
    pub fn close_visualizer(&mut self) -> Vec<AppAction> {
        match self.visualizer.take() {
            Some(old) => {
                tracing::info!(session = %old.session(), "visualizer closed");
                vec![AppAction::CancelStageTimer { session: old.session() }, AppAction::Render]
            },
            None => vec![],
        }
    }

    /// Quit the application.
    pub fn quit(&self) -> Vec<AppAction> {
        vec![AppAction::Quit]
    }

    /// Current connection status.
    pub fn connection_status(&self) -> ConnectionStatus {
        self.monitor.status()
    }

    /// Messages in arrival order.
    pub fn messages(&self) -> &[ChatMessage] {
        self.store.messages()
    }

    /// Text typed but not yet submitted.
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Open visualizer session. `None` while closed.
    pub fn visualizer(&self) -> Option<&KeyExchange> {
        self.visualizer.as_ref()
    }
}
