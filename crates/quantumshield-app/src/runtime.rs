//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: UI state machine
//! - [`ChannelHandle`]: shared chat channel, observed through one subscription
//!   so lifecycle events and messages keep their delivery order
//! - [`StageTimer`]: visualizer ticks
//! - [`Driver`]: frontend I/O

use quantumshield_core::{Environment, EventFilter, SessionId};
use tokio::sync::mpsc;

use crate::{
    App, AppAction, AppEvent, ChannelHandle, ClientConfig, ConfigError, Driver, StageTimer,
    Subscription, TimerHandle,
};

/// Generic runtime that orchestrates App, channel, timer and Driver.
///
/// # Type Parameters
///
/// - `D`: Frontend driver
/// - `E`: Environment for randomness and sleeping
pub struct Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    driver: D,
    app: App<E>,
    channel: ChannelHandle,
    timer: StageTimer<E>,
    active_timer: Option<TimerHandle>,
}

impl<D, E> Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    /// Create a runtime over an already constructed channel handle.
    ///
    /// # Errors
    ///
    /// - Any error from [`ClientConfig::validate`]
    /// - [`ConfigError::MessageEventMismatch`] if `channel` was built for a
    ///   different message event than `config` names
    pub fn new(
        driver: D,
        channel: ChannelHandle,
        env: E,
        config: &ClientConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if channel.message_event() != config.message_event {
            return Err(ConfigError::MessageEventMismatch {
                config: config.message_event.clone(),
                channel: channel.message_event().to_owned(),
            });
        }

        let timer = StageTimer::new(env.clone(), config.stage_interval);
        Ok(Self { driver, app: App::new(env), channel, timer, active_timer: None })
    }

    /// Run the main event loop until the App asks to quit.
    ///
    /// Subscribes to the channel for the duration of the call. The
    /// subscription and any running stage timer are released on every exit
    /// path, including driver errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails to poll input or render.
    pub async fn run(&mut self) -> Result<(), D::Error> {
        let mut channel_events = self.channel.subscribe(EventFilter::ALL);
        let (tick_tx, mut tick_rx) = mpsc::unbounded_channel();

        let result = self.event_loop(&mut channel_events, &tick_tx, &mut tick_rx).await;

        self.active_timer = None;
        self.driver.stop();
        result
    }

    async fn event_loop(
        &mut self,
        channel_events: &mut Subscription,
        tick_tx: &mpsc::UnboundedSender<SessionId>,
        tick_rx: &mut mpsc::UnboundedReceiver<SessionId>,
    ) -> Result<(), D::Error> {
        self.driver.render(&self.app)?;

        loop {
            let event = tokio::select! {
                biased;

                Some(event) = channel_events.recv() => AppEvent::Channel(event),
                Some(session) = tick_rx.recv() => AppEvent::StageTick { session },
                input = self.driver.poll_input() => match input? {
                    Some(event) => event,
                    None => continue,
                },
            };

            let actions = self.app.handle(event);
            if self.process_actions(actions, tick_tx)? {
                return Ok(());
            }
        }
    }

    /// Execute actions returned by the App.
    ///
    /// Returns `true` if the application should quit.
    fn process_actions(
        &mut self,
        actions: Vec<AppAction>,
        tick_tx: &mpsc::UnboundedSender<SessionId>,
    ) -> Result<bool, D::Error> {
        for action in actions {
            match action {
                AppAction::Render => self.driver.render(&self.app)?,
                AppAction::ScrollToLatest => self.driver.scroll_to_latest(&self.app)?,
                AppAction::SendMessage { payload } => self.channel.send(payload),
                AppAction::StartStageTimer { session } => {
                    if let Some(old) = self.active_timer.take() {
                        old.cancel();
                    }
                    self.active_timer = Some(self.timer.start(session, tick_tx.clone()));
                },
                AppAction::CancelStageTimer { session } => {
                    if let Some(timer) = self.active_timer.take_if(|t| t.session() == session) {
                        timer.cancel();
                    }
                },
                AppAction::Quit => return Ok(true),
            }
        }
        Ok(false)
    }

    /// Get a reference to the App
    pub fn app(&self) -> &App<E> {
        &self.app
    }

    /// Get a reference to the channel handle
    pub fn channel(&self) -> &ChannelHandle {
        &self.channel
    }

    /// Get a reference to the driver
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Whether a stage timer is currently owned by the runtime.
    pub fn has_active_timer(&self) -> bool {
        self.active_timer.is_some()
    }
}
