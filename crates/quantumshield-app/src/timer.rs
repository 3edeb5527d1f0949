//! Cancellable stage timer for the key-exchange visualizer.
//!
//! A [`StageTimer`] posts one tick per interval for a single session, up to
//! [`STAGE_COUNT`] ticks. The [`TimerHandle`] is the only way to stop it early:
//! cancelling or dropping the handle aborts the task, so a timer can never
//! outlive the runtime slot that owns it. Ticks already queued when the abort
//! lands are tagged with their session and discarded by [`crate::App`].

use std::time::Duration;

use quantumshield_core::{Environment, STAGE_COUNT, SessionId};
use tokio::{sync::mpsc, task::AbortHandle};

/// Spawns stage timers.
#[derive(Debug, Clone)]
pub struct StageTimer<E> {
    env: E,
    interval: Duration,
}

impl<E: Environment> StageTimer<E> {
    /// Timer factory sleeping through `env` for `interval` between ticks.
    pub fn new(env: E, interval: Duration) -> Self {
        Self { env, interval }
    }

    /// Start ticking for `session`, posting each tick on `ticks`.
    ///
    /// Must be called within a tokio runtime.
    pub fn start(&self, session: SessionId, ticks: mpsc::UnboundedSender<SessionId>) -> TimerHandle {
        let env = self.env.clone();
        let interval = self.interval;

        let task = tokio::spawn(async move {
            for _ in 0..STAGE_COUNT {
                env.sleep(interval).await;
                if ticks.send(session).is_err() {
                    break;
                }
            }
        });

        tracing::debug!(%session, ?interval, "stage timer started");
        TimerHandle { session, abort_handle: task.abort_handle() }
    }

    /// Delay between ticks.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// Handle to one running stage timer. Dropping it cancels the timer.
#[derive(Debug)]
pub struct TimerHandle {
    session: SessionId,
    abort_handle: AbortHandle,
}

impl TimerHandle {
    /// Session this timer ticks for.
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Stop the timer. The task is aborted at its next suspension point.
    pub fn cancel(self) {
        drop(self);
    }

    /// Whether the timer task has exited.
    pub fn is_finished(&self) -> bool {
        self.abort_handle.is_finished()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.abort_handle.abort();
        tracing::debug!(session = %self.session, "stage timer cancelled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct TokioEnv;

    impl Environment for TokioEnv {
        fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
            tokio::time::sleep(duration)
        }

        fn random_bytes(&self, buffer: &mut [u8]) {
            buffer.fill(0);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_interval_then_stops() {
        let timer = StageTimer::new(TokioEnv, Duration::from_secs(1));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let session = SessionId::new(7);
        let handle = timer.start(session, tx);
        assert_eq!(timer.interval(), Duration::from_secs(1));
        assert!(!handle.is_finished());

        for _ in 0..STAGE_COUNT {
            assert_eq!(rx.recv().await, Some(session));
        }
        assert_eq!(rx.recv().await, None);

        for _ in 0..10 {
            if handle.is_finished() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(handle.is_finished());
        assert_eq!(handle.session(), session);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_further_ticks() {
        let timer = StageTimer::new(TokioEnv, Duration::from_secs(1));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = timer.start(SessionId::new(1), tx);

        assert_eq!(rx.recv().await, Some(SessionId::new(1)));
        handle.cancel();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn no_tick_before_first_interval() {
        let timer = StageTimer::new(TokioEnv, Duration::from_secs(1));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _handle = timer.start(SessionId::new(1), tx);

        tokio::time::sleep(Duration::from_millis(999)).await;
        assert!(rx.try_recv().is_err());
    }
}
