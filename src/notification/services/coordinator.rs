//! Ties the consumer lifecycle to process start-up and shutdown.

use super::consumer::{DrainOutcome, NotificationConsumer};
use crate::notification::ports::{MessageChannel, NotificationHandler};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, timeout_at};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

/// Upper bound on draining the consumer during shutdown.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// How the consumer ended once shutdown was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// In-flight deliveries finished before the channel closed.
    Drained,
    /// The drain bound elapsed; the channel was closed anyway.
    TimedOut,
    /// The consumer never subscribed; only the channel was closed.
    FailedToStart,
}

/// Starts the notification consumer and stops it within a fixed bound.
///
/// A disabled coordinator (no broker configured) does nothing on either
/// side.
pub struct ConsumerCoordinator<C, H>
where
    C: MessageChannel + 'static,
    H: NotificationHandler + 'static,
{
    consumer: Option<NotificationConsumer<C, H>>,
    shutdown_timeout: Duration,
}

impl<C, H> ConsumerCoordinator<C, H>
where
    C: MessageChannel + 'static,
    H: NotificationHandler + 'static,
{
    /// Coordinates a provisioned consumer.
    #[must_use]
    pub const fn new(consumer: NotificationConsumer<C, H>) -> Self {
        Self {
            consumer: Some(consumer),
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    /// A coordinator with nothing to run.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            consumer: None,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    /// Overrides the drain bound.
    #[must_use]
    pub const fn with_shutdown_timeout(mut self, shutdown_timeout: Duration) -> Self {
        self.shutdown_timeout = shutdown_timeout;
        self
    }

    /// Returns whether a consumer is still waiting to be started.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.consumer.is_some()
    }

    /// Starts consuming on `tracker` and arranges shutdown on `shutdown`.
    ///
    /// Returns `None` when disabled or already started. The returned handle
    /// resolves once the channel has been closed.
    pub fn start(
        &mut self,
        tracker: &TaskTracker,
        shutdown: CancellationToken,
    ) -> Option<JoinHandle<ShutdownOutcome>> {
        let Some(consumer) = self.consumer.take() else {
            debug!("notification consumer disabled");
            return None;
        };
        Some(tracker.spawn(supervise(consumer, shutdown, self.shutdown_timeout)))
    }
}

async fn supervise<C, H>(
    mut consumer: NotificationConsumer<C, H>,
    shutdown: CancellationToken,
    bound: Duration,
) -> ShutdownOutcome
where
    C: MessageChannel + 'static,
    H: NotificationHandler + 'static,
{
    let started = consumer.start().await.is_ok();
    shutdown.cancelled().await;
    info!(consumer_tag = %consumer.tag(), "stopping notifications consumer");

    if !started {
        close(&mut consumer).await;
        return ShutdownOutcome::FailedToStart;
    }

    let now = Instant::now();
    let deadline = now.checked_add(bound).unwrap_or_else(|| {
        warn!(bound = ?bound, "shutdown bound out of range, using the default");
        now + DEFAULT_SHUTDOWN_TIMEOUT
    });
    let cancelled = timeout_at(deadline, consumer.cancel()).await;
    match cancelled {
        Ok(Ok(())) => {}
        Ok(Err(err)) => warn!(error = %err, "notifications consumer was not consuming"),
        Err(_) => warn!(consumer_tag = %consumer.tag(), "cancel request did not complete in time"),
    }
    let remaining = deadline.saturating_duration_since(Instant::now());
    let outcome = match consumer.wait_drained(remaining).await {
        DrainOutcome::Drained => ShutdownOutcome::Drained,
        DrainOutcome::TimedOut => ShutdownOutcome::TimedOut,
    };
    close(&mut consumer).await;
    info!(consumer_tag = %consumer.tag(), outcome = ?outcome, "notifications consumer closed");
    outcome
}

async fn close<C, H>(consumer: &mut NotificationConsumer<C, H>)
where
    C: MessageChannel + 'static,
    H: NotificationHandler + 'static,
{
    if let Err(err) = consumer.close().await {
        warn!(error = %err, "failed to close notifications consumer");
    }
}
