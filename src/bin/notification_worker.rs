//! Runs the completion-notification subsystem as a standalone process.
//!
//! Usage:
//!
//! ```text
//! FOREMAN_AES_KEY=<hex> FOREMAN_AMQP_URL=amqp://localhost:5672/%2f notification_worker
//! ```
//!
//! With a broker URL the worker declares the notifications queue and consumes
//! it, writing one audit line per notification. Without one it starts in
//! log-only mode. SIGINT or SIGTERM stops the consumer, waiting at most the
//! configured drain bound before the channel is closed.

use foreman::config::Config;
use foreman::crypto::FieldCipher;
use foreman::notification::adapters::{AmqpChannel, amqp::REPLY_SUCCESS};
use foreman::notification::services::{AuditLogHandler, NotificationRuntime};
use foreman::telemetry;
use lapin::{Connection, ConnectionProperties};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{info, warn};

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

type Runtime = NotificationRuntime<AmqpChannel, AuditLogHandler>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = Config::from_env()?;
    telemetry::init(config.log_format)?;
    // Fail closed on a bad key before touching the broker.
    FieldCipher::from_hex_key(config.encryption_key.expose())?;

    let tracker = TaskTracker::new();
    let shutdown = CancellationToken::new();

    let connection = match &config.broker_url {
        Some(url) => {
            let properties = ConnectionProperties::default();
            Some(Connection::connect(url.expose(), properties).await?)
        }
        None => None,
    };
    let mut runtime = match &connection {
        Some(connection) => {
            let channel = Arc::new(AmqpChannel::open(connection).await?);
            Runtime::with_channel(channel, Arc::new(AuditLogHandler), &config.notifications)
                .await?
        }
        None => Runtime::log_only(),
    };
    let consumer = runtime.start(&tracker, shutdown.clone());

    wait_for_signal().await?;
    info!("shutdown requested");
    shutdown.cancel();
    tracker.close();
    tracker.wait().await;
    if let Some(handle) = consumer {
        let outcome = handle.await?;
        info!(?outcome, "notification consumer stopped");
    }

    let closed = match connection {
        Some(connection) => connection.close(REPLY_SUCCESS, "OK").await,
        None => Ok(()),
    };
    if let Err(err) = closed {
        warn!(error = %err, "failed to close broker connection");
    }
    Ok(())
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
