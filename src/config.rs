//! Process configuration read from `FOREMAN_*` environment variables.
//!
//! | variable | meaning | default |
//! |---|---|---|
//! | `FOREMAN_AES_KEY` (or `AES_KEY`) | hex field-encryption key | required |
//! | `FOREMAN_AMQP_URL` (or `RABBIT_URL`) | broker URL; unset disables the queue | unset |
//! | `FOREMAN_NOTIFICATIONS_QUEUE` | durable queue name | `notifications` |
//! | `FOREMAN_CONSUMER_TAG_PREFIX` | consumer tag prefix | `foreman-server` |
//! | `FOREMAN_SHUTDOWN_TIMEOUT_SECS` | consumer drain bound, at most `300` | `5` |
//! | `FOREMAN_LOG_FORMAT` | `text` or `json` | `text` |

use crate::notification::domain::{
    ConsumerTag, DEFAULT_CONSUMER_TAG_PREFIX, NotificationDomainError, QueueName,
};
use crate::notification::services::DEFAULT_SHUTDOWN_TIMEOUT;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

const AES_KEY_VAR: &str = "FOREMAN_AES_KEY";
const AES_KEY: [&str; 2] = [AES_KEY_VAR, "AES_KEY"];
const AMQP_URL: [&str; 2] = ["FOREMAN_AMQP_URL", "RABBIT_URL"];
const QUEUE: &str = "FOREMAN_NOTIFICATIONS_QUEUE";
const TAG_PREFIX: &str = "FOREMAN_CONSUMER_TAG_PREFIX";
const SHUTDOWN_TIMEOUT: &str = "FOREMAN_SHUTDOWN_TIMEOUT_SECS";
const LOG_FORMAT: &str = "FOREMAN_LOG_FORMAT";

/// Largest accepted consumer drain bound.
pub const MAX_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(300);

/// Errors raised while reading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("missing required setting {0}")]
    Missing(&'static str),

    /// A variable holds an unusable value.
    #[error("invalid value for {name}: {reason}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// A configuration value that must never appear in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Returns the wrapped value.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl TryFrom<&str> for LogFormat {
    type Error = ConfigError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Invalid {
                name: LOG_FORMAT,
                reason: format!("unknown format '{other}'"),
            }),
        }
    }
}

/// Queue and consumer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSettings {
    /// Durable queue shared by publisher and consumer.
    pub queue: QueueName,
    /// Prefix of the generated consumer tag.
    pub consumer_tag_prefix: String,
    /// Upper bound on draining the consumer at shutdown.
    pub shutdown_timeout: Duration,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            queue: QueueName::default(),
            consumer_tag_prefix: DEFAULT_CONSUMER_TAG_PREFIX.to_owned(),
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }
}

/// Complete process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Hex-encoded field-encryption key.
    pub encryption_key: Secret,
    /// Broker URL; `None` runs the log-only publisher with no consumer.
    pub broker_url: Option<Secret>,
    /// Queue and consumer settings.
    pub notifications: NotificationSettings,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Config {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a value
    /// is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`.
    ///
    /// Blank values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a value
    /// is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };
        let first = |names: [&str; 2]| names.into_iter().find_map(read);

        let encryption_key = first(AES_KEY)
            .map(Secret)
            .ok_or(ConfigError::Missing(AES_KEY_VAR))?;
        let broker_url = first(AMQP_URL).map(Secret);

        let mut notifications = NotificationSettings::default();
        if let Some(queue) = read(QUEUE) {
            notifications.queue = QueueName::new(queue).map_err(|err| invalid(QUEUE, &err))?;
        }
        if let Some(prefix) = read(TAG_PREFIX) {
            ConsumerTag::generate(&prefix).map_err(|err| invalid(TAG_PREFIX, &err))?;
            notifications.consumer_tag_prefix = prefix;
        }
        if let Some(raw) = read(SHUTDOWN_TIMEOUT) {
            let seconds = raw.parse::<u64>().map_err(|err| ConfigError::Invalid {
                name: SHUTDOWN_TIMEOUT,
                reason: err.to_string(),
            })?;
            let bound = Duration::from_secs(seconds);
            if bound > MAX_SHUTDOWN_TIMEOUT {
                return Err(ConfigError::Invalid {
                    name: SHUTDOWN_TIMEOUT,
                    reason: format!(
                        "{seconds}s exceeds the {}s limit",
                        MAX_SHUTDOWN_TIMEOUT.as_secs()
                    ),
                });
            }
            notifications.shutdown_timeout = bound;
        }
        let log_format = read(LOG_FORMAT)
            .map(|raw| LogFormat::try_from(raw.as_str()))
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            encryption_key,
            broker_url,
            notifications,
            log_format,
        })
    }
}

fn invalid(name: &'static str, err: &NotificationDomainError) -> ConfigError {
    ConfigError::Invalid {
        name,
        reason: err.to_string(),
    }
}
