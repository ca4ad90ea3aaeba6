//! Consumer lifecycle states.

use std::fmt;

/// Lifecycle state of a notification consumer.
///
/// States only move forward: `Idle` → `Provisioned` → `Consuming` →
/// `Cancelling` → `Closed`. A consumer may also be closed directly from
/// `Provisioned` or `Idle` when it never started consuming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsumerState {
    /// Constructed; the queue has not been declared.
    Idle,
    /// The durable queue is declared and a consumer tag assigned.
    Provisioned,
    /// Deliveries are flowing to the processing loop.
    Consuming,
    /// Broker-side cancellation was requested; in-flight work may finish.
    Cancelling,
    /// The underlying channel is closed.
    Closed,
}

impl ConsumerState {
    /// Returns the canonical label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Provisioned => "provisioned",
            Self::Consuming => "consuming",
            Self::Cancelling => "cancelling",
            Self::Closed => "closed",
        }
    }

    /// Returns whether transition to `target` is allowed.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Idle, Self::Provisioned | Self::Closed)
                | (Self::Provisioned, Self::Consuming | Self::Closed)
                | (Self::Consuming, Self::Cancelling)
                | (Self::Cancelling, Self::Closed)
        )
    }
}

impl fmt::Display for ConsumerState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
