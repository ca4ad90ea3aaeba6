//! Default consumer side effect: a structured audit log line.

use crate::notification::{
    domain::Notification,
    ports::{DeliveryContext, NotificationHandler},
};
use async_trait::async_trait;
use tracing::info;

/// Records who completed which task, and when, for the recipient manager.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuditLogHandler;

#[async_trait]
impl NotificationHandler for AuditLogHandler {
    async fn handle(&self, notification: Notification, context: DeliveryContext<'_>) {
        info!(
            consumer_tag = %context.consumer_tag,
            delivery_tag = context.delivery_tag,
            task_id = %notification.task_id(),
            manager = notification.manager(),
            technician = notification.user().username(),
            completed_at = %notification.completed_at(),
            "{}: the tech {} performed the task {} on date {}",
            notification.manager(),
            notification.user().username(),
            notification.task_id(),
            notification.completed_at().to_rfc3339(),
        );
    }
}
