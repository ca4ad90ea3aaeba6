//! Then steps for completion notification BDD scenarios.

use std::time::Duration;

use super::world::NotificationWorld;
use chrono::{DateTime, Utc};
use eyre::{WrapErr, eyre};
use foreman::notification::{domain::Notification, services::ShutdownOutcome};
use rstest_bdd_macros::then;

fn observed(world: &mut NotificationWorld) -> Result<Vec<Notification>, eyre::Report> {
    world.settle()?;
    world.handler.received().wrap_err("read handled notifications")
}

#[then("{count:u64} notifications are observed on the queue")]
fn notifications_observed(world: &mut NotificationWorld, count: u64) -> Result<(), eyre::Report> {
    let received = observed(world)?;
    let published = world.broker.published().wrap_err("read published messages")?;
    let expected = usize::try_from(count).wrap_err("notification count")?;
    if published.len() != expected {
        return Err(eyre!("expected {expected} published messages, found {}", published.len()));
    }
    if received.len() != expected {
        return Err(eyre!("expected {expected} consumed notifications, found {}", received.len()));
    }
    let acknowledged = world.broker.acknowledged().wrap_err("read acknowledgements")?;
    if acknowledged.len() != expected {
        return Err(eyre!("expected every delivery to be acknowledged"));
    }
    Ok(())
}

#[then(r#"every notification carries task {id:u64} and timestamp "{timestamp}""#)]
fn notifications_share_task(
    world: &mut NotificationWorld,
    id: u64,
    timestamp: String,
) -> Result<(), eyre::Report> {
    let expected_at = timestamp
        .parse::<DateTime<Utc>>()
        .wrap_err("parse expected timestamp")?;
    let expected_id = i64::try_from(id).wrap_err("task id")?;
    for notification in observed(world)? {
        if notification.task_id().value() != expected_id {
            return Err(eyre!("unexpected task id {}", notification.task_id()));
        }
        if notification.completed_at() != expected_at {
            return Err(eyre!("unexpected timestamp {}", notification.completed_at()));
        }
    }
    Ok(())
}

#[then(r#"the notifications are addressed to "{first}" and "{second}""#)]
fn notifications_addressed(
    world: &mut NotificationWorld,
    first: String,
    second: String,
) -> Result<(), eyre::Report> {
    let mut managers: Vec<String> = observed(world)?
        .iter()
        .map(|notification| notification.manager().to_owned())
        .collect();
    managers.sort();
    let mut expected = vec![first, second];
    expected.sort();
    if managers != expected {
        return Err(eyre!("expected recipients {expected:?}, found {managers:?}"));
    }
    Ok(())
}

#[then("the consumer reports a drain timeout")]
fn drain_timed_out(world: &NotificationWorld) -> Result<(), eyre::Report> {
    match world.outcome {
        Some(ShutdownOutcome::TimedOut) => Ok(()),
        other => Err(eyre!("expected a drain timeout, found {other:?}")),
    }
}

#[then("shutdown completes within {millis:u64} milliseconds")]
fn shutdown_within(world: &NotificationWorld, millis: u64) -> Result<(), eyre::Report> {
    let elapsed = world
        .stop_elapsed
        .ok_or_else(|| eyre!("shutdown was not requested"))?;
    if elapsed > Duration::from_millis(millis) {
        return Err(eyre!("shutdown took {elapsed:?}"));
    }
    Ok(())
}

#[then("the channel is closed")]
fn channel_closed(world: &NotificationWorld) -> Result<(), eyre::Report> {
    if world.broker.is_closed().wrap_err("read broker state")? {
        Ok(())
    } else {
        Err(eyre!("expected the broker channel to be closed"))
    }
}
