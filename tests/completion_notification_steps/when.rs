//! When steps for completion notification BDD scenarios.

use super::world::{NotificationWorld, run_async};
use chrono::{DateTime, Utc};
use eyre::{WrapErr, eyre};
use foreman::task::services::UpdateTaskRequest;
use rstest_bdd_macros::when;

/// Marks the scenario task completed at an RFC 3339 timestamp.
pub fn complete_task_at(world: &mut NotificationWorld, timestamp: &str) -> Result<(), eyre::Report> {
    let completed_at = timestamp
        .parse::<DateTime<Utc>>()
        .wrap_err("parse completion timestamp")?;
    update_task(world, |request| request.completed_at(completed_at))
}

fn update_task(
    world: &mut NotificationWorld,
    build: impl FnOnce(UpdateTaskRequest) -> UpdateTaskRequest,
) -> Result<(), eyre::Report> {
    let id = world
        .task
        .as_ref()
        .map(|task| task.id)
        .ok_or_else(|| eyre!("missing task in scenario world"))?;
    let updated = run_async(world.service()?.update(build(UpdateTaskRequest::new(id))))
        .wrap_err("update task")?;
    world.task = Some(updated.task);
    Ok(())
}

#[when(r#"the task is completed at "{timestamp}""#)]
fn task_completed(world: &mut NotificationWorld, timestamp: String) -> Result<(), eyre::Report> {
    complete_task_at(world, &timestamp)
}

#[when(r#"the task summary is changed to "{summary}""#)]
fn summary_changed(world: &mut NotificationWorld, summary: String) -> Result<(), eyre::Report> {
    update_task(world, |request| request.with_summary(summary))
}

#[when("shutdown is requested")]
fn shutdown_requested(world: &mut NotificationWorld) -> Result<(), eyre::Report> {
    world.settle()
}
