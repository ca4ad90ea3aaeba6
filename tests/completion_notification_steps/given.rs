//! Given steps for completion notification BDD scenarios.

use std::time::Duration;

use super::when::complete_task_at;
use super::world::{NotificationWorld, run_async};
use eyre::WrapErr;
use foreman::task::{domain::Role, services::CreateTaskRequest};
use rstest_bdd_macros::given;

#[given(r#"managers "{first}" and "{second}""#)]
fn managers(world: &mut NotificationWorld, first: String, second: String) -> Result<(), eyre::Report> {
    for name in [first, second] {
        let manager = world.next_user(&name)?;
        world
            .directory
            .add_user(manager, Role::Manager)
            .wrap_err("register manager")?;
    }
    Ok(())
}

#[given("a broker that never confirms consumer cancellation")]
fn broker_holds_streams(world: &mut NotificationWorld) -> Result<(), eyre::Report> {
    world
        .broker
        .hold_streams_on_cancel()
        .wrap_err("configure broker")
}

#[given("a drain bound of {millis:u64} milliseconds")]
fn drain_bound(world: &mut NotificationWorld, millis: u64) {
    world.settings.shutdown_timeout = Duration::from_millis(millis);
}

#[given("the notification pipeline is running")]
fn pipeline_running(world: &mut NotificationWorld) -> Result<(), eyre::Report> {
    world.start_pipeline()
}

#[given(r#"an open task owned by technician "{name}""#)]
fn open_task(world: &mut NotificationWorld, name: String) -> Result<(), eyre::Report> {
    let technician = world.next_user(&name)?;
    world
        .directory
        .add_user(technician.clone(), Role::Technician)
        .wrap_err("register technician")?;
    let request = CreateTaskRequest::new("inspect the chiller", technician);
    let created = run_async(world.service()?.create(request)).wrap_err("create task")?;
    world.task = Some(created);
    Ok(())
}

#[given(r#"the task is completed at "{timestamp}""#)]
fn task_already_completed(world: &mut NotificationWorld, timestamp: String) -> Result<(), eyre::Report> {
    complete_task_at(world, &timestamp)
}
