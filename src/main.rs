use std::fmt::{Debug, Display};

use anyhow::Context;
use tokio::task::JoinError;
use vibeletter::{
    configuration::get_configuration,
    issue_delivery_worker::run_worker_until_stopped,
    scheduler::run_scheduler_until_stopped,
    startup::Application,
    telemetry::{get_subscriber, init_subscriber},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("vibeletter".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let config = get_configuration().context("Failed to read configuration")?;
    let schedule = config
        .scheduler
        .schedule()
        .map_err(anyhow::Error::msg)
        .context("Invalid scheduler configuration")?;
    let poll_interval = config.delivery.poll_interval();

    let application = Application::build(config).await?;
    tracing::info!(port = application.get_port(), "Listening");
    let context = application.context().clone();

    let app = tokio::spawn(application.run_until_stopped());
    let worker = tokio::spawn(run_worker_until_stopped(context.clone(), poll_interval));
    let scheduler = tokio::spawn(run_scheduler_until_stopped(context, schedule));

    tokio::select! {
        outcome = app => report_exit("API", outcome),
        outcome = worker => report_exit("Issue delivery worker", outcome),
        outcome = scheduler => report_exit("Daily issue scheduler", outcome),
    }

    Ok(())
}

fn report_exit(task_name: &str, outcome: Result<Result<(), impl Debug + Display>, JoinError>) {
    match outcome {
        Ok(Ok(())) => {
            tracing::info!("{} has exited", task_name)
        }
        Ok(Err(e)) => {
            tracing::error!(
            error.cause_chain = ?e,
            error.message = %e,
            "{} failed",
            task_name
            )
        }
        Err(e) => {
            tracing::error!(
            error.cause_chain = ?e,
            error.message = %e,
            "{} task failed to complete",
            task_name
            )
        }
    }
}
