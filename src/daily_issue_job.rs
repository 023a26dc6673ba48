use anyhow::Context;
use chrono::{DateTime, Utc};

use crate::{issue_delivery_worker::send_pending_issues, repository, startup::ApplicationContext};

pub const DAILY_ISSUE_INSTRUCTION: &str = "Write a friendly, informative newsletter issue.";

#[derive(Debug, Default, PartialEq, Eq)]
pub struct DailyJobReport {
    pub issues_generated: usize,
    pub generation_failures: usize,
    pub issues_sent: usize,
}

#[tracing::instrument(name = "Running the daily issue job", skip_all)]
pub async fn run_daily_issue_job(
    context: &ApplicationContext,
) -> Result<DailyJobReport, anyhow::Error> {
    let (issues_generated, generation_failures) =
        generate_daily_issues(context, Utc::now()).await?;
    let issues_sent = send_pending_issues(context).await?;

    Ok(DailyJobReport {
        issues_generated,
        generation_failures,
        issues_sent,
    })
}

/// Returns `(generated, failed)`. A generation failure only skips that newsletter.
#[tracing::instrument(name = "Generating daily issues", skip(context))]
pub async fn generate_daily_issues(
    context: &ApplicationContext,
    now: DateTime<Utc>,
) -> Result<(usize, usize), anyhow::Error> {
    let newsletters = repository::list_newsletters(&context.db_pool)
        .await
        .context("Failed to list newsletters.")?;

    let mut generated = 0;
    let mut failed = 0;
    for newsletter in newsletters {
        let content = match context
            .content_generator
            .generate(DAILY_ISSUE_INSTRUCTION, &newsletter.prompt)
            .await
        {
            Ok(content) => content,
            Err(e) => {
                tracing::error!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    newsletter_id = %newsletter.id,
                    "Failed to generate the daily issue"
                );
                failed += 1;
                continue;
            }
        };

        let mut connection = context
            .db_pool
            .acquire()
            .await
            .context("Failed to acquire a Postgres connection from the pool.")?;
        repository::insert_issue(&mut connection, newsletter.id, &content, now)
            .await
            .with_context(|| format!("Failed to store the daily issue of {}.", newsletter.id))?;
        generated += 1;
    }

    Ok((generated, failed))
}
