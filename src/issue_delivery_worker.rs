use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use tracing::{Span, field::display};

use crate::{
    domain::SubscriberEmail,
    email_client::EmailClient,
    repository::{self, ClaimedIssue},
    startup::ApplicationContext,
};

const ISSUE_EMAIL_TEMPLATE: &str = include_str!("../views/issue_email.html");

pub enum ExecutionOutcome {
    IssueSent,
    NothingDue,
}

pub async fn run_worker_until_stopped(
    context: ApplicationContext,
    poll_interval: Duration,
) -> Result<(), anyhow::Error> {
    worker_loop(context, poll_interval).await
}

async fn worker_loop(
    context: ApplicationContext,
    poll_interval: Duration,
) -> Result<(), anyhow::Error> {
    loop {
        if let Err(e) = send_pending_issues(&context).await {
            tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "Failed to deliver pending issues"
            );
        }
        tokio::time::sleep(poll_interval).await;
    }
}

/// All issues delivered by one call share the same `sent_at`, captured on entry.
#[tracing::instrument(
    name = "Sending pending issues",
    skip_all,
    fields(issues_sent = tracing::field::Empty)
)]
pub async fn send_pending_issues(context: &ApplicationContext) -> Result<usize, anyhow::Error> {
    let now = Utc::now();
    let mut sent = 0;
    while let ExecutionOutcome::IssueSent = try_execute_task(context, now).await? {
        sent += 1;
    }
    Span::current().record("issues_sent", sent);
    if sent > 0 {
        tracing::info!("Delivered {} pending issue(s)", sent);
    }
    Ok(sent)
}

#[tracing::instrument(
    skip_all,
    fields(newsletter_issue_id = tracing::field::Empty, newsletter_id = tracing::field::Empty),
    err
)]
pub async fn try_execute_task(
    context: &ApplicationContext,
    now: DateTime<Utc>,
) -> Result<ExecutionOutcome, anyhow::Error> {
    let mut transaction = context
        .db_pool
        .begin()
        .await
        .context("Failed to acquire a Postgres connection from the pool.")?;

    let Some(issue) = repository::claim_pending_issue(&mut transaction, now)
        .await
        .context("Failed to look up pending issues.")?
    else {
        return Ok(ExecutionOutcome::NothingDue);
    };
    Span::current()
        .record("newsletter_issue_id", display(issue.id))
        .record("newsletter_id", display(issue.newsletter_id));

    let subscribers =
        repository::list_subscribers_by_newsletter(&mut transaction, issue.newsletter_id)
            .await
            .context("Failed to list the subscribers of the newsletter.")?;

    let (subject, html, text) = render_issue_email(&issue)?;
    let report = deliver_to_all(
        &context.email_client,
        subscribers.into_iter().map(|s| s.email),
        &subject,
        &html,
        &text,
    )
    .await;
    tracing::info!(
        delivered = report.delivered,
        failed = report.failed,
        "Finished delivering an issue"
    );

    repository::mark_issue_sent(&mut transaction, issue.id, now)
        .await
        .context("Failed to mark the issue as sent.")?;
    transaction
        .commit()
        .await
        .context("Failed to commit SQL transaction to mark an issue as sent.")?;

    Ok(ExecutionOutcome::IssueSent)
}

/// Attempts one email per address. Failures are logged and never abort the loop.
pub async fn deliver_to_all(
    email_client: &EmailClient,
    recipients: impl IntoIterator<Item = String>,
    subject: &str,
    html: &str,
    text: &str,
) -> DeliveryReport {
    let mut report = DeliveryReport::default();
    for address in recipients {
        let recipient = match SubscriberEmail::parse(address) {
            Ok(recipient) => recipient,
            Err(e) => {
                tracing::warn!(
                    error.message = %e,
                    "Skipping a subscriber. Their stored contact details are invalid."
                );
                report.failed += 1;
                continue;
            }
        };

        match email_client.send_email(&recipient, subject, html, text).await {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                tracing::error!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    subscriber_email = %recipient,
                    "Failed to deliver issue to a subscriber"
                );
                report.failed += 1;
            }
        }
    }
    report
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: usize,
}

fn render_issue_email(issue: &ClaimedIssue) -> Result<(String, String, String), anyhow::Error> {
    let subject = format!("Your Vibeletter – {}", issue.newsletter_name);

    let mut ctx = tera::Context::new();
    ctx.insert("newsletter_name", &issue.newsletter_name);
    ctx.insert("content", &issue.content);
    let html = tera::Tera::one_off(ISSUE_EMAIL_TEMPLATE, &ctx, true)
        .context("Failed to render the issue email template.")?;

    Ok((subject, html, issue.content.clone()))
}
