use actix_web::{HttpResponse, web};
use anyhow::Context;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::CreateIssueError;
use crate::{domain::next_issue_send_time, repository, startup::ApplicationContext};

pub const ISSUE_INSTRUCTION: &str =
    "Write a newsletter issue with the tone of a friendly AI assistant.";

#[derive(serde::Serialize)]
pub struct CreatedIssue {
    pub id: Uuid,
    pub scheduled_send_at: DateTime<Utc>,
}

#[tracing::instrument(name = "Creating a newsletter issue", skip(context))]
pub async fn create_issue(
    newsletter_id: web::Path<Uuid>,
    context: web::Data<ApplicationContext>,
) -> Result<HttpResponse, CreateIssueError> {
    let newsletter = repository::get_newsletter(&context.db_pool, newsletter_id.into_inner())
        .await
        .context("Failed to read the newsletter from the database.")?
        .ok_or(CreateIssueError::NewsletterNotFound)?;

    let content = context
        .content_generator
        .generate(ISSUE_INSTRUCTION, &newsletter.prompt)
        .await?;

    let mut connection = context
        .db_pool
        .acquire()
        .await
        .context("Failed to acquire a Postgres connection from the pool.")?;
    let issue = repository::insert_issue(
        &mut connection,
        newsletter.id,
        &content,
        next_issue_send_time(Utc::now()),
    )
    .await
    .context("Failed to store the newsletter issue.")?;

    Ok(HttpResponse::Created().json(CreatedIssue {
        id: issue.id,
        scheduled_send_at: issue.scheduled_send_at,
    }))
}
