use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::domain::{
    Issue, NewNewsletter, Newsletter, NewsletterSummary, Subscriber, SubscriberEmail,
};

#[tracing::instrument(name = "Saving a new newsletter", skip_all)]
pub async fn insert_newsletter(
    pool: &PgPool,
    newsletter: &NewNewsletter,
) -> Result<Newsletter, sqlx::Error> {
    sqlx::query_as::<_, Newsletter>(
        r#"
        INSERT INTO newsletters (id, name, prompt, created_at)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, prompt, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(newsletter.name.as_ref())
    .bind(newsletter.prompt.as_ref())
    .bind(Utc::now())
    .fetch_one(pool)
    .await
}

#[tracing::instrument(name = "Listing newsletters with subscriber counts", skip(pool))]
pub async fn list_newsletter_summaries(
    pool: &PgPool,
) -> Result<Vec<NewsletterSummary>, sqlx::Error> {
    sqlx::query_as::<_, NewsletterSummary>(
        r#"
        SELECT n.id, n.name, n.prompt, n.created_at, COUNT(s.id) AS subscriber_count
        FROM newsletters n
        LEFT JOIN subscribers s ON s.newsletter_id = n.id
        GROUP BY n.id
        ORDER BY n.created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await
}

#[tracing::instrument(name = "Listing newsletters", skip(pool))]
pub async fn list_newsletters(pool: &PgPool) -> Result<Vec<Newsletter>, sqlx::Error> {
    sqlx::query_as::<_, Newsletter>(
        r#"
        SELECT id, name, prompt, created_at
        FROM newsletters
        ORDER BY created_at
        "#,
    )
    .fetch_all(pool)
    .await
}

#[tracing::instrument(name = "Getting a newsletter", skip(pool))]
pub async fn get_newsletter(
    pool: &PgPool,
    newsletter_id: Uuid,
) -> Result<Option<Newsletter>, sqlx::Error> {
    sqlx::query_as::<_, Newsletter>(
        r#"
        SELECT id, name, prompt, created_at
        FROM newsletters
        WHERE id = $1
        "#,
    )
    .bind(newsletter_id)
    .fetch_optional(pool)
    .await
}

#[tracing::instrument(
    name = "Saving new subscriber details in the database",
    skip(connection, email),
    fields(subscriber_email = %email)
)]
pub async fn insert_subscriber(
    connection: &mut PgConnection,
    newsletter_id: Uuid,
    email: &SubscriberEmail,
) -> Result<Uuid, sqlx::Error> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO subscribers (id, newsletter_id, email, signed_up_at)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(id)
    .bind(newsletter_id)
    .bind(email.as_ref())
    .bind(Utc::now())
    .execute(connection)
    .await?;

    Ok(id)
}

#[tracing::instrument(name = "Listing subscribers of a newsletter", skip(connection))]
pub async fn list_subscribers_by_newsletter(
    connection: &mut PgConnection,
    newsletter_id: Uuid,
) -> Result<Vec<Subscriber>, sqlx::Error> {
    sqlx::query_as::<_, Subscriber>(
        r#"
        SELECT id, newsletter_id, email, signed_up_at
        FROM subscribers
        WHERE newsletter_id = $1
        ORDER BY signed_up_at
        "#,
    )
    .bind(newsletter_id)
    .fetch_all(connection)
    .await
}

#[tracing::instrument(name = "Saving a newsletter issue", skip(connection, content))]
pub async fn insert_issue(
    connection: &mut PgConnection,
    newsletter_id: Uuid,
    content: &str,
    scheduled_send_at: DateTime<Utc>,
) -> Result<Issue, sqlx::Error> {
    sqlx::query_as::<_, Issue>(
        r#"
        INSERT INTO newsletter_issues (id, newsletter_id, content, scheduled_send_at)
        VALUES ($1, $2, $3, $4)
        RETURNING id, newsletter_id, content, scheduled_send_at, sent_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(newsletter_id)
    .bind(content)
    .bind(scheduled_send_at)
    .fetch_one(connection)
    .await
}

/// An unsent issue locked by the current transaction, with the name of its newsletter.
#[derive(Debug, sqlx::FromRow)]
pub struct ClaimedIssue {
    pub id: Uuid,
    pub newsletter_id: Uuid,
    pub newsletter_name: String,
    pub content: String,
}

/// Locks one due, unsent issue. Rows locked by a concurrent sweep are skipped.
#[tracing::instrument(name = "Claiming a pending issue", skip(connection))]
pub async fn claim_pending_issue(
    connection: &mut PgConnection,
    due_by: DateTime<Utc>,
) -> Result<Option<ClaimedIssue>, sqlx::Error> {
    sqlx::query_as::<_, ClaimedIssue>(
        r#"
        SELECT i.id, i.newsletter_id, n.name AS newsletter_name, i.content
        FROM newsletter_issues i
        JOIN newsletters n ON n.id = i.newsletter_id
        WHERE i.sent_at IS NULL AND i.scheduled_send_at <= $1
        ORDER BY i.scheduled_send_at
        LIMIT 1
        FOR UPDATE OF i SKIP LOCKED
        "#,
    )
    .bind(due_by)
    .fetch_optional(connection)
    .await
}

#[tracing::instrument(name = "Marking an issue as sent", skip(connection))]
pub async fn mark_issue_sent(
    connection: &mut PgConnection,
    issue_id: Uuid,
    sent_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE newsletter_issues
        SET sent_at = $2
        WHERE id = $1 AND sent_at IS NULL
        "#,
    )
    .bind(issue_id)
    .bind(sent_at)
    .execute(connection)
    .await?;

    Ok(())
}
