use actix_web::{HttpResponse, web};
use anyhow::Context;
use uuid::Uuid;

use super::errors::SubscribeError;
use crate::{domain::SubscriberEmail, repository, startup::ApplicationContext};

#[derive(serde::Deserialize)]
pub struct SubscribeBody {
    pub email: Option<String>,
}

#[tracing::instrument(
    name = "Adding a new subscriber.",
    skip(body, context),
    fields(subscriber_email = body.email.as_deref().unwrap_or_default())
)]
pub async fn subscribe(
    newsletter_id: web::Path<Uuid>,
    body: web::Json<SubscribeBody>,
    context: web::Data<ApplicationContext>,
) -> Result<HttpResponse, SubscribeError> {
    let newsletter_id = newsletter_id.into_inner();
    let email = SubscriberEmail::parse(body.into_inner().email.unwrap_or_default())
        .map_err(SubscribeError::ValidationError)?;

    let mut transaction = context
        .db_pool
        .begin()
        .await
        .context("Failed to acquire a Postgres connection from the pool.")?;

    // Dropping the transaction on the error path rolls it back.
    repository::insert_subscriber(&mut transaction, newsletter_id, &email)
        .await
        .map_err(|e| classify_insert_error(e, &email))?;

    transaction
        .commit()
        .await
        .map_err(|e| classify_insert_error(e, &email))?;

    Ok(HttpResponse::Created().finish())
}

fn classify_insert_error(e: sqlx::Error, email: &SubscriberEmail) -> SubscribeError {
    match e.as_database_error() {
        Some(db_error) if db_error.is_unique_violation() => {
            SubscribeError::AlreadySubscribed(email.as_ref().to_string())
        }
        Some(db_error) if db_error.is_foreign_key_violation() => {
            SubscribeError::NewsletterNotFound
        }
        _ => SubscribeError::UnexpectedError(
            anyhow::Error::new(e).context("Failed to store a new subscriber."),
        ),
    }
}
