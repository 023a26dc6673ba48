use actix_web::{HttpResponse, web};
use anyhow::Context;

use super::errors::CreateNewsletterError;
use crate::{domain::NewNewsletter, repository, startup::ApplicationContext};

#[derive(serde::Deserialize)]
pub struct NewNewsletterBody {
    pub name: Option<String>,
    pub prompt: Option<String>,
}

#[tracing::instrument(
    name = "Creating a newsletter",
    skip(body, context),
    fields(newsletter_name = body.name.as_deref().unwrap_or_default())
)]
pub async fn create_newsletter(
    body: web::Json<NewNewsletterBody>,
    context: web::Data<ApplicationContext>,
) -> Result<HttpResponse, CreateNewsletterError> {
    let NewNewsletterBody { name, prompt } = body.into_inner();
    let new_newsletter =
        NewNewsletter::parse(name, prompt).map_err(CreateNewsletterError::ValidationError)?;

    let newsletter = repository::insert_newsletter(&context.db_pool, &new_newsletter)
        .await
        .context("Failed to insert a new newsletter in the database.")?;

    Ok(HttpResponse::Created().json(newsletter))
}
