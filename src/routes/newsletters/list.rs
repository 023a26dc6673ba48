use actix_web::{HttpResponse, web};
use anyhow::Context;

use crate::{repository, routes::helpers::e500, startup::ApplicationContext};

#[tracing::instrument(name = "Listing newsletters", skip(context))]
pub async fn list_newsletters(
    context: web::Data<ApplicationContext>,
) -> Result<HttpResponse, actix_web::Error> {
    let newsletters = repository::list_newsletter_summaries(&context.db_pool)
        .await
        .context("Failed to read newsletters from the database.")
        .map_err(e500)?;

    Ok(HttpResponse::Ok().json(newsletters))
}
