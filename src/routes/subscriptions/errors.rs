use actix_web::{ResponseError, http::StatusCode};

use super::super::helpers::error_chain_fmt;

#[derive(thiserror::Error)]
pub enum SubscribeError {
    #[error("{0}")]
    ValidationError(String),
    #[error("{0} is already subscribed.")]
    AlreadySubscribed(String),
    #[error("There is no newsletter with this id.")]
    NewsletterNotFound,
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for SubscribeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for SubscribeError {
    fn status_code(&self) -> StatusCode {
        match self {
            SubscribeError::ValidationError(_) | SubscribeError::AlreadySubscribed(_) => {
                StatusCode::BAD_REQUEST
            }
            SubscribeError::NewsletterNotFound => StatusCode::NOT_FOUND,
            SubscribeError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
