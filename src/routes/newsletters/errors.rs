use actix_web::{ResponseError, http::StatusCode};

use super::super::helpers::error_chain_fmt;

#[derive(thiserror::Error)]
pub enum CreateNewsletterError {
    #[error("{0}")]
    ValidationError(String),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for CreateNewsletterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for CreateNewsletterError {
    fn status_code(&self) -> StatusCode {
        match self {
            CreateNewsletterError::ValidationError(_) => StatusCode::BAD_REQUEST,
            CreateNewsletterError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
