use actix_web::{ResponseError, http::StatusCode};

use super::super::helpers::error_chain_fmt;
use crate::content_generator::GenerationError;

#[derive(thiserror::Error)]
pub enum CreateIssueError {
    #[error("There is no newsletter with this id.")]
    NewsletterNotFound,
    #[error("Failed to generate the issue content.")]
    GenerationError(#[from] GenerationError),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for CreateIssueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for CreateIssueError {
    fn status_code(&self) -> StatusCode {
        match self {
            CreateIssueError::NewsletterNotFound => StatusCode::NOT_FOUND,
            CreateIssueError::GenerationError(_) | CreateIssueError::UnexpectedError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
