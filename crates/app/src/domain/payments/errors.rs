//! Payments service errors.

use sqlx::Error;
use thiserror::Error;

use crate::domain::payments::{provider::ProviderError, webhook::WebhookError};

#[derive(Debug, Error)]
pub enum PaymentsServiceError {
    #[error("appointment or checkout session not found")]
    NotFound,

    #[error("appointment cannot be paid")]
    NotPayable,

    #[error("{0}")]
    Validation(&'static str),

    #[error("payment provider error")]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Webhook(#[from] WebhookError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for PaymentsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        Self::Sql(error)
    }
}
