//! Auth service errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthServiceError {
    #[error("invalid bearer token")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),
}

impl From<jsonwebtoken::errors::Error> for AuthServiceError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        Self::InvalidToken(error)
    }
}
