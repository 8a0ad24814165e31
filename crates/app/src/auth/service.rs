//! Auth service.

use std::fmt::{Debug, Formatter, Result as FmtResult};

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockall::automock;

use crate::auth::{Actor, AuthServiceError, Claims};

/// Verifies HS256 bearer tokens signed with a shared secret.
#[derive(Clone)]
pub struct JwtAuthService {
    key: DecodingKey,
    validation: Validation,
}

impl JwtAuthService {
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);

        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl Debug for JwtAuthService {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("JwtAuthService")
            .field("key", &"**redacted**")
            .field("algorithms", &self.validation.algorithms)
            .finish()
    }
}

#[async_trait]
impl AuthService for JwtAuthService {
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Actor, AuthServiceError> {
        let token = decode::<Claims>(bearer_token, &self.key, &self.validation)?;

        Ok(token.claims.into())
    }
}

/// Sign `claims` with the shared secret.
///
/// # Errors
///
/// Returns [`AuthServiceError::InvalidToken`] when the claims cannot be encoded.
pub fn issue_token(claims: &Claims, secret: &[u8]) -> Result<String, AuthServiceError> {
    Ok(encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret),
    )?)
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Verify a bearer token and resolve the calling actor.
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Actor, AuthServiceError>;
}
