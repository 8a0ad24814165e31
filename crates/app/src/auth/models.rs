//! Auth data models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::appointments::records::CustomerUuid;

/// Claims carried by an HS256 bearer token issued by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// User identifier.
    pub sub: Uuid,

    pub email: String,

    #[serde(default)]
    pub is_admin: bool,

    /// Expiry as seconds since the Unix epoch.
    pub exp: u64,
}

/// The verified caller of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub uuid: CustomerUuid,
    pub email: String,
    pub is_admin: bool,
}

impl Actor {
    #[must_use]
    pub fn customer(uuid: CustomerUuid, email: impl Into<String>) -> Self {
        Self {
            uuid,
            email: email.into(),
            is_admin: false,
        }
    }

    #[must_use]
    pub fn admin(uuid: CustomerUuid, email: impl Into<String>) -> Self {
        Self {
            uuid,
            email: email.into(),
            is_admin: true,
        }
    }
}

impl From<Claims> for Actor {
    fn from(claims: Claims) -> Self {
        Self {
            uuid: CustomerUuid::from_uuid(claims.sub),
            email: claims.email,
            is_admin: claims.is_admin,
        }
    }
}
