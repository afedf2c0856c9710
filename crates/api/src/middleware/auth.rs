//! # Caller Identity
//!
//! Authentication happens upstream of this service. The gateway forwards the
//! authenticated identity in two headers, which are trusted as-is:
//!
//! - `X-User-Id`: the caller's UUID (for masters this is also the master id)
//! - `X-User-Role`: one of `user`, `master`, `admin`
//!
//! Missing or malformed headers yield 401; a valid caller with the wrong role
//! for a route yields 403.

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use timebook_core::errors::BookingError;
use timebook_core::models::caller::{Caller, CallerScope, Role};
use uuid::Uuid;

use super::error_handling::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Extractor for the authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentCaller(pub Caller);

impl CurrentCaller {
    pub fn scope(&self) -> CallerScope {
        self.0.scope()
    }

    /// The caller's user id, if they act as a client.
    pub fn require_client(&self) -> Result<Uuid, AppError> {
        self.require(Role::User)
    }

    /// The caller's master id, if they act as a master.
    pub fn require_master(&self) -> Result<Uuid, AppError> {
        self.require(Role::Master)
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        self.require(Role::Admin).map(|_| ())
    }

    fn require(&self, role: Role) -> Result<Uuid, AppError> {
        if self.0.role != role {
            return Err(AppError(BookingError::Authorization(format!(
                "This endpoint requires the {:?} role",
                role
            ))));
        }
        Ok(self.0.id)
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, AppError> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| {
            AppError(BookingError::Authentication(format!(
                "Missing or unreadable {} header",
                name
            )))
        })
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentCaller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = Uuid::parse_str(header(parts, USER_ID_HEADER)?.trim()).map_err(|_| {
            AppError(BookingError::Authentication(
                "Caller id is not a valid UUID".to_string(),
            ))
        })?;
        let role: Role = header(parts, USER_ROLE_HEADER)?.parse()?;

        Ok(CurrentCaller(Caller { id, role }))
    }
}
