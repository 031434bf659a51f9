//! JWT claims extractor.

use crate::responses::AppError;
use ceo_core::CeoError;
use ceo_security::Claims;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

/// Extractor for the authenticated caller.
///
/// The auth middleware validates the bearer token and stores the claims;
/// this extractor only turns their absence into a 401.
pub struct AuthenticatedUser(pub Claims);

impl std::ops::Deref for AuthenticatedUser {
    type Target = Claims;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let has_bearer = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .is_some_and(|h| h.starts_with("Bearer "));

        if !has_bearer {
            return Err(AppError(CeoError::unauthorized("No token provided")));
        }

        // Claims are missing when the middleware rejected the token
        let claims = parts
            .extensions
            .get::<Claims>()
            .cloned()
            .ok_or_else(|| AppError(CeoError::unauthorized("Invalid or expired token")))?;

        Ok(AuthenticatedUser(claims))
    }
}
