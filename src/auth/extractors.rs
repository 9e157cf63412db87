//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::http::request::Parts;
use axum::extract::FromRequestParts;
use tracing::error;

use crate::common::ApiError;

/// Authenticated user extractor
///
/// The identity is resolved by the `authenticate` middleware and stored in
/// the request extensions; handlers on protected routes just read it back.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthedUser>().cloned().ok_or_else(|| {
            error!(path = %parts.uri.path(), "AuthedUser requested on a route without the auth layer");
            ApiError::Unauthorized("Authentication required".to_string())
        })
    }
}
