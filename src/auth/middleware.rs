//! Authentication middleware with silent token refresh
//!
//! `verify_access` classifies the presented access token. A valid token goes
//! straight to the user lookup; an expired one hands over to `refresh_flow`,
//! which needs a valid refresh token and issues a new pair that is attached
//! to the outgoing response. Anything else is rejected.

use axum::{
    extract::{Extension, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::extractors::AuthedUser;
use super::tokens::{AccessCheck, TokenPair};
use super::transport::PresentedTokens;
use crate::common::{safe_token_log, ApiError, AppState};

/// Who the request belongs to, plus a replacement token pair when the
/// access token had to be refreshed.
#[derive(Debug)]
pub struct ResolvedIdentity {
    pub user: AuthedUser,
    pub reissued: Option<TokenPair>,
}

/// Route layer for protected endpoints.
pub async fn authenticate(
    Extension(state): Extension<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let presented = state.transport.extract(req.headers());
    let identity = resolve_identity(&state, presented).await?;

    req.extensions_mut().insert(identity.user);
    let mut response = next.run(req).await;

    if let Some(pair) = identity.reissued {
        state.transport.attach(response.headers_mut(), &pair);
    }
    Ok(response)
}

pub async fn resolve_identity(
    state: &AppState,
    presented: PresentedTokens,
) -> Result<ResolvedIdentity, ApiError> {
    let access = match presented.access {
        Some(token) => token,
        None => {
            debug!("Authentication failed: no access token presented");
            return Err(ApiError::Unauthorized(
                "Access denied. No token provided.".to_string(),
            ));
        }
    };

    match state.tokens.verify_access(&access) {
        AccessCheck::Valid(claims) => {
            let user = load_user(state, &claims.user_id).await?;
            Ok(ResolvedIdentity {
                user,
                reissued: None,
            })
        }
        AccessCheck::Expired => refresh_flow(state, presented.refresh.as_deref()).await,
        AccessCheck::Invalid(e) => {
            warn!(error = %e, token = %safe_token_log(&access), "Rejected access token");
            Err(ApiError::Unauthorized("Invalid token.".to_string()))
        }
    }
}

/// Exchanges a refresh token for a fresh pair. Only reached with an expired access token.
pub async fn refresh_flow(
    state: &AppState,
    refresh: Option<&str>,
) -> Result<ResolvedIdentity, ApiError> {
    let refresh = refresh.ok_or_else(|| {
        debug!("Access token expired and no refresh token presented");
        ApiError::Unauthorized("Access token expired. No refresh token provided.".to_string())
    })?;

    let claims = state.tokens.verify(refresh).map_err(|e| {
        warn!(error = %e, token = %safe_token_log(refresh), "Rejected refresh token");
        ApiError::Unauthorized("Invalid or expired refresh token.".to_string())
    })?;

    let user = load_user(state, &claims.user_id).await?;
    let pair = state
        .tokens
        .issue(&user.id)
        .map_err(|e| ApiError::InternalServer(format!("failed to issue tokens: {}", e)))?;

    info!(user_id = %user.id, "Silently refreshed session tokens");
    Ok(ResolvedIdentity {
        user,
        reissued: Some(pair),
    })
}

/// Runs on every authenticated request; a deleted account invalidates outstanding tokens.
async fn load_user(state: &AppState, user_id: &str) -> Result<AuthedUser, ApiError> {
    match state.users().find_by_id(user_id).await? {
        Some(user) => Ok(AuthedUser {
            id: user.id,
            email: user.email,
            name: user.name,
        }),
        None => {
            warn!(user_id = %user_id, "Token refers to a user that no longer exists");
            Err(ApiError::Unauthorized(
                "User not found. Token may be invalid.".to_string(),
            ))
        }
    }
}
