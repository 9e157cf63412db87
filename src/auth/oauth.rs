//! Google OAuth authorization-code login
//!
//! The callback never answers with an error body: every failure sends the
//! browser back to the frontend login page with a short error code.

use axum::{
    extract::{Extension, Query},
    http::{header::LOCATION, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::handlers::deliver_tokens;
use super::models::UserSummary;
use crate::common::{normalize_email, safe_email_log, AppState};
use crate::services::google::OAuthError;

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
}

/// Error codes understood by the frontend login page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthFailure {
    Denied,
    NoCode,
    ConfigError,
    TokenExchangeFailed,
    NoAccessToken,
    UserInfoFailed,
    NoEmail,
    DatabaseError,
    TokenGenerationFailed,
}

impl OAuthFailure {
    pub fn code(&self) -> &'static str {
        match self {
            OAuthFailure::Denied => "oauth_denied",
            OAuthFailure::NoCode => "no_code",
            OAuthFailure::ConfigError => "config_error",
            OAuthFailure::TokenExchangeFailed => "token_exchange_failed",
            OAuthFailure::NoAccessToken => "no_access_token",
            OAuthFailure::UserInfoFailed => "user_info_failed",
            OAuthFailure::NoEmail => "no_email",
            OAuthFailure::DatabaseError => "database_error",
            OAuthFailure::TokenGenerationFailed => "token_generation_failed",
        }
    }
}

/// Payload handed to the frontend callback page in the `tokens` query parameter
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CallbackPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    user: UserSummary,
}

fn redirect(location: &str, mut headers: HeaderMap) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => {
            headers.insert(LOCATION, value);
            (StatusCode::FOUND, headers).into_response()
        }
        Err(e) => {
            error!(error = %e, "Redirect location is not a valid header value");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn failure_redirect(state: &AppState, failure: OAuthFailure) -> Response {
    let location = format!("{}/login?error={}", state.config.frontend_url, failure.code());
    redirect(&location, HeaderMap::new())
}

/// GET /api/auth/google
pub async fn google_start(Extension(state): Extension<Arc<AppState>>) -> Response {
    match &state.identity_provider {
        Some(provider) => {
            info!("Redirecting to Google for OAuth consent");
            redirect(&provider.authorization_url(), HeaderMap::new())
        }
        None => {
            error!("Google OAuth requested but client settings are missing");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "OAuth not configured", "code": "OAUTH_NOT_CONFIGURED" })),
            )
                .into_response()
        }
    }
}

/// GET /api/auth/google/callback
pub async fn google_callback(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Response {
    match complete_login(&state, params).await {
        Ok(response) => response,
        Err(failure) => {
            warn!(reason = failure.code(), "Google OAuth login failed");
            failure_redirect(&state, failure)
        }
    }
}

async fn complete_login(state: &AppState, params: CallbackParams) -> Result<Response, OAuthFailure> {
    if let Some(provider_error) = params.error {
        info!(error = %provider_error, "User did not grant OAuth consent");
        return Err(OAuthFailure::Denied);
    }

    let code = params
        .code
        .filter(|c| !c.trim().is_empty())
        .ok_or(OAuthFailure::NoCode)?;

    let provider = state
        .identity_provider
        .as_ref()
        .ok_or(OAuthFailure::ConfigError)?;

    let provider_token = provider.exchange_code(&code).await.map_err(|e| {
        error!(error = %e, "OAuth code exchange failed");
        match e {
            OAuthError::NoAccessToken => OAuthFailure::NoAccessToken,
            _ => OAuthFailure::TokenExchangeFailed,
        }
    })?;

    let profile = provider.fetch_profile(&provider_token).await.map_err(|e| {
        error!(error = %e, "OAuth profile request failed");
        OAuthFailure::UserInfoFailed
    })?;

    let email = profile
        .email
        .as_deref()
        .map(normalize_email)
        .filter(|e| !e.is_empty())
        .ok_or(OAuthFailure::NoEmail)?;

    let user = state.users().upsert_oauth(&email, &profile).await.map_err(|e| {
        error!(error = %e, email = %safe_email_log(&email), "OAuth user upsert failed");
        OAuthFailure::DatabaseError
    })?;

    let pair = state.tokens.issue(&user.id).map_err(|e| {
        error!(error = %e, user_id = %user.id, "OAuth token generation failed");
        OAuthFailure::TokenGenerationFailed
    })?;

    let mut headers = HeaderMap::new();
    let (access_token, refresh_token) = deliver_tokens(state, &mut headers, pair);
    let payload = CallbackPayload {
        access_token,
        refresh_token,
        user: UserSummary::from(&user),
    };
    let encoded = serde_json::to_string(&payload).map_err(|e| {
        error!(error = %e, "Failed to serialize OAuth callback payload");
        OAuthFailure::TokenGenerationFailed
    })?;

    info!(user_id = %user.id, "Google OAuth login succeeded");
    let location = format!(
        "{}/auth/google/callback?tokens={}",
        state.config.frontend_url,
        urlencoding::encode(&encoded)
    );
    Ok(redirect(&location, headers))
}
