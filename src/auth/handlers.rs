//! Authentication handlers

use axum::{
    extract::{Extension, Json},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::extractors::AuthedUser;
use super::models::{
    EmailRequest, LoginRequest, MessageResponse, ProfileView, RefreshRequest, ResendOtpRequest,
    ResetPasswordRequest, SessionResponse, SignupRequest, User, VerifyEmailRequest,
};
use super::otp::OtpPurpose;
use super::password::{hash_password_blocking, verify_password_blocking};
use super::tokens::TokenPair;
use super::users::default_name;
use super::validators::{
    LoginValidator, ResetPasswordValidator, SignupValidator, VerifyEmailValidator,
};
use crate::common::config::TransportKind;
use crate::common::validation::is_valid_email;
use crate::common::{normalize_email, safe_email_log, ApiError, AppState, Validator};
use crate::services::email::{otp_email, EmailError};

const GENERIC_RESET_MESSAGE: &str =
    "If an account exists for this email, a password reset code has been sent";
const GENERIC_RESEND_MESSAGE: &str =
    "If an account exists for this email, a new code has been sent";

/// Hands a fresh pair to the client the way the active transport expects.
///
/// Header transport: returned for the JSON body. Cookie transport: set as
/// cookies on `headers`, and nothing goes in the body.
pub(crate) fn deliver_tokens(
    state: &AppState,
    headers: &mut HeaderMap,
    pair: TokenPair,
) -> (Option<String>, Option<String>) {
    match state.transport.kind() {
        TransportKind::Header => (Some(pair.access_token), Some(pair.refresh_token)),
        TransportKind::Cookie => {
            state.transport.attach(headers, &pair);
            (None, None)
        }
    }
}

fn issue_tokens(state: &AppState, user_id: &str) -> Result<TokenPair, ApiError> {
    state
        .tokens
        .issue(user_id)
        .map_err(|e| ApiError::InternalServer(format!("failed to issue tokens: {}", e)))
}

fn session_response(state: &AppState, message: &str, user: &User) -> Result<Response, ApiError> {
    let pair = issue_tokens(state, &user.id)?;
    let mut headers = HeaderMap::new();
    let (access_token, refresh_token) = deliver_tokens(state, &mut headers, pair);

    let body = SessionResponse {
        message: message.to_string(),
        access_token,
        refresh_token,
        user: user.into(),
    };
    Ok((StatusCode::OK, headers, Json(body)).into_response())
}

async fn send_otp_email(
    state: &AppState,
    email: &str,
    code: &str,
    purpose: OtpPurpose,
) -> Result<(), EmailError> {
    let (subject, body) = otp_email(code, purpose);
    state.mailer.send(email, &subject, &body).await
}

fn require_email(email: &str) -> Result<String, ApiError> {
    if !is_valid_email(email) {
        return Err(ApiError::ValidationError(
            "email: Please provide a valid email".to_string(),
        ));
    }
    Ok(normalize_email(email))
}

/// POST /api/auth/signup
///
/// Creates an unverified account and emails a signup code. If the email
/// cannot be delivered the account is removed again.
pub async fn signup(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<SignupRequest>,
) -> Result<Response, ApiError> {
    SignupValidator.validate(&payload).into_result()?;
    let email = normalize_email(&payload.email);

    let users = state.users();
    if users.find_by_email(&email).await?.is_some() {
        warn!(email = %safe_email_log(&email), "Signup for an existing account");
        return Err(ApiError::Conflict("User already exists".to_string()));
    }

    let password_hash = hash_password_blocking(payload.password).await?;
    let name = payload
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| default_name(&email));

    let user = users.create(&email, &password_hash, &name).await?;

    let code = state.otps().create(&email, OtpPurpose::Signup).await?;
    if let Err(e) = send_otp_email(&state, &email, &code, OtpPurpose::Signup).await {
        error!(error = %e, user_id = %user.id, "Verification email failed, rolling back signup");
        users.delete(&user.id).await?;
        return Err(ApiError::InternalServer(format!(
            "Failed to send verification email: {}",
            e
        )));
    }

    info!(user_id = %user.id, "User signed up, awaiting verification");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User created successfully. Please verify your email.",
            "userId": user.id,
            "email": user.email,
        })),
    )
        .into_response())
}

/// POST /api/auth/verify-email
pub async fn verify_email(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<VerifyEmailRequest>,
) -> Result<Response, ApiError> {
    VerifyEmailValidator.validate(&payload).into_result()?;
    let email = normalize_email(&payload.email);

    if !state.otps().verify(&email, &payload.otp, OtpPurpose::Signup).await? {
        return Err(ApiError::BadRequest("Invalid or expired OTP".to_string()));
    }

    let users = state.users();
    let user = match users.find_by_email(&email).await? {
        Some(user) => user,
        None => return Err(ApiError::BadRequest("User not found".to_string())),
    };
    let user = users.mark_verified(&user.id).await?;

    info!(user_id = %user.id, "Email verified");
    session_response(&state, "Email verified successfully", &user)
}

/// POST /api/auth/login
///
/// Unknown email and wrong password give the same answer. The verified flag
/// is only checked once the password is known to be right.
pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    LoginValidator.validate(&payload).into_result()?;
    let email = normalize_email(&payload.email);
    let invalid = || ApiError::BadRequest("Invalid credentials".to_string());

    let users = state.users();
    let user = users.find_by_email(&email).await?.ok_or_else(invalid)?;

    if !verify_password_blocking(payload.password, user.password_hash.clone()).await? {
        warn!(email = %safe_email_log(&email), "Login with wrong password");
        return Err(invalid());
    }

    if !user.is_verified {
        return Err(ApiError::BadRequest(
            "Please verify your email first".to_string(),
        ));
    }

    users.touch_last_login(&user.id).await?;
    info!(user_id = %user.id, "User logged in");
    session_response(&state, "Login successful", &user)
}

/// POST /api/auth/forgot-password
pub async fn forgot_password(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<EmailRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let email = require_email(&payload.email)?;

    match state.users().find_by_email(&email).await? {
        Some(_) => {
            let code = state.otps().create(&email, OtpPurpose::PasswordReset).await?;
            send_otp_email(&state, &email, &code, OtpPurpose::PasswordReset)
                .await
                .map_err(|e| ApiError::InternalServer(format!("Failed to send reset email: {}", e)))?;
        }
        None => info!(email = %safe_email_log(&email), "Password reset requested for unknown email"),
    }

    Ok(Json(MessageResponse::new(GENERIC_RESET_MESSAGE)))
}

/// POST /api/auth/reset-password
pub async fn reset_password(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    ResetPasswordValidator.validate(&payload).into_result()?;
    let email = normalize_email(&payload.email);
    let rejected = || ApiError::BadRequest("Invalid or expired OTP".to_string());

    if !state
        .otps()
        .verify(&email, &payload.otp, OtpPurpose::PasswordReset)
        .await?
    {
        return Err(rejected());
    }

    let users = state.users();
    let user = users.find_by_email(&email).await?.ok_or_else(rejected)?;
    let password_hash = hash_password_blocking(payload.new_password).await?;
    users.update_password(&user.id, &password_hash).await?;

    info!(user_id = %user.id, "Password reset");
    Ok(Json(MessageResponse::new("Password reset successfully")))
}

/// POST /api/auth/resend-otp
///
/// Signup codes are not re-sent for accounts that are already verified.
pub async fn resend_otp(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<ResendOtpRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let purpose = OtpPurpose::parse(payload.purpose.trim()).ok_or_else(|| {
        ApiError::ValidationError("type: must be 'signup' or 'password-reset'".to_string())
    })?;
    let email = require_email(&payload.email)?;

    let eligible = match state.users().find_by_email(&email).await? {
        Some(user) => !(purpose == OtpPurpose::Signup && user.is_verified),
        None => false,
    };

    if eligible {
        let code = state.otps().create(&email, purpose).await?;
        send_otp_email(&state, &email, &code, purpose)
            .await
            .map_err(|e| ApiError::InternalServer(format!("Failed to send OTP: {}", e)))?;
    } else {
        info!(
            email = %safe_email_log(&email),
            purpose = purpose.as_str(),
            "OTP resend skipped"
        );
    }

    Ok(Json(MessageResponse::new(GENERIC_RESEND_MESSAGE)))
}

/// POST /api/auth/refresh
///
/// Takes the refresh token from the body, or from the transport when the
/// body has none.
pub async fn refresh(
    Extension(state): Extension<Arc<AppState>>,
    request_headers: HeaderMap,
    payload: Option<Json<RefreshRequest>>,
) -> Result<Response, ApiError> {
    let from_body = payload
        .and_then(|Json(body)| body.refresh_token)
        .filter(|t| !t.trim().is_empty());
    let token = from_body
        .or_else(|| state.transport.extract(&request_headers).refresh)
        .ok_or_else(|| ApiError::Unauthorized("Refresh token required".to_string()))?;

    let invalid = || ApiError::Unauthorized("Invalid refresh token".to_string());
    let claims = state.tokens.verify(&token).map_err(|e| {
        warn!(error = %e, "Explicit refresh rejected");
        invalid()
    })?;
    let user = state
        .users()
        .find_by_id(&claims.user_id)
        .await?
        .ok_or_else(invalid)?;

    let pair = issue_tokens(&state, &user.id)?;
    let mut headers = HeaderMap::new();
    let (access_token, refresh_token) = deliver_tokens(&state, &mut headers, pair);

    info!(user_id = %user.id, "Tokens refreshed");
    let mut body = json!({ "message": "Tokens refreshed successfully" });
    if let (Some(access), Some(refresh)) = (access_token, refresh_token) {
        body["accessToken"] = json!(access);
        body["refreshToken"] = json!(refresh);
    }
    Ok((StatusCode::OK, headers, Json(body)).into_response())
}

/// POST /api/auth/logout
///
/// Tokens are stateless; logging out only clears what the transport stored.
pub async fn logout(Extension(state): Extension<Arc<AppState>>) -> Response {
    let mut headers = HeaderMap::new();
    state.transport.clear(&mut headers);
    (
        StatusCode::OK,
        headers,
        Json(MessageResponse::new("Logout successful")),
    )
        .into_response()
}

/// GET /api/auth/profile
pub async fn profile(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthedUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = state
        .users()
        .find_by_id(&user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(json!({
        "message": "Profile retrieved successfully",
        "user": ProfileView::from(user),
    })))
}
