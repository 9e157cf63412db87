//! Authentication routes

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use super::{handlers, middleware::authenticate, oauth};

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /api/auth/signup` - Create an account and email a signup code
/// - `POST /api/auth/verify-email` - Consume the signup code, start a session
/// - `POST /api/auth/login` - Password login
/// - `POST /api/auth/forgot-password` / `reset-password` - Password reset by code
/// - `POST /api/auth/resend-otp` - Re-issue a code
/// - `POST /api/auth/refresh` - Exchange a refresh token for a new pair
/// - `POST /api/auth/logout` - Clear transport state
/// - `GET /api/auth/profile` - Current user (authenticated)
/// - `GET /api/auth/google` + `/callback` - Google OAuth
pub fn auth_routes() -> Router {
    let protected = Router::new()
        .route("/api/auth/profile", get(handlers::profile))
        .route_layer(middleware::from_fn(authenticate));

    Router::new()
        .route("/api/auth/signup", post(handlers::signup))
        .route("/api/auth/verify-email", post(handlers::verify_email))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/forgot-password", post(handlers::forgot_password))
        .route("/api/auth/reset-password", post(handlers::reset_password))
        .route("/api/auth/resend-otp", post(handlers::resend_otp))
        .route("/api/auth/refresh", post(handlers::refresh))
        .route("/api/auth/logout", post(handlers::logout))
        .route("/api/auth/google", get(oauth::google_start))
        .route("/api/auth/google/callback", get(oauth::google_callback))
        .merge(protected)
}
