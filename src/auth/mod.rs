//! # Auth Module
//!
//! This module handles all authentication-related functionality including:
//! - Password signup with email verification codes
//! - Access/refresh token issuance and silent refresh
//! - Header or cookie token transport
//! - Google OAuth login
//! - AuthedUser extractor for protected routes

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod oauth;
pub mod otp;
pub mod password;
pub mod routes;
pub mod tokens;
pub mod transport;
pub mod users;
pub mod validators;

#[cfg(test)]
mod tests;

pub use extractors::AuthedUser;
pub use middleware::authenticate;
pub use models::User;
pub use routes::auth_routes;
