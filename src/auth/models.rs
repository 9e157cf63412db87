//! Authentication data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// JWT claims structure, shared by access and refresh tokens
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub iat: i64,
    pub exp: i64,
}

/// User database model
#[derive(FromRow, Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    /// Empty for accounts that only ever signed in through OAuth
    pub password_hash: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub is_verified: bool,
    pub last_login: Option<String>,
    pub created_at: String,
}

/// Public view of a user returned by auth endpoints
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            avatar: user.avatar.clone(),
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub created_at: String,
    pub last_login: Option<String>,
}

impl From<User> for ProfileView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            avatar: user.avatar,
            created_at: user.created_at,
            last_login: user.last_login,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct SignupRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub name: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize, Debug)]
pub struct VerifyEmailRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub otp: String,
}

#[derive(Deserialize, Debug)]
pub struct EmailRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub otp: String,
    #[serde(default)]
    pub new_password: String,
}

#[derive(Deserialize, Debug)]
pub struct ResendOtpRequest {
    #[serde(default)]
    pub email: String,
    #[serde(rename = "type", default)]
    pub purpose: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Body of login / verify-email responses
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub user: UserSummary,
}

#[derive(Serialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
