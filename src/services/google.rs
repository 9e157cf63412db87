// src/services/google.rs
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::common::config::GoogleOAuthConfig;

const AUTHORIZE_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Provider calls are awaited inline, so they get a hard ceiling.
const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    #[error("Provider returned no access token")]
    NoAccessToken,

    #[error("Profile request failed: {0}")]
    Profile(String),
}

/// Profile fields used to upsert the local account
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OAuthProfile {
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// An OAuth 2.0 authorization-code identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Where to send the browser to start the consent flow.
    fn authorization_url(&self) -> String;

    /// Exchanges an authorization code for the provider's access token.
    async fn exchange_code(&self, code: &str) -> Result<String, OAuthError>;

    async fn fetch_profile(&self, access_token: &str) -> Result<OAuthProfile, OAuthError>;
}

#[derive(Debug, Clone)]
pub struct GoogleOAuthService {
    config: GoogleOAuthConfig,
    client: Client,
}

impl GoogleOAuthService {
    pub fn new(config: GoogleOAuthConfig) -> Self {
        let client = Client::builder()
            .timeout(PROVIDER_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { config, client }
    }
}

#[async_trait]
impl IdentityProvider for GoogleOAuthService {
    fn authorization_url(&self) -> String {
        let url = format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
            AUTHORIZE_ENDPOINT,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode("openid email profile"),
        );
        debug!("Generated Google OAuth authorization URL");
        url
    }

    async fn exchange_code(&self, code: &str) -> Result<String, OAuthError> {
        let params = [
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        debug!("Exchanging authorization code for tokens");

        let response = self
            .client
            .post(TOKEN_ENDPOINT)
            .form(&params)
            .send()
            .await
            .map_err(|e| OAuthError::TokenExchange(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %error_text, "Token exchange failed");
            return Err(OAuthError::TokenExchange(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let token_response = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| OAuthError::TokenExchange(e.to_string()))?;

        info!("Exchanged Google authorization code");
        token_response
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(OAuthError::NoAccessToken)
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<OAuthProfile, OAuthError> {
        let response = self
            .client
            .get(USERINFO_ENDPOINT)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| OAuthError::Profile(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(OAuthError::Profile(format!("HTTP {}", status)));
        }

        response
            .json::<OAuthProfile>()
            .await
            .map_err(|e| OAuthError::Profile(e.to_string()))
    }
}
