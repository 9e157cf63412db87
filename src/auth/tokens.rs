//! Access/refresh token issuance and verification

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use thiserror::Error;

use super::models::Claims;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("token is malformed")]
    Malformed,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token configuration error: {0}")]
    Configuration(String),

    #[error("token encoding failed: {0}")]
    Encoding(String),
}

/// A freshly minted access/refresh pair
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Outcome of checking an access token. Only `Expired` may enter the refresh flow.
#[derive(Debug)]
pub enum AccessCheck {
    Valid(Claims),
    Expired,
    Invalid(TokenError),
}

/// Signs and verifies HS256 tokens. Access and refresh tokens share the key
/// and payload shape and differ only in lifetime.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Result<Self, TokenError> {
        if secret.trim().is_empty() {
            return Err(TokenError::Configuration("signing secret is empty".to_string()));
        }
        if access_ttl <= Duration::zero() || refresh_ttl <= Duration::zero() {
            return Err(TokenError::Configuration("token lifetimes must be positive".to_string()));
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        })
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    pub fn issue(&self, user_id: &str) -> Result<TokenPair, TokenError> {
        if user_id.is_empty() {
            return Err(TokenError::Encoding("user id is required".to_string()));
        }

        Ok(TokenPair {
            access_token: self.sign(user_id, self.access_ttl)?,
            refresh_token: self.sign(user_id, self.refresh_ttl)?,
        })
    }

    fn sign(&self, user_id: &str, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            user_id: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            }
        })?;

        if data.claims.user_id.is_empty() {
            return Err(TokenError::Malformed);
        }
        Ok(data.claims)
    }

    pub fn verify_access(&self, token: &str) -> AccessCheck {
        match self.verify(token) {
            Ok(claims) => AccessCheck::Valid(claims),
            Err(TokenError::Expired) => AccessCheck::Expired,
            Err(e) => AccessCheck::Invalid(e),
        }
    }
}
