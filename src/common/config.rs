//! Process configuration loaded from the environment

use chrono::Duration;
use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// How access/refresh tokens travel between client and server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// `Authorization: Bearer` + `x-refresh-token` request headers,
    /// `x-access-token` + `x-refresh-token` response headers.
    Header,
    /// httpOnly `accessToken` / `refreshToken` cookies.
    Cookie,
}

#[derive(Debug, Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub from_address: String,
    pub ses_region: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub production: bool,
    pub jwt_secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub transport: TransportKind,
    pub frontend_url: String,
    pub cors_origins: Vec<String>,
    pub google: Option<GoogleOAuthConfig>,
    pub email: Option<EmailConfig>,
    pub reset_db: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let access_raw = get("JWT_EXPIRE").ok_or(ConfigError::Missing("JWT_EXPIRE"))?;
        let access_ttl = parse_ttl(&access_raw).map_err(|reason| ConfigError::Invalid {
            name: "JWT_EXPIRE",
            reason,
        })?;
        let refresh_raw =
            get("JWT_REFRESH_EXPIRE").ok_or(ConfigError::Missing("JWT_REFRESH_EXPIRE"))?;
        let refresh_ttl = parse_ttl(&refresh_raw).map_err(|reason| ConfigError::Invalid {
            name: "JWT_REFRESH_EXPIRE",
            reason,
        })?;

        let port = match get("PORT") {
            Some(p) => p.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "PORT",
                reason: e.to_string(),
            })?,
            None => 5000,
        };

        let production = get("APP_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let transport = match get("TOKEN_TRANSPORT").as_deref() {
            None | Some("header") => TransportKind::Header,
            Some("cookie") => TransportKind::Cookie,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "TOKEN_TRANSPORT",
                    reason: format!("expected 'header' or 'cookie', got '{}'", other),
                })
            }
        };

        let frontend_url = get("FRONTEND_URL")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        let cors_origins = get("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| vec![frontend_url.clone()]);

        let google = match (
            get("GOOGLE_CLIENT_ID"),
            get("GOOGLE_CLIENT_SECRET"),
            get("GOOGLE_REDIRECT_URI"),
        ) {
            (Some(client_id), Some(client_secret), Some(redirect_uri)) => Some(GoogleOAuthConfig {
                client_id,
                client_secret,
                redirect_uri,
            }),
            _ => None,
        };

        let email = get("EMAIL_FROM").map(|from_address| EmailConfig {
            from_address,
            ses_region: get("AWS_SES_REGION"),
        });

        let reset_db = get("RESET_DB")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self {
            database_url,
            port,
            production,
            jwt_secret,
            access_ttl,
            refresh_ttl,
            transport,
            frontend_url,
            cors_origins,
            google,
            email,
            reset_db,
        })
    }
}

/// Parses a TTL such as `3600`, `30s`, `15m`, `1h` or `7d`. Must be positive.
pub fn parse_ttl(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    let (digits, unit) = match raw.find(|c: char| !c.is_ascii_digit()) {
        Some(idx) => raw.split_at(idx),
        None => (raw, "s"),
    };

    let amount: i64 = digits
        .parse()
        .map_err(|_| format!("'{}' is not a duration", raw))?;
    if amount <= 0 {
        return Err(format!("'{}' must be greater than zero", raw));
    }

    let duration = match unit {
        "s" => Duration::seconds(amount),
        "m" => Duration::minutes(amount),
        "h" => Duration::hours(amount),
        "d" => Duration::days(amount),
        other => return Err(format!("unknown unit '{}' in '{}'", other, raw)),
    };
    Ok(duration)
}
