//! How tokens travel between client and server
//!
//! Two interchangeable strategies: a header pair (`Authorization: Bearer` in,
//! `x-access-token` / `x-refresh-token` out) and httpOnly cookies. Exactly one
//! is active per process; verification logic never looks at the transport.

use axum::http::{
    header::{AUTHORIZATION, COOKIE, SET_COOKIE},
    HeaderMap, HeaderName, HeaderValue,
};
use tracing::warn;

use super::tokens::TokenPair;
use crate::common::config::TransportKind;

pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";
pub const REFRESH_TOKEN_HEADER: &str = "x-refresh-token";
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// Tokens a client presented with a request
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PresentedTokens {
    pub access: Option<String>,
    pub refresh: Option<String>,
}

pub trait TokenTransport: Send + Sync {
    fn kind(&self) -> TransportKind;

    fn extract(&self, headers: &HeaderMap) -> PresentedTokens;

    /// Hands a new pair back to the client on a response.
    fn attach(&self, headers: &mut HeaderMap, tokens: &TokenPair);

    /// Removes whatever the transport keeps on the client.
    fn clear(&self, headers: &mut HeaderMap);
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn insert_header(headers: &mut HeaderMap, name: &'static str, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(v) => {
            headers.insert(HeaderName::from_static(name), v);
        }
        Err(e) => warn!(error = %e, header = name, "Token is not a valid header value"),
    }
}

#[derive(Debug, Clone, Default)]
pub struct HeaderTransport;

impl TokenTransport for HeaderTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Header
    }

    fn extract(&self, headers: &HeaderMap) -> PresentedTokens {
        let access = headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .and_then(non_empty);

        let refresh = headers
            .get(REFRESH_TOKEN_HEADER)
            .and_then(|h| h.to_str().ok())
            .and_then(non_empty);

        PresentedTokens { access, refresh }
    }

    fn attach(&self, headers: &mut HeaderMap, tokens: &TokenPair) {
        insert_header(headers, ACCESS_TOKEN_HEADER, &tokens.access_token);
        insert_header(headers, REFRESH_TOKEN_HEADER, &tokens.refresh_token);
    }

    fn clear(&self, _headers: &mut HeaderMap) {
        // Nothing is stored client-side by the server in this transport
    }
}

/// httpOnly, SameSite=Strict cookies. Both cookies live as long as the refresh
/// token so an expired access token still reaches the server and can be refreshed.
#[derive(Debug, Clone)]
pub struct CookieTransport {
    secure: bool,
    max_age_secs: i64,
}

impl CookieTransport {
    pub fn new(secure: bool, max_age_secs: i64) -> Self {
        Self {
            secure,
            max_age_secs,
        }
    }

    fn cookie(&self, name: &str, value: &str, max_age: i64) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Strict; Max-Age={}",
            name, value, max_age
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    fn append(&self, headers: &mut HeaderMap, cookie: String) {
        match HeaderValue::from_str(&cookie) {
            Ok(v) => {
                headers.append(SET_COOKIE, v);
            }
            Err(e) => warn!(error = %e, "Cookie is not a valid header value"),
        }
    }
}

/// Looks a cookie up across every `Cookie` header on the request.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .and_then(|(_, value)| non_empty(value))
}

impl TokenTransport for CookieTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Cookie
    }

    fn extract(&self, headers: &HeaderMap) -> PresentedTokens {
        PresentedTokens {
            access: read_cookie(headers, ACCESS_TOKEN_COOKIE),
            refresh: read_cookie(headers, REFRESH_TOKEN_COOKIE),
        }
    }

    fn attach(&self, headers: &mut HeaderMap, tokens: &TokenPair) {
        let access = self.cookie(ACCESS_TOKEN_COOKIE, &tokens.access_token, self.max_age_secs);
        let refresh = self.cookie(REFRESH_TOKEN_COOKIE, &tokens.refresh_token, self.max_age_secs);
        self.append(headers, access);
        self.append(headers, refresh);
    }

    fn clear(&self, headers: &mut HeaderMap) {
        self.append(headers, self.cookie(ACCESS_TOKEN_COOKIE, "", 0));
        self.append(headers, self.cookie(REFRESH_TOKEN_COOKIE, "", 0));
    }
}
