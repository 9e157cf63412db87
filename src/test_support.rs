//! Fixtures for the HTTP tests: an in-memory app with stubbed outbound services

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use regex::Regex;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use crate::app::build_app;
use crate::auth::models::Claims;
use crate::auth::password::hash_password;
use crate::auth::tokens::{TokenPair, TokenService};
use crate::auth::transport::{CookieTransport, HeaderTransport, TokenTransport};
use crate::common::config::{Config, TransportKind};
use crate::common::migrations::test_support::setup_test_db;
use crate::common::AppState;
use crate::services::email::{EmailError, EmailSender};
use crate::services::google::{IdentityProvider, OAuthError, OAuthProfile};
use crate::services::pdf::{NoteDocument, PdfError, PdfRenderer};

pub const TEST_SECRET: &str = "test_secret_key";
pub const TEST_PASSWORD: &str = "password123";
pub const FRONTEND_URL: &str = "http://localhost:3000";

/// Records every message instead of sending it
#[derive(Default)]
pub struct CapturingMailer {
    pub sent: Mutex<Vec<(String, String)>>,
    pub fail: bool,
}

impl CapturingMailer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn count_for(&self, email: &str) -> usize {
        self.sent.lock().unwrap().iter().filter(|(to, _)| to == email).count()
    }

    /// The code from the most recent message to `email`.
    pub fn last_code(&self, email: &str) -> Option<String> {
        let re = Regex::new(r"<h1>(\d{6})</h1>").unwrap();
        let sent = self.sent.lock().unwrap();
        sent.iter()
            .rev()
            .find(|(to, _)| to == email)
            .and_then(|(_, body)| re.captures(body))
            .map(|caps| caps[1].to_string())
    }
}

#[async_trait]
impl EmailSender for CapturingMailer {
    async fn send(&self, to: &str, _subject: &str, html_body: &str) -> Result<(), EmailError> {
        if self.fail {
            return Err(EmailError::Delivery("mailbox unavailable".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), html_body.to_string()));
        Ok(())
    }
}

/// Identity provider answering from canned values
pub struct StubIdentityProvider {
    pub profile: OAuthProfile,
    pub exchange_fails: bool,
}

impl StubIdentityProvider {
    pub fn with_email(email: &str) -> Self {
        Self {
            profile: OAuthProfile {
                email: Some(email.to_string()),
                name: Some("Grace Hopper".to_string()),
                picture: Some("https://example.com/grace.png".to_string()),
            },
            exchange_fails: false,
        }
    }
}

#[async_trait]
impl IdentityProvider for StubIdentityProvider {
    fn authorization_url(&self) -> String {
        "https://accounts.example.com/consent?client_id=test".to_string()
    }

    async fn exchange_code(&self, code: &str) -> Result<String, OAuthError> {
        if self.exchange_fails {
            return Err(OAuthError::TokenExchange("invalid_grant".to_string()));
        }
        Ok(format!("provider-token-for-{}", code))
    }

    async fn fetch_profile(&self, _access_token: &str) -> Result<OAuthProfile, OAuthError> {
        Ok(self.profile.clone())
    }
}

pub struct StubPdfRenderer;

impl PdfRenderer for StubPdfRenderer {
    fn render(&self, document: &NoteDocument) -> Result<Vec<u8>, PdfError> {
        Ok(format!("%PDF-1.4 {}", document.title).into_bytes())
    }
}

pub fn test_config(transport: TransportKind) -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        port: 0,
        production: false,
        jwt_secret: TEST_SECRET.to_string(),
        access_ttl: Duration::hours(1),
        refresh_ttl: Duration::days(7),
        transport,
        frontend_url: FRONTEND_URL.to_string(),
        cors_origins: vec![FRONTEND_URL.to_string()],
        google: None,
        email: None,
        reset_db: false,
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub bytes: Vec<u8>,
    pub body: Value,
}

impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn cookies(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect()
    }

    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub mailer: Arc<CapturingMailer>,
}

pub struct AppBuilder {
    transport: TransportKind,
    production: bool,
    mailer: CapturingMailer,
    identity_provider: Option<Arc<dyn IdentityProvider>>,
}

impl AppBuilder {
    pub fn transport(mut self, transport: TransportKind) -> Self {
        self.transport = transport;
        self
    }

    pub fn production(mut self, production: bool) -> Self {
        self.production = production;
        self
    }

    pub fn mailer(mut self, mailer: CapturingMailer) -> Self {
        self.mailer = mailer;
        self
    }

    pub fn identity_provider(mut self, provider: StubIdentityProvider) -> Self {
        self.identity_provider = Some(Arc::new(provider));
        self
    }

    pub async fn build(self) -> TestApp {
        let config = Config {
            production: self.production,
            ..test_config(self.transport)
        };
        let tokens =
            TokenService::new(&config.jwt_secret, config.access_ttl, config.refresh_ttl).unwrap();
        let transport: Arc<dyn TokenTransport> = match self.transport {
            TransportKind::Header => Arc::new(HeaderTransport),
            TransportKind::Cookie => Arc::new(CookieTransport::new(
                false,
                config.refresh_ttl.num_seconds(),
            )),
        };
        let mailer = Arc::new(self.mailer);

        let state = Arc::new(AppState {
            db: setup_test_db().await,
            config: Arc::new(config),
            tokens,
            transport,
            mailer: mailer.clone(),
            identity_provider: self.identity_provider,
            pdf: Arc::new(StubPdfRenderer),
        });

        TestApp {
            router: build_app(state.clone()),
            state,
            mailer,
        }
    }
}

pub fn test_app() -> AppBuilder {
    AppBuilder {
        transport: TransportKind::Header,
        production: false,
        mailer: CapturingMailer::default(),
        identity_provider: None,
    }
}

/// Token for `user_id` that expired a minute ago. Access and refresh tokens
/// share the signing key, so it serves as either.
pub fn expired_token(user_id: &str) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        user_id: user_id.to_string(),
        iat: now - 3600,
        exp: now - 60,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

/// A signed-in account: its id plus a valid token pair
pub struct TestUser {
    pub id: String,
    pub tokens: TokenPair,
}

impl TestUser {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.tokens.access_token)
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            bytes,
            body,
        }
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body), &[]).await
    }

    pub async fn get_as(&self, user: &TestUser, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None, &[("authorization", &user.bearer())])
            .await
    }

    pub async fn post_as(&self, user: &TestUser, uri: &str, body: Value) -> TestResponse {
        self.request(
            Method::POST,
            uri,
            Some(body),
            &[("authorization", &user.bearer())],
        )
        .await
    }

    pub async fn put_as(&self, user: &TestUser, uri: &str, body: Value) -> TestResponse {
        self.request(
            Method::PUT,
            uri,
            Some(body),
            &[("authorization", &user.bearer())],
        )
        .await
    }

    pub async fn delete_as(&self, user: &TestUser, uri: &str) -> TestResponse {
        self.request(Method::DELETE, uri, None, &[("authorization", &user.bearer())])
            .await
    }

    /// Inserts a verified password account and issues it a token pair.
    pub async fn user(&self, email: &str) -> TestUser {
        let users = self.state.users();
        let hash = hash_password(TEST_PASSWORD).unwrap();
        let user = users.create(email, &hash, "Test User").await.unwrap();
        users.mark_verified(&user.id).await.unwrap();

        TestUser {
            tokens: self.state.tokens.issue(&user.id).unwrap(),
            id: user.id,
        }
    }
}
