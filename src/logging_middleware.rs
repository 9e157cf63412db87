// src/logging_middleware.rs
//! Middleware for logging request and response bodies in debug mode
//!
//! Only JSON bodies are buffered and logged. Credentials and tokens are
//! replaced before anything reaches the log.

use axum::body::to_bytes;
use axum::{
    body::Body,
    extract::Request,
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use serde_json::Value;
use tracing::{debug, Level};

const REDACTED_FIELDS: &[&str] = &[
    "password",
    "newPassword",
    "otp",
    "accessToken",
    "refreshToken",
];

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false)
}

/// Replaces sensitive values anywhere in the document.
pub fn redact(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                if REDACTED_FIELDS.contains(&key.as_str()) {
                    *field = Value::String("[REDACTED]".to_string());
                } else {
                    redact(field);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact),
        _ => {}
    }
}

fn render(bytes: &[u8]) -> Option<String> {
    let mut json = serde_json::from_slice::<Value>(bytes).ok()?;
    redact(&mut json);
    serde_json::to_string_pretty(&json).ok()
}

/// Middleware to log request and response bodies in debug mode
pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    if !tracing::enabled!(Level::DEBUG) {
        return Ok(next.run(request).await);
    }

    let request = if is_json(request.headers()) {
        let (parts, body) = request.into_parts();
        let bytes = to_bytes(body, usize::MAX)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

        if let Some(body) = render(&bytes) {
            debug!(
                method = %parts.method,
                uri = %parts.uri,
                request_body = %body,
                "📥 Request"
            );
        }
        Request::from_parts(parts, Body::from(bytes))
    } else {
        request
    };

    let response = next.run(request).await;
    if !is_json(response.headers()) {
        return Ok(response);
    }

    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if let Some(body) = render(&bytes) {
        debug!(
            status = %parts.status,
            response_body = %body,
            "📤 Response"
        );
    }

    Ok(Response::from_parts(parts, Body::from(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_redacts_nested_secrets() {
        let mut body = json!({
            "email": "ada@example.com",
            "password": "hunter22",
            "tokens": [{ "accessToken": "a.b.c", "refreshToken": "d.e.f" }],
            "reset": { "otp": "123456", "newPassword": "hunter23" }
        });
        redact(&mut body);

        assert_eq!(body["email"], "ada@example.com");
        assert_eq!(body["password"], "[REDACTED]");
        assert_eq!(body["tokens"][0]["accessToken"], "[REDACTED]");
        assert_eq!(body["tokens"][0]["refreshToken"], "[REDACTED]");
        assert_eq!(body["reset"]["otp"], "[REDACTED]");
        assert_eq!(body["reset"]["newPassword"], "[REDACTED]");
    }

    #[test]
    fn test_render_skips_non_json() {
        assert!(render(b"%PDF-1.3 binary").is_none());
        assert!(render(br#"{"title":"hi"}"#).is_some());
    }
}
