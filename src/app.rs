// src/app.rs
//! Router composition shared by the server and the HTTP tests

use axum::{
    extract::Extension,
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::transport::{ACCESS_TOKEN_HEADER, REFRESH_TOKEN_HEADER};
use crate::common::error::attach_error_details;
use crate::common::{now_timestamp, AppState};
use crate::{auth, export, folders, logging_middleware, notes};

/// GET /api/health
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "timestamp": now_timestamp() }))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(REFRESH_TOKEN_HEADER),
        ])
        .expose_headers([
            HeaderName::from_static(ACCESS_TOKEN_HEADER),
            HeaderName::from_static(REFRESH_TOKEN_HEADER),
        ])
        .allow_credentials(true)
}

pub fn build_app(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/api/health", get(health))
        // ====================================================================
        // AUTHENTICATION ROUTES
        // ====================================================================
        .merge(auth::auth_routes())
        // ====================================================================
        // CONTENT ROUTES (Folders, Notes, Export)
        // ====================================================================
        .merge(folders::folders_routes())
        .merge(notes::notes_routes())
        .merge(export::export_routes())
        // ====================================================================
        // MIDDLEWARE AND LAYERS
        // ====================================================================
        .layer(middleware::from_fn(attach_error_details))
        .layer(middleware::from_fn(logging_middleware::log_request_response))
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
