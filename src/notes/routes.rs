use axum::{middleware, routing::get, Router};

use super::handlers;
use crate::auth::authenticate;

/// Creates the notes router; every route requires authentication
pub fn notes_routes() -> Router {
    Router::new()
        .route(
            "/api/notes",
            get(handlers::list_notes).post(handlers::create_note),
        )
        .route(
            "/api/notes/:id",
            get(handlers::get_note)
                .put(handlers::update_note)
                .delete(handlers::delete_note),
        )
        .route_layer(middleware::from_fn(authenticate))
}
