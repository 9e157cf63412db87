use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use super::handlers;
use crate::auth::authenticate;

/// Creates the export router. Resolving a share link is public.
pub fn export_routes() -> Router {
    let protected = Router::new()
        .route("/api/export/notes/:id/pdf", get(handlers::export_pdf))
        .route("/api/export/notes/:id/share", post(handlers::create_share_link))
        .route_layer(middleware::from_fn(authenticate));

    Router::new()
        .route("/api/export/shared/:share_id", get(handlers::get_shared_note))
        .merge(protected)
}
