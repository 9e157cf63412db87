use axum::{
    middleware,
    routing::{get, put},
    Router,
};

use super::handlers;
use crate::auth::authenticate;

/// Creates the folders router; every route requires authentication
pub fn folders_routes() -> Router {
    Router::new()
        .route(
            "/api/folders",
            get(handlers::list_folders).post(handlers::create_folder),
        )
        .route(
            "/api/folders/:id",
            put(handlers::update_folder).delete(handlers::delete_folder),
        )
        .route_layer(middleware::from_fn(authenticate))
}
