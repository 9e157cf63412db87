use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

use super::models::{CreateFolderRequest, ListFoldersQuery, UpdateFolderRequest};
use super::validators::{CreateFolderValidator, UpdateFolderValidator};
use crate::auth::AuthedUser;
use crate::common::{ApiError, AppState, Validator};

/// GET /api/folders - List the user's folders with note counts
pub async fn list_folders(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthedUser,
    Query(query): Query<ListFoldersQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let folders = state.folders().list(&user.id, query.search.as_deref()).await?;
    Ok(Json(json!({ "success": true, "folders": folders })))
}

/// POST /api/folders - Create a folder, auto-named when no name is given
pub async fn create_folder(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthedUser,
    Json(request): Json<CreateFolderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    CreateFolderValidator.validate(&request).into_result()?;

    let folder = state
        .folders()
        .create(&user.id, request.name.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "folder": folder })),
    ))
}

/// PUT /api/folders/:id - Rename a folder
pub async fn update_folder(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthedUser,
    Path(folder_id): Path<String>,
    Json(request): Json<UpdateFolderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    UpdateFolderValidator.validate(&request).into_result()?;

    let folder = state
        .folders()
        .rename(&user.id, &folder_id, &request.name)
        .await?;

    Ok(Json(json!({ "success": true, "folder": folder })))
}

/// DELETE /api/folders/:id - Delete a folder and all of its notes
pub async fn delete_folder(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthedUser,
    Path(folder_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.folders().delete(&user.id, &folder_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Folder and all its notes deleted successfully",
    })))
}
