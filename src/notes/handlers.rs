use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

use super::models::{CreateNoteRequest, ListNotesQuery, UpdateNoteRequest};
use super::validators::{parse_listing, CreateNoteValidator, UpdateNoteValidator};
use crate::auth::AuthedUser;
use crate::common::{ApiError, AppState, Validator};

/// GET /api/notes - Sorted, filtered, paginated listing
pub async fn list_notes(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthedUser,
    Query(query): Query<ListNotesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let listing = parse_listing(&query)?;
    let page = state.notes().list(&user.id, &listing).await?;
    Ok(Json(page))
}

/// POST /api/notes - Create a note
pub async fn create_note(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthedUser,
    Json(request): Json<CreateNoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    CreateNoteValidator.validate(&request).into_result()?;

    let note = state.notes().create(&user.id, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "note": note })),
    ))
}

/// GET /api/notes/:id - Get a single note
pub async fn get_note(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthedUser,
    Path(note_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let note = state.notes().get(&user.id, &note_id).await?;
    Ok(Json(json!({ "success": true, "note": note })))
}

/// PUT /api/notes/:id - Partial update
pub async fn update_note(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthedUser,
    Path(note_id): Path<String>,
    Json(request): Json<UpdateNoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    UpdateNoteValidator.validate(&request).into_result()?;

    let note = state.notes().update(&user.id, &note_id, request).await?;
    Ok(Json(json!({ "success": true, "note": note })))
}

/// DELETE /api/notes/:id - Delete a note
pub async fn delete_note(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthedUser,
    Path(note_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.notes().delete(&user.id, &note_id).await?;
    Ok(Json(json!({ "success": true, "message": "Note deleted successfully" })))
}
