use axum::{
    extract::{Extension, Path},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        StatusCode,
    },
    response::IntoResponse,
    Json,
};
use chrono::DateTime;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use crate::auth::AuthedUser;
use crate::common::{ApiError, AppState};
use crate::services::pdf::NoteDocument;

/// `Month D, YYYY` for a stored timestamp; unparsable values pass through.
fn display_date(stored: &str) -> String {
    DateTime::parse_from_rfc3339(stored)
        .map(|dt| dt.format("%B %-d, %Y").to_string())
        .unwrap_or_else(|_| stored.to_string())
}

/// Download filename derived from the note title
pub fn pdf_filename(title: &str) -> String {
    let stem: String = title
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = stem.trim_matches('.').trim();
    if stem.is_empty() {
        "note.pdf".to_string()
    } else {
        format!("{}.pdf", stem)
    }
}

/// GET /api/export/notes/:id/pdf - Render a note as a PDF attachment
pub async fn export_pdf(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthedUser,
    Path(note_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let note = state.notes().get(&user.id, &note_id).await?;

    let document = NoteDocument {
        title: note.title.clone(),
        folder_name: note.folder_name.clone(),
        created: display_date(&note.created_at),
        content_html: note.content,
    };

    let renderer = state.pdf.clone();
    let bytes = tokio::task::spawn_blocking(move || renderer.render(&document))
        .await
        .map_err(|e| ApiError::InternalServer(format!("PDF task failed: {}", e)))?
        .map_err(|e| {
            error!(error = %e, note_id = %note_id, "PDF generation failed");
            ApiError::InternalServer(format!("Failed to generate PDF: {}", e))
        })?;

    info!(note_id = %note_id, size = bytes.len(), "Exported note as PDF");
    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, "application/pdf".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", pdf_filename(&note.title)),
            ),
        ],
        bytes,
    ))
}

/// POST /api/export/notes/:id/share - Create a seven-day share link
pub async fn create_share_link(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthedUser,
    Path(note_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let link = state
        .shares()
        .create(&user.id, &note_id, &state.config.frontend_url)
        .await?;
    Ok(Json(link))
}

/// GET /api/export/shared/:share_id - Public view of a shared note
pub async fn get_shared_note(
    Extension(state): Extension<Arc<AppState>>,
    Path(share_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let note = state
        .shares()
        .resolve(&share_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Shared note not found or expired".to_string()))?;
    Ok(Json(json!({ "note": note })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_filename() {
        assert_eq!(pdf_filename("Weekly plan"), "Weekly plan.pdf");
        assert_eq!(pdf_filename("a/b\"c"), "a_b_c.pdf");
        assert_eq!(pdf_filename("  "), "note.pdf");
        assert_eq!(pdf_filename("Journal - March 7, 2026"), "Journal - March 7_ 2026.pdf");
    }

    #[test]
    fn test_display_date() {
        assert_eq!(display_date("2026-03-07T10:00:00.000Z"), "March 7, 2026");
        assert_eq!(display_date("garbage"), "garbage");
    }
}
