use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use tracing::info;

use super::models::{ShareLink, SharedNoteView, SHARE_TTL_DAYS};
use crate::common::{generate_share_id, now_timestamp, timestamp, ApiError};

pub struct SharesService {
    db: SqlitePool,
}

impl SharesService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Creates a link to one of the user's notes, valid for seven days.
    pub async fn create(&self, user_id: &str, note_id: &str, frontend_url: &str) -> Result<ShareLink, ApiError> {
        let owned: Option<String> = sqlx::query_scalar("SELECT id FROM notes WHERE id = ? AND user_id = ?")
            .bind(note_id)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?;
        if owned.is_none() {
            return Err(ApiError::NotFound("Note not found".to_string()));
        }

        let share_id = generate_share_id();
        let expires_at = Utc::now() + Duration::days(SHARE_TTL_DAYS);

        sqlx::query(
            "INSERT INTO shared_notes (id, note_id, user_id, expires_at, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&share_id)
        .bind(note_id)
        .bind(user_id)
        .bind(expires_at.timestamp())
        .bind(now_timestamp())
        .execute(&self.db)
        .await?;

        info!(note_id = %note_id, user_id = %user_id, "Created share link");
        Ok(ShareLink {
            share_url: format!("{}/shared/{}", frontend_url, share_id),
            share_id,
            expires_at: timestamp(expires_at),
        })
    }

    /// `None` for unknown and expired links alike.
    pub async fn resolve(&self, share_id: &str) -> Result<Option<SharedNoteView>, ApiError> {
        self.resolve_at(share_id, Utc::now()).await
    }

    async fn resolve_at(&self, share_id: &str, now: DateTime<Utc>) -> Result<Option<SharedNoteView>, ApiError> {
        let note = sqlx::query_as::<_, SharedNoteView>(
            r#"
            SELECT n.id, n.title, n.content, n.note_type, n.folder_id,
                   f.name AS folder_name, u.name AS author_name,
                   n.created_at, n.updated_at
            FROM shared_notes s
            JOIN notes n ON n.id = s.note_id
            JOIN users u ON u.id = n.user_id
            LEFT JOIN folders f ON f.id = n.folder_id
            WHERE s.id = ? AND s.expires_at > ?
            "#,
        )
        .bind(share_id)
        .bind(now.timestamp())
        .fetch_optional(&self.db)
        .await?;
        Ok(note)
    }
}
