use sqlx::SqlitePool;
use tracing::info;

use super::models::Folder;
use crate::common::naming::{next_available_name, numbered_pattern};
use crate::common::{contains_pattern, generate_folder_id, now_timestamp, ApiError};

/// Name given to folders created without one
pub const UNTITLED_FOLDER: &str = "Untitled Folder";

const DUPLICATE_FOLDER: &str =
    "A folder with this name already exists. Please choose a different name.";

const FOLDER_SELECT: &str = r#"
    SELECT f.id, f.user_id, f.name, f.created_at, f.updated_at,
           (SELECT COUNT(*) FROM notes n WHERE n.folder_id = f.id) AS note_count
    FROM folders f
"#;

pub struct FoldersService {
    db: SqlitePool,
}

impl FoldersService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Newest first, optionally filtered by a case-insensitive name fragment.
    pub async fn list(&self, user_id: &str, search: Option<&str>) -> Result<Vec<Folder>, ApiError> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());

        let folders = match search {
            Some(term) => {
                sqlx::query_as::<_, Folder>(&format!(
                    "{} WHERE f.user_id = ? AND f.name LIKE ? ESCAPE '\\' ORDER BY f.created_at DESC",
                    FOLDER_SELECT
                ))
                .bind(user_id)
                .bind(contains_pattern(term))
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, Folder>(&format!(
                    "{} WHERE f.user_id = ? ORDER BY f.created_at DESC",
                    FOLDER_SELECT
                ))
                .bind(user_id)
                .fetch_all(&self.db)
                .await?
            }
        };

        Ok(folders)
    }

    /// Folder owned by `user_id`, or `None` for missing and foreign folders alike.
    pub async fn find_owned(&self, user_id: &str, folder_id: &str) -> Result<Option<Folder>, ApiError> {
        let folder = sqlx::query_as::<_, Folder>(&format!(
            "{} WHERE f.id = ? AND f.user_id = ?",
            FOLDER_SELECT
        ))
        .bind(folder_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(folder)
    }

    async fn get_owned(&self, user_id: &str, folder_id: &str) -> Result<Folder, ApiError> {
        self.find_owned(user_id, folder_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Folder not found".to_string()))
    }

    async fn name_taken(&self, user_id: &str, name: &str, except_id: Option<&str>) -> Result<bool, ApiError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM folders WHERE user_id = ? AND name = ? AND id != COALESCE(?, '')",
        )
        .bind(user_id)
        .bind(name)
        .bind(except_id)
        .fetch_one(&self.db)
        .await?;
        Ok(count > 0)
    }

    async fn next_untitled_name(&self, user_id: &str) -> Result<String, ApiError> {
        let existing: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM folders WHERE user_id = ? AND (name = ? OR name LIKE ? ESCAPE '\\')",
        )
        .bind(user_id)
        .bind(UNTITLED_FOLDER)
        .bind(numbered_pattern(UNTITLED_FOLDER))
        .fetch_all(&self.db)
        .await?;

        Ok(next_available_name(UNTITLED_FOLDER, existing))
    }

    /// Blank names get the next free `Untitled Folder` name.
    pub async fn create(&self, user_id: &str, name: Option<&str>) -> Result<Folder, ApiError> {
        let requested = name.map(str::trim).filter(|n| !n.is_empty());

        let name = match requested {
            Some(name) => {
                if self.name_taken(user_id, name, None).await? {
                    return Err(ApiError::Conflict(DUPLICATE_FOLDER.to_string()));
                }
                name.to_string()
            }
            None => self.next_untitled_name(user_id).await?,
        };

        let id = generate_folder_id();
        let now = now_timestamp();
        sqlx::query(
            "INSERT INTO folders (id, user_id, name, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(user_id)
        .bind(&name)
        .bind(&now)
        .bind(&now)
        .execute(&self.db)
        .await
        .map_err(|e| ApiError::from_insert(e, DUPLICATE_FOLDER))?;

        info!(folder_id = %id, user_id = %user_id, "Created folder");
        self.get_owned(user_id, &id).await
    }

    pub async fn rename(&self, user_id: &str, folder_id: &str, name: &str) -> Result<Folder, ApiError> {
        let name = name.trim();
        self.get_owned(user_id, folder_id).await?;

        if self.name_taken(user_id, name, Some(folder_id)).await? {
            return Err(ApiError::Conflict(DUPLICATE_FOLDER.to_string()));
        }

        sqlx::query("UPDATE folders SET name = ?, updated_at = ? WHERE id = ? AND user_id = ?")
            .bind(name)
            .bind(now_timestamp())
            .bind(folder_id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .map_err(|e| ApiError::from_insert(e, DUPLICATE_FOLDER))?;

        info!(folder_id = %folder_id, "Renamed folder");
        self.get_owned(user_id, folder_id).await
    }

    /// Removes the folder together with every note in it.
    pub async fn delete(&self, user_id: &str, folder_id: &str) -> Result<(), ApiError> {
        let mut tx = self.db.begin().await?;

        let exists: Option<String> =
            sqlx::query_scalar("SELECT id FROM folders WHERE id = ? AND user_id = ?")
                .bind(folder_id)
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Err(ApiError::NotFound("Folder not found".to_string()));
        }

        let notes = sqlx::query("DELETE FROM notes WHERE folder_id = ? AND user_id = ?")
            .bind(folder_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM folders WHERE id = ? AND user_id = ?")
            .bind(folder_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            folder_id = %folder_id,
            deleted_notes = notes.rows_affected(),
            "Deleted folder"
        );
        Ok(())
    }
}
