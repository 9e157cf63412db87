use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Folder as stored, with the number of notes inside
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
    pub note_count: i64,
}

#[derive(Debug, Deserialize, Default)]
pub struct CreateFolderRequest {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFolderRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct ListFoldersQuery {
    pub search: Option<String>,
}
