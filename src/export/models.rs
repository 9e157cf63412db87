use serde::Serialize;
use sqlx::FromRow;

/// How long a share link stays valid
pub const SHARE_TTL_DAYS: i64 = 7;

/// A note as seen through a public share link
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SharedNoteView {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub note_type: String,
    pub folder_id: Option<String>,
    pub folder_name: Option<String>,
    pub author_name: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLink {
    #[serde(skip_serializing)]
    pub share_id: String,
    pub share_url: String,
    pub expires_at: String,
}
