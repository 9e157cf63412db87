use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::common::helpers::double_option;

pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_CONTENT_LENGTH: usize = 50_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteType {
    Normal,
    Journal,
    Memory,
}

impl NoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteType::Normal => "normal",
            NoteType::Journal => "journal",
            NoteType::Memory => "memory",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "normal" => Some(NoteType::Normal),
            "journal" => Some(NoteType::Journal),
            "memory" => Some(NoteType::Memory),
            _ => None,
        }
    }
}

/// Note joined with the name of its folder
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    #[serde(skip_serializing)]
    pub user_id: String,
    pub folder_id: Option<String>,
    pub folder_name: Option<String>,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub note_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub folder_id: Option<String>,
    #[serde(rename = "type")]
    pub note_type: Option<String>,
}

/// Partial update. `folderId: null` moves the note out of its folder,
/// an absent `folderId` leaves it where it is.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub folder_id: Option<Option<String>>,
}

/// Raw listing query. Numbers stay strings so junk values fall back to defaults.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListNotesQuery {
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub folder_id: Option<String>,
    pub no_folder: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    UpdatedAt,
    CreatedAt,
    Title,
}

impl SortField {
    pub fn column(&self) -> &'static str {
        match self {
            SortField::UpdatedAt => "n.updated_at",
            SortField::CreatedAt => "n.created_at",
            SortField::Title => "n.title",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderFilter {
    Any,
    In(String),
    Unfiled,
}

/// Validated listing parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteListing {
    pub sort: SortField,
    pub descending: bool,
    pub folder: FolderFilter,
    pub search: Option<String>,
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePage {
    pub success: bool,
    pub notes: Vec<Note>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}
