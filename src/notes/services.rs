use chrono::{NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::info;

use super::models::{
    CreateNoteRequest, FolderFilter, Note, NoteListing, NotePage, NoteType, UpdateNoteRequest,
};
use crate::common::naming::{next_available_name, numbered_pattern};
use crate::common::{contains_pattern, generate_note_id, now_timestamp, ApiError};
use crate::folders::services::FoldersService;

pub const UNTITLED_NOTE: &str = "Untitled";
pub const UNTITLED_MEMORY: &str = "Memory";

const DUPLICATE_TITLE: &str =
    "A note with this title already exists. Please choose a different title.";
const DUPLICATE_JOURNAL: &str = "Journal entry for today already exists";

const NOTE_SELECT: &str = r#"
    SELECT n.id, n.user_id, n.folder_id, f.name AS folder_name, n.title, n.content,
           n.note_type, n.journal_date, n.created_at, n.updated_at
    FROM notes n
    LEFT JOIN folders f ON f.id = n.folder_id
"#;

/// Title of the journal entry for `day`, e.g. `Journal - October 19, 2026`.
pub fn journal_title(day: NaiveDate) -> String {
    format!("Journal - {}", day.format("%B %-d, %Y"))
}

fn push_listing_filters(builder: &mut QueryBuilder<'_, Sqlite>, user_id: &str, listing: &NoteListing) {
    builder.push(" WHERE n.user_id = ");
    builder.push_bind(user_id.to_string());

    match &listing.folder {
        FolderFilter::Any => {}
        FolderFilter::In(folder_id) => {
            builder.push(" AND n.folder_id = ");
            builder.push_bind(folder_id.clone());
        }
        FolderFilter::Unfiled => {
            builder.push(" AND n.folder_id IS NULL");
        }
    }

    if let Some(term) = &listing.search {
        let pattern = contains_pattern(term);
        builder.push(" AND (n.title LIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" ESCAPE '\\' OR n.content LIKE ");
        builder.push_bind(pattern);
        builder.push(" ESCAPE '\\')");
    }
}

pub struct NotesService {
    db: SqlitePool,
}

impl NotesService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn list(&self, user_id: &str, listing: &NoteListing) -> Result<NotePage, ApiError> {
        let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM notes n");
        push_listing_filters(&mut count_query, user_id, listing);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.db)
            .await?;

        let mut query = QueryBuilder::<Sqlite>::new(NOTE_SELECT);
        push_listing_filters(&mut query, user_id, listing);
        let direction = if listing.descending { "DESC" } else { "ASC" };
        query.push(format!(
            " ORDER BY {} {}, n.id {} LIMIT ",
            listing.sort.column(),
            direction,
            direction
        ));
        query.push_bind(listing.limit);
        query.push(" OFFSET ");
        query.push_bind((listing.page - 1).saturating_mul(listing.limit));

        let notes = query.build_query_as::<Note>().fetch_all(&self.db).await?;

        Ok(NotePage {
            success: true,
            notes,
            total,
            page: listing.page,
            limit: listing.limit,
            total_pages: (total + listing.limit - 1) / listing.limit,
        })
    }

    pub async fn get(&self, user_id: &str, note_id: &str) -> Result<Note, ApiError> {
        sqlx::query_as::<_, Note>(&format!("{} WHERE n.id = ? AND n.user_id = ?", NOTE_SELECT))
            .bind(note_id)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound("Note not found".to_string()))
    }

    async fn ensure_folder(&self, user_id: &str, folder_id: &str) -> Result<(), ApiError> {
        FoldersService::new(self.db.clone())
            .find_owned(user_id, folder_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| ApiError::BadRequest("Invalid folder".to_string()))
    }

    async fn title_taken(&self, user_id: &str, title: &str, except_id: Option<&str>) -> Result<bool, ApiError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notes
             WHERE user_id = ? AND title = ? AND note_type != 'journal' AND id != COALESCE(?, '')",
        )
        .bind(user_id)
        .bind(title)
        .bind(except_id)
        .fetch_one(&self.db)
        .await?;
        Ok(count > 0)
    }

    /// Next free auto-generated title. Memory names only compete with other
    /// memory notes; `Untitled` names compete with every note of the user.
    async fn next_auto_title(&self, user_id: &str, note_type: NoteType) -> Result<String, ApiError> {
        let (base, type_filter) = match note_type {
            NoteType::Memory => (UNTITLED_MEMORY, " AND note_type = 'memory'"),
            _ => (UNTITLED_NOTE, ""),
        };

        let existing: Vec<String> = sqlx::query_scalar(&format!(
            "SELECT title FROM notes WHERE user_id = ? AND (title = ? OR title LIKE ? ESCAPE '\\'){}",
            type_filter
        ))
        .bind(user_id)
        .bind(base)
        .bind(numbered_pattern(base))
        .fetch_all(&self.db)
        .await?;

        Ok(next_available_name(base, existing))
    }

    pub async fn create(&self, user_id: &str, request: CreateNoteRequest) -> Result<Note, ApiError> {
        let note_type = match request.note_type.as_deref() {
            Some(raw) => NoteType::parse(raw).ok_or_else(|| {
                ApiError::ValidationError("type: Type must be one of: normal, journal, memory".to_string())
            })?,
            None => NoteType::Normal,
        };

        let folder_id = request
            .folder_id
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string);
        if let Some(folder_id) = &folder_id {
            self.ensure_folder(user_id, folder_id).await?;
        }

        let requested_title = request
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        let (title, journal_date) = match note_type {
            NoteType::Journal => {
                let today = Utc::now().date_naive();
                let day = today.format("%Y-%m-%d").to_string();
                let existing: i64 = sqlx::query_scalar(
                    "SELECT COUNT(*) FROM notes WHERE user_id = ? AND note_type = 'journal' AND journal_date = ?",
                )
                .bind(user_id)
                .bind(&day)
                .fetch_one(&self.db)
                .await?;
                if existing > 0 {
                    return Err(ApiError::Conflict(DUPLICATE_JOURNAL.to_string()));
                }
                (journal_title(today), Some(day))
            }
            _ => {
                let title = match requested_title {
                    Some(title) => title,
                    None => self.next_auto_title(user_id, note_type).await?,
                };
                if self.title_taken(user_id, &title, None).await? {
                    return Err(ApiError::Conflict(DUPLICATE_TITLE.to_string()));
                }
                (title, None)
            }
        };

        let id = generate_note_id();
        let now = now_timestamp();
        let content = request.content.as_deref().map(str::trim).unwrap_or_default();
        let conflict = if note_type == NoteType::Journal {
            DUPLICATE_JOURNAL
        } else {
            DUPLICATE_TITLE
        };

        sqlx::query(
            "INSERT INTO notes (id, user_id, folder_id, title, content, note_type, journal_date, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(user_id)
        .bind(&folder_id)
        .bind(&title)
        .bind(content)
        .bind(note_type.as_str())
        .bind(&journal_date)
        .bind(&now)
        .bind(&now)
        .execute(&self.db)
        .await
        .map_err(|e| ApiError::from_insert(e, conflict))?;

        info!(note_id = %id, user_id = %user_id, note_type = note_type.as_str(), "Created note");
        self.get(user_id, &id).await
    }

    pub async fn update(
        &self,
        user_id: &str,
        note_id: &str,
        request: UpdateNoteRequest,
    ) -> Result<Note, ApiError> {
        let existing = self.get(user_id, note_id).await?;

        let folder_id = match request.folder_id {
            None => existing.folder_id.clone(),
            Some(target) => match target.as_deref().map(str::trim).filter(|f| !f.is_empty()) {
                Some(folder_id) => {
                    self.ensure_folder(user_id, folder_id).await?;
                    Some(folder_id.to_string())
                }
                None => None,
            },
        };

        let title = match request.title.as_deref().map(str::trim) {
            Some(title) => title.to_string(),
            None => existing.title.clone(),
        };
        let is_journal = existing.note_type == NoteType::Journal.as_str();
        if !is_journal && title != existing.title && self.title_taken(user_id, &title, Some(note_id)).await? {
            return Err(ApiError::Conflict(DUPLICATE_TITLE.to_string()));
        }

        let content = match request.content.as_deref() {
            Some(content) => content.trim().to_string(),
            None => existing.content.clone(),
        };

        sqlx::query(
            "UPDATE notes SET title = ?, content = ?, folder_id = ?, updated_at = ?
             WHERE id = ? AND user_id = ?",
        )
        .bind(&title)
        .bind(&content)
        .bind(&folder_id)
        .bind(now_timestamp())
        .bind(note_id)
        .bind(user_id)
        .execute(&self.db)
        .await
        .map_err(|e| ApiError::from_insert(e, DUPLICATE_TITLE))?;

        info!(note_id = %note_id, "Updated note");
        self.get(user_id, note_id).await
    }

    pub async fn delete(&self, user_id: &str, note_id: &str) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM notes WHERE id = ? AND user_id = ?")
            .bind(note_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Note not found".to_string()));
        }

        info!(note_id = %note_id, "Deleted note");
        Ok(())
    }
}
