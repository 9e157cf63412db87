use super::models::{
    CreateNoteRequest, FolderFilter, ListNotesQuery, NoteListing, NoteType, SortField,
    UpdateNoteRequest, MAX_CONTENT_LENGTH, MAX_TITLE_LENGTH,
};
use crate::common::{ApiError, ValidationResult, Validator};

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 100;
/// Keeps `(page - 1) * limit` inside i64.
const MAX_PAGE: i64 = i64::MAX / MAX_PAGE_SIZE;

fn check_title_and_content(
    result: &mut ValidationResult,
    title: Option<&String>,
    content: Option<&String>,
) {
    if let Some(title) = title {
        if title.trim().chars().count() > MAX_TITLE_LENGTH {
            result.add_error("title", "Title must be less than 200 characters");
        }
    }
    if let Some(content) = content {
        if content.trim().chars().count() > MAX_CONTENT_LENGTH {
            result.add_error("content", "Content must be less than 50,000 characters");
        }
    }
}

pub struct CreateNoteValidator;

impl Validator<CreateNoteRequest> for CreateNoteValidator {
    fn validate(&self, data: &CreateNoteRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        check_title_and_content(&mut result, data.title.as_ref(), data.content.as_ref());

        if let Some(raw) = &data.note_type {
            if NoteType::parse(raw).is_none() {
                result.add_error("type", "Type must be one of: normal, journal, memory");
            }
        }
        result
    }
}

pub struct UpdateNoteValidator;

impl Validator<UpdateNoteRequest> for UpdateNoteValidator {
    fn validate(&self, data: &UpdateNoteRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        check_title_and_content(&mut result, data.title.as_ref(), data.content.as_ref());

        if let Some(title) = &data.title {
            if title.trim().is_empty() {
                result.add_error("title", "Title cannot be empty");
            }
        }
        result
    }
}

/// Integer query value; unparsable or zero falls back to `default`.
fn lenient_number(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| *v != 0)
        .unwrap_or(default)
}

/// Turns raw query parameters into a listing. Unknown sort fields or orders
/// are rejected; paging values are clamped.
pub fn parse_listing(query: &ListNotesQuery) -> Result<NoteListing, ApiError> {
    let sort = match query.sort_by.as_deref().unwrap_or("updatedAt") {
        "updatedAt" => SortField::UpdatedAt,
        "createdAt" => SortField::CreatedAt,
        "title" => SortField::Title,
        _ => return Err(ApiError::BadRequest("Invalid sort field".to_string())),
    };

    let descending = match query.order.as_deref().unwrap_or("desc") {
        "desc" => true,
        "asc" => false,
        _ => return Err(ApiError::BadRequest("Invalid sort order".to_string())),
    };

    let folder = match query.folder_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => FolderFilter::In(id.to_string()),
        _ if query.no_folder.as_deref() == Some("true") => FolderFilter::Unfiled,
        _ => FolderFilter::Any,
    };

    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok(NoteListing {
        sort,
        descending,
        folder,
        search,
        page: lenient_number(query.page.as_deref(), 1).clamp(1, MAX_PAGE),
        limit: lenient_number(query.limit.as_deref(), DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
    })
}
