use super::models::{CreateFolderRequest, UpdateFolderRequest};
use crate::common::{ValidationResult, Validator};

pub const MAX_FOLDER_NAME_LENGTH: usize = 100;

fn check_length(result: &mut ValidationResult, name: &str) {
    if name.trim().chars().count() > MAX_FOLDER_NAME_LENGTH {
        result.add_error("name", "Folder name must not exceed 100 characters");
    }
}

pub struct CreateFolderValidator;

impl Validator<CreateFolderRequest> for CreateFolderValidator {
    fn validate(&self, data: &CreateFolderRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        if let Some(name) = &data.name {
            check_length(&mut result, name);
        }
        result
    }
}

/// Renames need an actual name; auto-naming only applies on create.
pub struct UpdateFolderValidator;

impl Validator<UpdateFolderRequest> for UpdateFolderValidator {
    fn validate(&self, data: &UpdateFolderRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        if data.name.trim().is_empty() {
            result.add_error("name", "Folder name is required");
        }
        check_length(&mut result, &data.name);
        result
    }
}
