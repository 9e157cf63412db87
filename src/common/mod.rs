// Common module - shared types and utilities across all modules

pub mod config;
pub mod error;
pub mod helpers;
pub mod id_generator;
pub mod migrations;
pub mod naming;
pub mod state;
pub mod validation;

// Re-export commonly used types for convenience
pub use config::Config;
pub use error::ApiError;
pub use helpers::{
    contains_pattern, normalize_email, now_timestamp, safe_email_log, safe_token_log, timestamp,
};
pub use id_generator::*;
pub use state::AppState;
pub use validation::{ValidationResult, Validator};
