//! # Folders Module
//!
//! Per-user folders with unique names. Deleting a folder deletes its notes.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;


pub use routes::folders_routes;
