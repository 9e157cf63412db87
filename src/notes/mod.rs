//! # Notes Module
//!
//! Note CRUD with listing (sort, folder filter, search, pagination),
//! auto-naming of untitled and memory notes, and one journal entry per day.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;


pub use routes::notes_routes;
